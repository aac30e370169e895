//! # engine_bind
//!
//! The data plumbing that entities and components are built from.
//!
//! This crate provides:
//!
//! - [`Property`] — a shared, observable value cell.
//! - [`PropertyBinding`], [`TwoWayBinding`], [`NotifyBinding`],
//!   [`ChangeBinding`] — push-based links between cells.
//! - [`Command`] and [`CommandBinding`] — invocable actions with listeners.
//! - [`AnyProperty`] / [`AnyCommand`] — type-erased handles used to address
//!   cells and commands by name from scripts and the editor.
//!
//! Everything here is single-threaded: cells are `Rc`-shared and mutated
//! through `RefCell`.

pub mod binding;
pub mod command;
pub mod error;
pub mod property;

pub use binding::{Binding, ChangeBinding, NotifyBinding, PropertyBinding, TwoWayBinding};
pub use command::{AnyCommand, Command, CommandBinding, WeakCommand};
pub use error::BindError;
pub use property::{AnyProperty, ObserverId, Property, PropertyValue, WeakProperty};
