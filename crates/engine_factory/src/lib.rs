//! # engine_factory
//!
//! One [`Factory`] per placeable entity kind, and the [`FactoryRegistry`]
//! that looks them up by kind name.
//!
//! Building an entity is three steps, always in this order:
//!
//! 1. [`Factory::create`] allocates an entity tagged with the kind.
//! 2. [`Factory::bind`] attaches components (get-or-create), wires bindings
//!    between their properties and exposes properties and commands by name.
//!    Binding an already bound entity changes nothing.
//! 3. [`Factory::attach_editor_components`] adds editor-only decoration, and
//!    is only called for worlds running with the editor enabled.
//!
//! Factories never depend on each other.

pub mod components;
pub mod editor;
pub mod error;
pub mod factories;
pub mod factory;
pub mod registry;
pub mod suspension;

pub use error::FactoryError;
pub use factory::Factory;
pub use registry::FactoryRegistry;
