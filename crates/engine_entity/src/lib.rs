//! # engine_entity
//!
//! The "E" and "C" the factories build on: what an entity is, how components
//! hang off it, and how its fields are exposed by name.
//!
//! This crate provides:
//!
//! - [`Component`] trait and [`ComponentBase`] — the contract and shared state
//!   every component carries.
//! - [`EntityId`] / [`EntityAllocator`] — lightweight `u64` identifiers.
//! - [`Entity`] — a component bag plus an ordered map of exposed properties
//!   and commands.
//! - [`World`] — owns entities, starts and updates their components.
//! - [`EntitySnapshot`] — the saved form of an entity's exposed properties.

pub mod component;
pub mod entity;
pub mod error;
pub mod exposed;
pub mod snapshot;
pub mod world;

pub use component::{Component, ComponentBase, ComponentTypeId};
pub use entity::{DELETE_COMMAND, Entity, EntityAllocator, EntityId, ID_PROPERTY};
pub use error::EntityError;
pub use exposed::{Exposed, FileFilter, PropertyMeta};
pub use snapshot::EntitySnapshot;
pub use world::{World, WorldConfig};
