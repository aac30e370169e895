//! Core [`Component`] trait and the state every component shares.
//!
//! A component is a typed unit of state hanging off an [`Entity`]. Components
//! live behind `Rc` and use interior mutability: their fields are
//! [`Property`] cells and [`Command`]s that bindings and scripts address by
//! handle, so a component is never borrowed mutably as a whole.
//!
//! ## Type identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash. It indexes typed lookups on an entity and is
//! stable across runs, which keeps snapshots and tools in agreement.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use engine_bind::{Binding, Command, Property};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::world::World;

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

/// State and commands shared by every component.
///
/// `enable`/`disable` write `enabled`; `delete` is wired when the component is
/// attached to an entity and removes it from that entity. Bindings the
/// component owns are deleted with it.
pub struct ComponentBase {
    /// Whether the component participates in updates.
    pub enabled: Property<bool>,
    /// Set while the owning entity is suspended.
    pub suspended: Property<bool>,
    /// Sets `enabled` to true.
    pub enable: Command,
    /// Sets `enabled` to false.
    pub disable: Command,
    /// Removes the component from its entity.
    pub delete: Command,
    serialize: Cell<bool>,
    editable: Cell<bool>,
    active: Cell<bool>,
    started: Cell<bool>,
    key: RefCell<String>,
    entity: RefCell<Weak<Entity>>,
    bindings: RefCell<Vec<Box<dyn Binding>>>,
}

impl std::fmt::Debug for ComponentBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBase")
            .field("key", &*self.key.borrow())
            .field("enabled", &self.enabled.get())
            .field("suspended", &self.suspended.get())
            .field("active", &self.active.get())
            .field("bindings", &self.bindings.borrow().len())
            .finish()
    }
}

impl Default for ComponentBase {
    fn default() -> Self {
        let enabled = Property::new(true);

        let target = enabled.downgrade();
        let enable = Command::from_fn(move || {
            if let Some(enabled) = target.upgrade() {
                enabled.set(true);
            }
        });
        let target = enabled.downgrade();
        let disable = Command::from_fn(move || {
            if let Some(enabled) = target.upgrade() {
                enabled.set(false);
            }
        });

        Self {
            enabled,
            suspended: Property::new(false),
            enable,
            disable,
            delete: Command::new(),
            serialize: Cell::new(true),
            editable: Cell::new(true),
            active: Cell::new(false),
            started: Cell::new(false),
            key: RefCell::new(String::new()),
            entity: RefCell::new(Weak::new()),
            bindings: RefCell::new(Vec::new()),
        }
    }
}

impl ComponentBase {
    /// Returns `true` when enabled, not suspended and still attached.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.get() && self.enabled.get() && !self.suspended.get()
    }

    /// Returns `true` between attach and removal.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// The key this component is stored under (empty until attached).
    #[must_use]
    pub fn key(&self) -> String {
        self.key.borrow().clone()
    }

    /// The owning entity, if attached and still alive.
    #[must_use]
    pub fn entity(&self) -> Option<Rc<Entity>> {
        self.entity.borrow().upgrade()
    }

    /// Whether the component is included in saved state.
    #[must_use]
    pub fn serialize(&self) -> bool {
        self.serialize.get()
    }

    pub fn set_serialize(&self, serialize: bool) {
        self.serialize.set(serialize);
    }

    /// Whether the editor may change the component.
    #[must_use]
    pub fn editable(&self) -> bool {
        self.editable.get()
    }

    pub fn set_editable(&self, editable: bool) {
        self.editable.set(editable);
    }

    /// Hand a binding to the component; it is deleted when the component is.
    pub fn add_binding(&self, binding: impl Binding + 'static) {
        self.bindings.borrow_mut().push(Box::new(binding));
    }

    /// Number of bindings owned by the component.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    /// Delete every owned binding.
    pub fn delete_bindings(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        for binding in bindings {
            binding.delete();
        }
    }

    pub(crate) fn attach(&self, entity: Weak<Entity>, key: &str) {
        *self.key.borrow_mut() = key.to_owned();
        *self.entity.borrow_mut() = entity.clone();
        self.active.set(true);

        let key = key.to_owned();
        self.delete.set_action(move |()| {
            if let Some(entity) = entity.upgrade() {
                entity.remove_component(&key);
            }
        });
    }

    pub(crate) fn detach(&self) {
        self.active.set(false);
        self.delete_bindings();
        self.delete.clear_action();
        *self.entity.borrow_mut() = Weak::new();
    }

    /// Marks the component started; returns `false` if it already was.
    pub(crate) fn begin_start(&self) -> bool {
        !self.started.replace(true)
    }
}

/// The core component trait.
///
/// Implementors embed a [`ComponentBase`] and return it from
/// [`Component::base`]. Lifecycle hooks default to no-ops.
///
/// # Examples
///
/// ```rust
/// use engine_bind::Property;
/// use engine_entity::{Component, ComponentBase};
///
/// #[derive(Debug, Default)]
/// struct Health {
///     base: ComponentBase,
///     current: Property<f32>,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
///     fn base(&self) -> &ComponentBase { &self.base }
/// }
/// ```
pub trait Component: Any {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Shared state.
    fn base(&self) -> &ComponentBase;

    /// Called once, right after the component is attached.
    fn awake(&self) {}

    /// Called once, when the world starts or the component first joins a
    /// started world.
    fn start(&self, _world: &World) {}

    /// Called every tick while the component is running.
    fn update(&self, _world: &World, _dt: f32) {}

    /// Called after the component has been removed from its entity.
    fn on_delete(&self) {}
}

pub(crate) struct Slot {
    pub(crate) key: String,
    pub(crate) type_id: ComponentTypeId,
    pub(crate) type_name: &'static str,
    pub(crate) any: Rc<dyn Any>,
    pub(crate) component: Rc<dyn Component>,
}

impl Slot {
    pub(crate) fn new<T: Component>(key: String, component: &Rc<T>) -> Self {
        let any: Rc<dyn Any> = component.clone();
        let component: Rc<dyn Component> = component.clone();
        Self {
            key,
            type_id: ComponentTypeId::of::<T>(),
            type_name: T::type_name(),
            any,
            component,
        }
    }

    pub(crate) fn downcast<T: Component>(&self) -> Option<Rc<T>> {
        Rc::downcast::<T>(Rc::clone(&self.any)).ok()
    }
}
