//! Entity identifiers, allocation, and the entity component bag.
//!
//! An [`EntityId`] is a lightweight `u64` identifier. An [`Entity`] is the
//! object the id names: an ordered set of keyed components plus an ordered map
//! of exposed properties and commands. Entities are shared as `Rc<Entity>`
//! and mutated through `&self`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use engine_bind::{Binding, Command, Property, PropertyValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::component::{Component, ComponentTypeId, Slot};
use crate::error::EntityError;
use crate::exposed::{Exposed, PropertyMeta};
use crate::snapshot::EntitySnapshot;
use crate::world::World;

/// A unique entity identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity id from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. Ids start at 1 (0 is reserved for [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Make sure `id` is never handed out by [`EntityAllocator::allocate`].
    pub fn skip_past(&mut self, id: EntityId) {
        self.next_id = self.next_id.max(id.0 + 1);
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Exposed name of the script-visible entity name.
pub const ID_PROPERTY: &str = "ID";

/// Exposed name of the entity's delete command.
pub const DELETE_COMMAND: &str = "Delete";

/// A bag of keyed components plus the members it exposes by name.
pub struct Entity {
    id: EntityId,
    kind: String,
    this: Weak<Entity>,
    name: Property<String>,
    delete: Command,
    components: RefCell<Vec<Slot>>,
    exposed: RefCell<Vec<(String, Exposed)>>,
    bindings: RefCell<Vec<Box<dyn Binding>>>,
    active: Cell<bool>,
    serialize: Cell<bool>,
    cannot_suspend: Cell<bool>,
    cannot_suspend_by_distance: Cell<bool>,
    bound: Cell<bool>,
    suspended: Cell<bool>,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("components", &self.component_keys())
            .field("exposed", &self.exposed_names())
            .field("active", &self.active.get())
            .finish()
    }
}

impl Entity {
    /// Create an empty entity. It exposes `ID` and `Delete` and nothing else.
    #[must_use]
    pub fn new(id: EntityId, kind: impl Into<String>) -> Rc<Self> {
        let entity = Rc::new_cyclic(|this: &Weak<Entity>| {
            let target = this.clone();
            let delete = Command::from_fn(move || {
                if let Some(entity) = target.upgrade() {
                    entity.destroy();
                }
            });
            Self {
                id,
                kind: kind.into(),
                this: this.clone(),
                name: Property::new(String::new()),
                delete,
                components: RefCell::new(Vec::new()),
                exposed: RefCell::new(Vec::new()),
                bindings: RefCell::new(Vec::new()),
                active: Cell::new(true),
                serialize: Cell::new(true),
                cannot_suspend: Cell::new(false),
                cannot_suspend_by_distance: Cell::new(false),
                bound: Cell::new(false),
                suspended: Cell::new(false),
            }
        });
        entity.expose_with(
            ID_PROPERTY,
            &entity.name,
            PropertyMeta::default().with_description("Name scripts use to find the entity"),
        );
        entity.expose_command(DELETE_COMMAND, &entity.delete);
        entity
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The factory kind that built this entity.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The script-visible name, exposed as `ID`.
    #[must_use]
    pub fn name(&self) -> &Property<String> {
        &self.name
    }

    /// The command that deletes the entity.
    #[must_use]
    pub fn delete_command(&self) -> &Command {
        &self.delete
    }

    /// Delete the entity: every component is deleted, owned bindings are
    /// detached and exposed members are cleared. Deleting twice is a no-op.
    pub fn delete(&self) {
        self.delete.execute();
    }

    fn destroy(&self) {
        if !self.active.replace(false) {
            return;
        }
        info!(entity = %self.id, kind = %self.kind, "entity deleted");

        let deletes: Vec<Command> = self
            .components
            .borrow()
            .iter()
            .map(|slot| slot.component.base().delete.clone())
            .collect();
        for delete in deletes {
            delete.execute();
        }

        self.delete_bindings();
        self.exposed.borrow_mut().clear();
    }

    /// Returns `false` once the entity has been deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    #[must_use]
    pub fn serialize(&self) -> bool {
        self.serialize.get()
    }

    pub fn set_serialize(&self, serialize: bool) {
        self.serialize.set(serialize);
    }

    /// Never suspended, for any reason.
    #[must_use]
    pub fn cannot_suspend(&self) -> bool {
        self.cannot_suspend.get()
    }

    pub fn set_cannot_suspend(&self, value: bool) {
        self.cannot_suspend.set(value);
    }

    /// Never suspended for being far from the viewer.
    #[must_use]
    pub fn cannot_suspend_by_distance(&self) -> bool {
        self.cannot_suspend_by_distance.get()
    }

    pub fn set_cannot_suspend_by_distance(&self, value: bool) {
        self.cannot_suspend_by_distance.set(value);
    }

    /// Returns `true` once a factory has finished binding the entity.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.get()
    }

    pub fn mark_bound(&self) {
        self.bound.set(true);
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended.get()
    }

    /// Suspend or resume every component.
    pub fn set_suspended(&self, suspended: bool) {
        if self.suspended.replace(suspended) == suspended {
            return;
        }
        debug!(entity = %self.id, suspended, "suspension changed");
        for component in self.components() {
            component.base().suspended.set(suspended);
        }
    }

    // ── Components ─────────────────────────────────────────────────────

    /// Return the component under `key`, inserting `T::default()` if absent.
    ///
    /// Fails with [`EntityError::ComponentTypeMismatch`] when `key` holds a
    /// component of another type.
    pub fn try_get_or_insert_default<T: Component + Default>(&self, key: &str) -> Result<Rc<T>, EntityError> {
        self.try_get_or_insert_default_tracked(key).map(|(component, _)| component)
    }

    /// Like [`Entity::try_get_or_insert_default`], also reporting whether the
    /// component was created by this call.
    pub fn try_get_or_insert_default_tracked<T: Component + Default>(
        &self,
        key: &str,
    ) -> Result<(Rc<T>, bool), EntityError> {
        if let Some(existing) = self.lookup::<T>(key)? {
            return Ok((existing, false));
        }
        Ok((self.insert(key.to_owned(), T::default()), true))
    }

    /// Returns the component under `key` if it exists and is a `T`.
    #[must_use]
    pub fn get<T: Component>(&self, key: &str) -> Option<Rc<T>> {
        self.lookup::<T>(key).ok().flatten()
    }

    /// Returns the first component of type `T`, whatever its key.
    #[must_use]
    pub fn get_by_type<T: Component>(&self) -> Option<Rc<T>> {
        let type_id = ComponentTypeId::of::<T>();
        self.components
            .borrow()
            .iter()
            .filter(|slot| slot.type_id == type_id)
            .find_map(Slot::downcast::<T>)
    }

    /// Returns the component under `key`, or an error naming what is missing.
    pub fn require<T: Component>(&self, key: &str) -> Result<Rc<T>, EntityError> {
        self.lookup::<T>(key)?.ok_or_else(|| EntityError::ComponentNotFound {
            entity: self.id,
            key: key.to_owned(),
        })
    }

    /// Attach `component` under `key`, replacing whatever was there.
    pub fn add_component<T: Component>(&self, key: &str, component: T) -> Rc<T> {
        if self.remove_component(key) {
            debug!(entity = %self.id, key, "replaced component");
        }
        self.insert(key.to_owned(), component)
    }

    /// Attach `component` under a fresh unique key. Anonymous components are
    /// never saved.
    pub fn add_anonymous<T: Component>(&self, component: T) -> Rc<T> {
        let component = self.insert(uuid::Uuid::new_v4().to_string(), component);
        component.base().set_serialize(false);
        component
    }

    /// Detach the component under `key`. Returns `false` if there was none.
    pub fn remove_component(&self, key: &str) -> bool {
        let slot = {
            let mut components = self.components.borrow_mut();
            match components.iter().position(|slot| slot.key == key) {
                Some(index) => components.remove(index),
                None => return false,
            }
        };
        slot.component.base().detach();
        slot.component.on_delete();
        debug!(entity = %self.id, key, component = slot.type_name, "component removed");
        true
    }

    #[must_use]
    pub fn has_component(&self, key: &str) -> bool {
        self.components.borrow().iter().any(|slot| slot.key == key)
    }

    /// Component keys in attach order.
    #[must_use]
    pub fn component_keys(&self) -> Vec<String> {
        self.components.borrow().iter().map(|slot| slot.key.clone()).collect()
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.borrow().len()
    }

    /// Every component in attach order.
    #[must_use]
    pub fn components(&self) -> Vec<Rc<dyn Component>> {
        self.components
            .borrow()
            .iter()
            .map(|slot| Rc::clone(&slot.component))
            .collect()
    }

    fn lookup<T: Component>(&self, key: &str) -> Result<Option<Rc<T>>, EntityError> {
        let components = self.components.borrow();
        let Some(slot) = components.iter().find(|slot| slot.key == key) else {
            return Ok(None);
        };
        slot.downcast::<T>()
            .map(Some)
            .ok_or_else(|| EntityError::ComponentTypeMismatch {
                entity: self.id,
                key: key.to_owned(),
                expected: T::type_name(),
                found: slot.type_name,
            })
    }

    fn insert<T: Component>(&self, key: String, component: T) -> Rc<T> {
        let component = Rc::new(component);
        component.base().attach(self.this.clone(), &key);
        debug!(entity = %self.id, key = %key, component = T::type_name(), "component attached");
        self.components.borrow_mut().push(Slot::new(key, &component));
        component.awake();
        component
    }

    pub(crate) fn start_components(&self, world: &World) {
        for component in self.components() {
            if component.base().begin_start() {
                component.start(world);
            }
        }
    }

    pub(crate) fn update_components(&self, world: &World, dt: f32) {
        for component in self.components() {
            if component.base().is_running() {
                component.update(world, dt);
            }
        }
    }

    // ── Exposed members ────────────────────────────────────────────────

    /// Publish `property` under `name` with default metadata.
    pub fn expose<T: PropertyValue>(&self, name: &str, property: &Property<T>) {
        self.expose_with(name, property, PropertyMeta::default());
    }

    /// Publish `property` under `name`.
    ///
    /// Exposing the same cell again only refreshes its metadata; exposing a
    /// different cell under a taken name replaces it.
    pub fn expose_with<T: PropertyValue>(&self, name: &str, property: &Property<T>, meta: PropertyMeta) {
        self.publish(
            name,
            Exposed::Property {
                handle: Box::new(property.clone()),
                meta,
            },
        );
    }

    /// Publish `command` under `name`.
    pub fn expose_command<A: Clone + DeserializeOwned + 'static>(&self, name: &str, command: &Command<A>) {
        self.publish(name, Exposed::Command(Box::new(command.clone())));
    }

    fn publish(&self, name: &str, entry: Exposed) {
        let mut exposed = self.exposed.borrow_mut();
        match exposed.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => {
                let same = existing.cell_id() == entry.cell_id() && existing.is_property() == entry.is_property();
                if !same {
                    warn!(entity = %self.id, name, "replacing exposed member with a different cell");
                }
                *existing = entry;
            }
            None => exposed.push((name.to_owned(), entry)),
        }
    }

    /// A handle to the member exposed under `name`.
    #[must_use]
    pub fn exposed(&self, name: &str) -> Option<Exposed> {
        self.exposed
            .borrow()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry.clone())
    }

    /// Exposed names in the order they were first exposed.
    #[must_use]
    pub fn exposed_names(&self) -> Vec<String> {
        self.exposed.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    #[must_use]
    pub fn property_meta(&self, name: &str) -> Option<PropertyMeta> {
        self.exposed(name).and_then(|entry| entry.meta().cloned())
    }

    /// The property exposed under `name`, if it holds a `T`.
    pub fn property<T: PropertyValue>(&self, name: &str) -> Result<Property<T>, EntityError> {
        let found = match self.exposed(name) {
            Some(Exposed::Property { handle, .. }) => handle.downcast::<T>(),
            _ => None,
        };
        found.ok_or_else(|| EntityError::PropertyNotFound {
            entity: self.id,
            name: name.to_owned(),
        })
    }

    /// The zero-argument command exposed under `name`.
    pub fn command(&self, name: &str) -> Result<Command, EntityError> {
        self.command_with::<()>(name)
    }

    /// The one-argument command exposed under `name`. A command taking
    /// another argument type is a [`engine_bind::BindError::ArgumentMismatch`].
    pub fn command_with<A: Clone + 'static>(&self, name: &str) -> Result<Command<A>, EntityError> {
        match self.exposed(name) {
            Some(Exposed::Command(handle)) => Ok(handle.try_downcast::<A>()?),
            _ => Err(EntityError::CommandNotFound {
                entity: self.id,
                name: name.to_owned(),
            }),
        }
    }

    /// The `T` property exposed under `name`, exposing a new one holding
    /// `default` if there is none.
    pub fn get_or_make_property<T: PropertyValue>(&self, name: &str, default: T) -> Property<T> {
        if let Ok(existing) = self.property::<T>(name) {
            return existing;
        }
        let property = Property::new(default);
        self.expose(name, &property);
        property
    }

    /// Read an exposed property as JSON.
    pub fn property_json(&self, name: &str) -> Result<serde_json::Value, EntityError> {
        match self.exposed(name) {
            Some(Exposed::Property { handle, .. }) => Ok(handle.to_json()?),
            _ => Err(EntityError::PropertyNotFound {
                entity: self.id,
                name: name.to_owned(),
            }),
        }
    }

    /// Write an exposed property from JSON. Read-only properties refuse.
    pub fn set_property_json(&self, name: &str, value: serde_json::Value) -> Result<(), EntityError> {
        match self.exposed(name) {
            Some(Exposed::Property { meta, .. }) if meta.readonly => Err(EntityError::ReadOnly {
                entity: self.id,
                name: name.to_owned(),
            }),
            Some(Exposed::Property { handle, .. }) => Ok(handle.set_json(value)?),
            _ => Err(EntityError::PropertyNotFound {
                entity: self.id,
                name: name.to_owned(),
            }),
        }
    }

    /// Execute an exposed command; `arg` is `null` for zero-argument commands.
    pub fn execute(&self, name: &str, arg: serde_json::Value) -> Result<(), EntityError> {
        match self.exposed(name) {
            Some(Exposed::Command(handle)) => Ok(handle.execute_json(arg)?),
            _ => Err(EntityError::CommandNotFound {
                entity: self.id,
                name: name.to_owned(),
            }),
        }
    }

    // ── Bindings ───────────────────────────────────────────────────────

    /// Hand a binding to the entity; it is deleted with the entity.
    pub fn add_binding(&self, binding: impl Binding + 'static) {
        self.bindings.borrow_mut().push(Box::new(binding));
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    fn delete_bindings(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        for binding in bindings {
            binding.delete();
        }
    }

    // ── Snapshots ──────────────────────────────────────────────────────

    /// Capture every exposed property marked for saving.
    pub fn snapshot(&self) -> Result<EntitySnapshot, EntityError> {
        let entries: Vec<(String, Exposed)> = self.exposed.borrow().clone();
        let mut properties = Vec::new();
        for (name, entry) in entries {
            if let Exposed::Property { handle, meta } = entry {
                if meta.serialize {
                    properties.push((name, handle.to_json()?));
                }
            }
        }
        Ok(EntitySnapshot {
            id: self.id,
            kind: self.kind.clone(),
            properties,
        })
    }

    /// Write saved property values back. Names no longer exposed are skipped.
    pub fn apply_snapshot(&self, snapshot: &EntitySnapshot) -> Result<(), EntityError> {
        if snapshot.kind != self.kind {
            warn!(entity = %self.id, expected = %self.kind, found = %snapshot.kind, "applying snapshot of another kind");
        }
        for (name, value) in &snapshot.properties {
            match self.exposed(name) {
                Some(Exposed::Property { handle, meta }) if meta.serialize => handle.set_json(value.clone())?,
                _ => warn!(entity = %self.id, name = %name, "snapshot property is not exposed, skipping"),
            }
        }
        Ok(())
    }
}
