//! World state: the entities that exist and the clock that drives them.
//!
//! The [`World`] owns every live entity, allocates ids, starts components
//! once and updates running components every tick. Entities deleted during a
//! tick are purged at the end of it.

use std::rc::Rc;

use engine_bind::CommandBinding;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::{Entity, EntityAllocator, EntityId};
use crate::error::EntityError;

/// Settings that shape how factories build entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Attach editor-only components (gizmo models, labels, connection lines).
    pub editor_enabled: bool,
    /// Radius around the viewer outside which entities are suspended.
    pub suspend_distance: f32,
    /// Root directory sound bank paths are browsed from.
    pub sound_bank_dir: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            editor_enabled: false,
            suspend_distance: 100.0,
            sound_bank_dir: String::from("Content/Wwise"),
        }
    }
}

/// The set of live entities.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    allocator: EntityAllocator,
    entities: Vec<Rc<Entity>>,
    reserved: Option<EntityId>,
    started: bool,
    elapsed: f64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            allocator: EntityAllocator::new(),
            entities: Vec::new(),
            reserved: None,
            started: false,
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns `true` when editor components should be attached.
    #[must_use]
    pub fn is_editor(&self) -> bool {
        self.config.editor_enabled
    }

    /// Returns `true` once [`World::start`] has run.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Seconds of simulated time since start.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Allocate a bare entity tagged with `kind`. It is not part of the world
    /// until [`World::add`] is called.
    pub fn allocate(&mut self, kind: &str) -> Rc<Entity> {
        let id = match self.reserved.take() {
            Some(id) => id,
            None => self.allocator.allocate(),
        };
        debug!(entity = %id, kind, "entity allocated");
        Entity::new(id, kind)
    }

    /// Have the next [`World::allocate`] return `id`. Fails when `id` is
    /// invalid or held by an entity in the world.
    pub fn reserve(&mut self, id: EntityId) -> bool {
        if !id.is_valid() || self.entities.iter().any(|entity| entity.id() == id) {
            return false;
        }
        self.allocator.skip_past(id);
        self.reserved = Some(id);
        true
    }

    /// Drop a reservation nothing allocated.
    pub fn release_reservation(&mut self) {
        self.reserved = None;
    }

    /// Insert an entity. In a started world its components start immediately.
    pub fn add(&mut self, entity: Rc<Entity>) {
        if self.entities.iter().any(|existing| Rc::ptr_eq(existing, &entity)) {
            return;
        }
        info!(entity = %entity.id(), kind = entity.kind(), "entity added");
        self.entities.push(Rc::clone(&entity));
        if self.started {
            entity.start_components(self);
        }
    }

    /// The live entity with `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Rc<Entity>> {
        self.entities
            .iter()
            .find(|entity| entity.id() == id && entity.is_active())
            .cloned()
    }

    /// The first live entity whose `ID` property equals `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Rc<Entity>> {
        self.entities
            .iter()
            .find(|entity| entity.is_active() && entity.name().with(|own| own == name))
            .cloned()
    }

    /// Every entity, in insertion order.
    #[must_use]
    pub fn entities(&self) -> &[Rc<Entity>] {
        &self.entities
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Start every component. Calling it again is a no-op.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(entities = self.entities.len(), "world started");
        for entity in self.entities.clone() {
            entity.start_components(self);
        }
    }

    /// Advance one tick: start the world if needed and any components added
    /// since the last tick, update running components, then purge deleted
    /// entities.
    pub fn update(&mut self, dt: f32) {
        if !self.started {
            debug!("world updated before start, starting it");
            self.start();
        }
        self.elapsed += f64::from(dt);
        for entity in self.entities.clone() {
            if !entity.is_active() {
                continue;
            }
            entity.start_components(self);
            entity.update_components(self, dt);
        }
        self.purge();
    }

    /// Drop entities that have been deleted. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.is_active());
        let removed = before - self.entities.len();
        if removed > 0 {
            debug!(removed, "purged deleted entities");
        }
        removed
    }

    /// Run `target`'s `target_command` whenever `source`'s `source_command`
    /// executes. The link is owned by the source entity.
    pub fn link_command(
        &self,
        source: EntityId,
        source_command: &str,
        target: EntityId,
        target_command: &str,
    ) -> Result<(), EntityError> {
        let from = self.get(source).ok_or(EntityError::EntityNotFound(source))?;
        let to = self.get(target).ok_or(EntityError::EntityNotFound(target))?;
        let binding = CommandBinding::new(&from.command(source_command)?, &to.command(target_command)?);
        from.add_binding(binding);
        debug!(%source, source_command, %target, target_command, "commands linked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::component::{Component, ComponentBase};

    #[derive(Debug, Default)]
    struct Clock {
        base: ComponentBase,
        started: Cell<u32>,
        ticks: Cell<u32>,
    }

    impl Component for Clock {
        fn type_name() -> &'static str {
            "Clock"
        }

        fn base(&self) -> &ComponentBase {
            &self.base
        }

        fn start(&self, _world: &World) {
            self.started.set(self.started.get() + 1);
        }

        fn update(&self, _world: &World, _dt: f32) {
            self.ticks.set(self.ticks.get() + 1);
        }
    }

    fn spawn_clock(world: &mut World) -> (Rc<Entity>, Rc<Clock>) {
        let entity = world.allocate("Clock");
        let clock = entity.try_get_or_insert_default::<Clock>("Clock").unwrap();
        world.add(Rc::clone(&entity));
        (entity, clock)
    }

    #[test]
    fn test_config_defaults() {
        let config = WorldConfig::default();
        assert!(!config.editor_enabled);
        assert_eq!(config.suspend_distance, 100.0);
        assert_eq!(config.sound_bank_dir, "Content/Wwise");

        let partial: WorldConfig = serde_json::from_str(r#"{"editor_enabled": true}"#).unwrap();
        assert!(partial.editor_enabled);
        assert_eq!(partial.suspend_distance, 100.0);
    }

    #[test]
    fn test_start_runs_once_per_component() {
        let mut world = World::default();
        let (_, clock) = spawn_clock(&mut world);
        world.start();
        world.start();
        world.update(0.1);
        assert_eq!(clock.started.get(), 1);
    }

    #[test]
    fn test_update_starts_unstarted_world() {
        let mut world = World::default();
        let (_, clock) = spawn_clock(&mut world);
        world.update(0.1);
        assert!(world.is_started());
        assert_eq!(clock.started.get(), 1);
        assert_eq!(clock.ticks.get(), 1);
        world.update(0.1);
        assert_eq!(clock.started.get(), 1);
    }

    #[test]
    fn test_reserved_id_is_allocated_next() {
        let mut world = World::default();
        let (first, _) = spawn_clock(&mut world);
        assert!(!world.reserve(first.id()));
        assert!(!world.reserve(EntityId::INVALID));

        assert!(world.reserve(EntityId(7)));
        assert_eq!(world.allocate("Clock").id(), EntityId(7));
        assert_eq!(world.allocate("Clock").id(), EntityId(8));

        first.delete();
        world.purge();
        assert!(world.reserve(EntityId(1)));
        world.release_reservation();
        assert_eq!(world.allocate("Clock").id(), EntityId(9));
    }

    #[test]
    fn test_late_additions_start_on_add() {
        let mut world = World::default();
        world.start();
        let (_, clock) = spawn_clock(&mut world);
        assert_eq!(clock.started.get(), 1);
    }

    #[test]
    fn test_update_skips_disabled_and_suspended() {
        let mut world = World::default();
        let (entity, clock) = spawn_clock(&mut world);
        world.start();
        world.update(0.1);
        clock.base.disable.execute();
        world.update(0.1);
        clock.base.enable.execute();
        entity.set_suspended(true);
        world.update(0.1);
        assert_eq!(clock.ticks.get(), 1);
    }

    #[test]
    fn test_deleted_entities_are_purged() {
        let mut world = World::default();
        let (entity, _) = spawn_clock(&mut world);
        let (keep, _) = spawn_clock(&mut world);
        entity.delete();
        assert!(world.get(entity.id()).is_none());
        world.update(0.1);
        assert_eq!(world.entity_count(), 1);
        assert!(world.get(keep.id()).is_some());
    }

    #[test]
    fn test_find_by_name() {
        let mut world = World::default();
        let (entity, _) = spawn_clock(&mut world);
        entity.name().set(String::from("gate"));
        assert!(world.find("gate").is_some_and(|found| found.id() == entity.id()));
        assert!(world.find("door").is_none());
    }

    #[test]
    fn test_link_command_deletes_target() {
        let mut world = World::default();
        let (trigger, _) = spawn_clock(&mut world);
        let (victim, _) = spawn_clock(&mut world);
        let fire: engine_bind::Command = engine_bind::Command::new();
        trigger.expose_command("Fire", &fire);

        world.link_command(trigger.id(), "Fire", victim.id(), "Delete").unwrap();
        fire.execute();
        assert!(!victim.is_active());

        assert!(matches!(
            world.link_command(trigger.id(), "Fire", EntityId(99), "Delete"),
            Err(EntityError::EntityNotFound(EntityId(99)))
        ));
    }
}
