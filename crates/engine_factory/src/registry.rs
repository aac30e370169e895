//! Looking up factories by kind and running the build sequence.

use std::collections::BTreeMap;
use std::rc::Rc;

use engine_entity::{Entity, EntitySnapshot, ID_PROPERTY, World};
use tracing::{debug, info, warn};

use crate::error::FactoryError;
use crate::factories;
use crate::factory::Factory;

/// Factories keyed by the kind they build.
pub struct FactoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn Factory>>,
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in factory.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for factory in factories::all() {
            registry.insert(factory);
        }
        registry
    }

    /// Register `factory`, replacing any factory of the same kind.
    pub fn register(&mut self, factory: impl Factory + 'static) {
        self.insert(Box::new(factory));
    }

    fn insert(&mut self, factory: Box<dyn Factory>) {
        let kind = factory.kind();
        if self.factories.insert(kind, factory).is_some() {
            debug!(kind, "factory replaced");
        }
    }

    /// The factory for `kind`.
    pub fn get(&self, kind: &str) -> Result<&dyn Factory, FactoryError> {
        self.factories
            .get(kind)
            .map(Box::as_ref)
            .ok_or_else(|| FactoryError::UnknownKind(kind.to_owned()))
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a new entity of `kind` and add it to `world`.
    pub fn spawn(&self, kind: &str, world: &mut World) -> Result<Rc<Entity>, FactoryError> {
        let factory = self.get(kind)?;
        let entity = factory.create(world);
        factory.bind(&entity, world, true)?;
        if world.is_editor() {
            factory.attach_editor_components(&entity, world)?;
        }
        world.add(Rc::clone(&entity));
        info!(entity = %entity.id(), kind, "entity spawned");
        Ok(entity)
    }

    /// Rebuild a saved entity and add it to `world`. The entity keeps its
    /// saved id unless another entity in `world` holds it, so saved entity
    /// references stay valid.
    pub fn restore(&self, world: &mut World, snapshot: &EntitySnapshot) -> Result<Rc<Entity>, FactoryError> {
        let factory = self.get(&snapshot.kind)?;
        if !world.reserve(snapshot.id) {
            warn!(saved = %snapshot.id, kind = %snapshot.kind, "saved id taken, restoring under a fresh id");
        }
        let entity = factory.create(world);
        world.release_reservation();
        factory.bind(&entity, world, false)?;
        entity.apply_snapshot(snapshot)?;
        if world.is_editor() {
            factory.attach_editor_components(&entity, world)?;
        }
        world.add(Rc::clone(&entity));
        debug!(saved = %snapshot.id, entity = %entity.id(), kind = %snapshot.kind, "entity restored");
        Ok(entity)
    }

    /// Spawn a copy of `source` with the same saved property values. The
    /// copy keeps an empty `ID`.
    pub fn duplicate(&self, world: &mut World, source: &Entity) -> Result<Rc<Entity>, FactoryError> {
        let mut snapshot = source.snapshot()?;
        snapshot.properties.retain(|(name, _)| name != ID_PROPERTY);
        let copy = self.spawn(source.kind(), world)?;
        copy.apply_snapshot(&snapshot)?;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use engine_entity::WorldConfig;
    use engine_math::Transform;
    use glam::Vec3;

    use super::*;
    use crate::components::Water;
    use crate::editor::EDITOR_MODEL;

    #[test]
    fn test_defaults_cover_every_kind() {
        let registry = FactoryRegistry::with_defaults();
        assert_eq!(registry.len(), 12);
        for kind in ["AmbientSound", "Explosion", "Fog", "LogicGate", "VoiceActor", "Water"] {
            assert_eq!(registry.get(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let registry = FactoryRegistry::with_defaults();
        let mut world = World::default();
        assert!(matches!(
            registry.spawn("Dragon", &mut world),
            Err(FactoryError::UnknownKind(kind)) if kind == "Dragon"
        ));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_spawn_adds_editor_components_only_in_editor() {
        let registry = FactoryRegistry::with_defaults();

        let mut game = World::default();
        let entity = registry.spawn("Counter", &mut game).unwrap();
        assert!(!entity.has_component(EDITOR_MODEL));
        assert_eq!(game.entity_count(), 1);

        let mut editor = World::new(WorldConfig {
            editor_enabled: true,
            ..WorldConfig::default()
        });
        let entity = registry.spawn("Counter", &mut editor).unwrap();
        assert!(entity.has_component(EDITOR_MODEL));
    }

    #[test]
    fn test_restore_round_trips_saved_properties() {
        let registry = FactoryRegistry::with_defaults();
        let mut world = World::default();
        let water = registry.spawn("Water", &mut world).unwrap();
        water.name().set(String::from("lake"));
        water.set_property_json("Depth", serde_json::json!(3.5)).unwrap();
        water.set_property_json("Position", serde_json::json!([1.0, 2.0, 3.0])).unwrap();

        let bytes = water.snapshot().unwrap().encode().unwrap();
        let snapshot = EntitySnapshot::decode(&bytes).unwrap();

        let mut loaded = World::default();
        let restored = registry.restore(&mut loaded, &snapshot).unwrap();
        assert_eq!(restored.name().get(), "lake");
        assert_eq!(restored.property_json("Depth").unwrap(), serde_json::json!(3.5));
        let surface = restored.require::<Water>(Water::KEY).unwrap();
        assert_eq!(surface.position.get(), Vec3::new(1.0, 2.0, 3.0));
        assert!(loaded.find("lake").is_some());
    }

    #[test]
    fn test_restore_keeps_entity_references_across_id_gaps() {
        let registry = FactoryRegistry::with_defaults();
        let mut world = World::default();
        let dropped = registry.spawn("Counter", &mut world).unwrap();
        let switch = registry.spawn("Counter", &mut world).unwrap();
        let gate = registry.spawn("LogicGate", &mut world).unwrap();
        gate.set_property_json("Input1Target", serde_json::json!(switch.id()))
            .unwrap();
        dropped.delete();
        world.purge();

        let saved: Vec<EntitySnapshot> = world.entities().iter().map(|e| e.snapshot().unwrap()).collect();
        let mut loaded = World::default();
        for snapshot in &saved {
            registry.restore(&mut loaded, snapshot).unwrap();
        }

        assert!(loaded.get(switch.id()).is_some_and(|e| e.kind() == "Counter"));
        let restored_gate = loaded.get(gate.id()).unwrap();
        assert_eq!(
            restored_gate.property_json("Input1Target").unwrap(),
            serde_json::json!(switch.id())
        );
        let fresh = registry.spawn("Starter", &mut loaded).unwrap();
        assert!(fresh.id() > gate.id());
    }

    #[test]
    fn test_restore_into_taken_id_uses_fresh_id() {
        let registry = FactoryRegistry::with_defaults();
        let mut world = World::default();
        let original = registry.spawn("Counter", &mut world).unwrap();
        let snapshot = original.snapshot().unwrap();
        let copy = registry.restore(&mut world, &snapshot).unwrap();
        assert_ne!(copy.id(), original.id());
        assert_eq!(world.entity_count(), 2);
    }

    #[test]
    fn test_duplicate_copies_everything_but_id() {
        let registry = FactoryRegistry::with_defaults();
        let mut world = World::default();
        let original = registry.spawn("Fog", &mut world).unwrap();
        original.name().set(String::from("valley_fog"));
        original.set_property_json("EndDistance", serde_json::json!(250.0)).unwrap();
        original.set_property_json("Position", serde_json::json!([0.0, 40.0, 0.0])).unwrap();

        let copy = registry.duplicate(&mut world, &original).unwrap();
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.name().get(), "");
        assert_eq!(copy.property_json("EndDistance").unwrap(), serde_json::json!(250.0));
        let transform = copy.require::<Transform>(Transform::KEY).unwrap();
        assert_eq!(transform.position.get().y, 40.0);
        assert_eq!(world.entity_count(), 2);
    }
}
