//! The built-in factories, one per entity kind.

mod ambient_sound;
mod counter;
mod explosion;
mod fog;
mod logic_gate;
mod sound_bank;
mod starter;
mod ticker;
mod voice_actor;
mod water;

use std::rc::Rc;

use engine_entity::{ComponentBase, Entity};
use engine_math::Transform;

use crate::error::FactoryError;
use crate::factory::Factory;

pub use ambient_sound::AmbientSoundFactory;
pub use counter::CounterFactory;
pub use explosion::ExplosionFactory;
pub use fog::FogFactory;
pub use logic_gate::LogicGateFactory;
pub use sound_bank::SoundBankFactory;
pub use starter::StarterFactory;
pub use ticker::{RandomTickerFactory, TickerFactory, TimerFactory};
pub use voice_actor::VoiceActorFactory;
pub use water::WaterFactory;

/// Every built-in factory.
#[must_use]
pub fn all() -> Vec<Box<dyn Factory>> {
    vec![
        Box::new(AmbientSoundFactory),
        Box::new(SoundBankFactory),
        Box::new(CounterFactory),
        Box::new(TickerFactory),
        Box::new(RandomTickerFactory),
        Box::new(TimerFactory),
        Box::new(WaterFactory),
        Box::new(ExplosionFactory),
        Box::new(VoiceActorFactory),
        Box::new(FogFactory),
        Box::new(StarterFactory),
        Box::new(LogicGateFactory),
    ]
}

/// The entity's transform, with its position and rotation exposed.
pub(crate) fn transform(entity: &Rc<Entity>) -> Result<Rc<Transform>, FactoryError> {
    let transform = entity.try_get_or_insert_default::<Transform>(Transform::KEY)?;
    entity.expose("Position", &transform.position);
    entity.expose("Rotation", &transform.rotation);
    Ok(transform)
}

/// Expose a component's `Enable` and `Disable` commands.
pub(crate) fn expose_toggles(entity: &Entity, base: &ComponentBase) {
    entity.expose_command("Enable", &base.enable);
    entity.expose_command("Disable", &base.disable);
}

#[cfg(test)]
mod tests {
    use engine_entity::{World, WorldConfig};

    use super::*;

    fn editor_world() -> World {
        World::new(WorldConfig {
            editor_enabled: true,
            ..WorldConfig::default()
        })
    }

    #[test]
    fn test_kinds_are_unique() {
        let mut kinds: Vec<&str> = all().iter().map(|factory| factory.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), 12);
    }

    #[test]
    fn test_bind_twice_changes_nothing() {
        for world in [World::default(), editor_world()] {
            let mut world = world;
            for factory in all() {
                let entity = factory.create(&mut world);
                factory.bind(&entity, &world, true).unwrap();
                let keys = entity.component_keys();
                let names = entity.exposed_names();
                let bindings = entity.binding_count();
                let component_bindings: Vec<usize> =
                    entity.components().iter().map(|c| c.base().binding_count()).collect();

                factory.bind(&entity, &world, false).unwrap();
                assert_eq!(entity.component_keys(), keys, "{}", factory.kind());
                assert_eq!(entity.exposed_names(), names, "{}", factory.kind());
                assert_eq!(entity.binding_count(), bindings, "{}", factory.kind());
                let after: Vec<usize> = entity.components().iter().map(|c| c.base().binding_count()).collect();
                assert_eq!(after, component_bindings, "{}", factory.kind());
                assert!(entity.is_bound());
            }
        }
    }

    #[test]
    fn test_editor_components_twice_adds_nothing() {
        let mut world = editor_world();
        for factory in all() {
            let entity = factory.create(&mut world);
            factory.bind(&entity, &world, true).unwrap();
            factory.attach_editor_components(&entity, &world).unwrap();
            let keys = entity.component_keys();
            let component_bindings: Vec<usize> =
                entity.components().iter().map(|c| c.base().binding_count()).collect();

            factory.attach_editor_components(&entity, &world).unwrap();
            assert_eq!(entity.component_keys(), keys, "{}", factory.kind());
            let after: Vec<usize> = entity.components().iter().map(|c| c.base().binding_count()).collect();
            assert_eq!(after, component_bindings, "{}", factory.kind());
            assert!(entity.has_component(crate::editor::EDITOR_MODEL), "{}", factory.kind());
        }
    }

    #[test]
    fn test_entities_are_tagged_with_their_kind() {
        let mut world = World::default();
        for factory in all() {
            let entity = factory.create(&mut world);
            assert_eq!(entity.kind(), factory.kind());
        }
    }
}
