use std::rc::Rc;

use engine_entity::{Component, Entity, World};
use glam::Vec3;

use super::{expose_toggles, transform};
use crate::components::Starter;
use crate::editor::make_scriptlike;
use crate::error::FactoryError;
use crate::factory::Factory;

/// Level start triggers.
#[derive(Debug, Default, Clone, Copy)]
pub struct StarterFactory;

impl Factory for StarterFactory {
    fn kind(&self) -> &'static str {
        "Starter"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(0.2, 1.0, 0.2)
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        entity.set_cannot_suspend_by_distance(true);
        transform(entity)?;
        let starter = entity.try_get_or_insert_default::<Starter>(Starter::KEY)?;
        entity.expose("Delay", &starter.delay);
        entity.expose_command("OnStart", &starter.on_start);
        expose_toggles(entity, starter.base());
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        make_scriptlike(entity, self.color())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use engine_bind::ObserverId;

    use super::*;

    #[test]
    fn test_on_start_fires_after_delay() {
        let mut world = World::default();
        let entity = StarterFactory.create(&mut world);
        StarterFactory.bind(&entity, &world, true).unwrap();
        entity.set_property_json("Delay", serde_json::json!(1.0)).unwrap();
        world.add(Rc::clone(&entity));

        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        entity
            .command("OnStart")
            .unwrap()
            .add_listener(ObserverId::next(), move |()| counter.set(counter.get() + 1));

        world.start();
        assert_eq!(hits.get(), 0);
        world.update(0.5);
        world.update(0.5);
        world.update(0.5);
        assert_eq!(hits.get(), 1);
        assert!(entity.cannot_suspend_by_distance());
    }
}
