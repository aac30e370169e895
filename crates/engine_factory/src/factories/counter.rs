use std::rc::Rc;

use engine_entity::{Entity, World};
use glam::Vec3;

use super::transform;
use crate::components::Counter;
use crate::editor::make_scriptlike;
use crate::error::FactoryError;
use crate::factory::Factory;

/// Scripted integer counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterFactory;

impl Factory for CounterFactory {
    fn kind(&self) -> &'static str {
        "Counter"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(0.4, 0.4, 1.0)
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        transform(entity)?;
        let counter = entity.try_get_or_insert_default::<Counter>(Counter::KEY)?;
        entity.expose("Value", &counter.value);
        entity.expose("Start", &counter.start_value);
        entity.expose("Target", &counter.target);
        entity.expose("StepSize", &counter.step_size);
        entity.expose_command("Increment", &counter.increment);
        entity.expose_command("Decrement", &counter.decrement);
        entity.expose_command("Reset", &counter.reset);
        entity.expose_command("OnTarget", &counter.on_target);
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        make_scriptlike(entity, self.color())
    }
}
