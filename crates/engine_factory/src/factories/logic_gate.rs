use std::rc::Rc;

use engine_entity::{Entity, PropertyMeta, World};
use glam::Vec3;

use super::transform;
use crate::components::LogicGate;
use crate::editor::{attach_connection_line, make_connectable, make_scriptlike};
use crate::error::FactoryError;
use crate::factory::Factory;

/// Two-input logic gates whose inputs can be connected to other entities.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogicGateFactory;

impl Factory for LogicGateFactory {
    fn kind(&self) -> &'static str {
        "LogicGate"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(0.0, 1.0, 1.0)
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        transform(entity)?;
        let gate = entity.try_get_or_insert_default::<LogicGate>(LogicGate::KEY)?;

        entity.expose("Mode", &gate.mode);
        entity.expose("Input1", &gate.input1);
        entity.expose("Input2", &gate.input2);
        entity.expose_with("Output", &gate.output, PropertyMeta::readonly());
        entity.expose("Input1Target", &gate.input1_target);
        entity.expose("Input1TargetProperty", &gate.input1_target_property);
        entity.expose("Input2Target", &gate.input2_target);
        entity.expose("Input2TargetProperty", &gate.input2_target_property);
        entity.expose_command("Input1On", &gate.input1_on);
        entity.expose_command("Input1Off", &gate.input1_off);
        entity.expose_command("Input2On", &gate.input2_on);
        entity.expose_command("Input2Off", &gate.input2_off);
        entity.expose_command("OutputOn", &gate.output_on);
        entity.expose_command("OutputOff", &gate.output_off);

        make_connectable(entity, "Input1Target", &gate.input1_target);
        make_connectable(entity, "Input2Target", &gate.input2_target);
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        make_scriptlike(entity, self.color())?;
        attach_connection_line(entity, "Input1Target", self.color())?;
        attach_connection_line(entity, "Input2Target", self.color())?;
        Ok(())
    }
}
