use std::rc::Rc;

use engine_bind::PropertyBinding;
use engine_entity::{Component, Entity, PropertyMeta, World};
use glam::Vec3;

use super::transform;
use crate::components::{Model, ModelShape, Speaker};
use crate::editor::{EDITOR_MODEL, attach_editor_model};
use crate::error::FactoryError;
use crate::factory::Factory;

/// Characters that speak lines. In the editor a placeholder sphere stands in
/// until the actor has a valid model.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoiceActorFactory;

impl Factory for VoiceActorFactory {
    fn kind(&self) -> &'static str {
        "VoiceActor"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(0.9, 0.3, 0.9)
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        let transform = transform(entity)?;

        let (model, fresh) = entity.try_get_or_insert_default_tracked::<Model>(Model::KEY)?;
        if fresh {
            model
                .base()
                .add_binding(PropertyBinding::new(&model.transform, &transform.matrix));
        }

        let (speaker, fresh) = entity.try_get_or_insert_default_tracked::<Speaker>(Speaker::KEY)?;
        if fresh {
            speaker
                .base()
                .add_binding(PropertyBinding::new(&speaker.position, &transform.position));
        }

        entity.expose("Model", &model.filename);
        entity.expose_command("Speak", &speaker.speak);
        entity.expose_with("Speaking", &speaker.speaking, PropertyMeta::readonly());
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        let model = entity.require::<Model>(Model::KEY)?;
        let fresh = !entity.has_component(EDITOR_MODEL);
        let placeholder = attach_editor_model(entity, EDITOR_MODEL, ModelShape::Sphere, self.color())?;
        if fresh {
            let shown = PropertyBinding::map(&placeholder.base().enabled, &model.is_valid, |valid: &bool| !valid);
            placeholder.base().add_binding(shown);
        }
        Ok(())
    }
}
