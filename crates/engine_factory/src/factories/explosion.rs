use std::rc::Rc;

use engine_bind::{CommandBinding, PropertyBinding};
use engine_entity::{Component, Entity, World};
use glam::Vec3;

use super::transform;
use crate::components::{Explosion, ModelShape};
use crate::editor::voxel_attachable::attach_offset_gizmo;
use crate::editor::{EDITOR_MODEL, attach_editor_model, get_or_make_command, make_attachable};
use crate::error::FactoryError;
use crate::factory::Factory;

/// Scripted explosions. An explosion attached to a voxel goes off when its
/// anchor is lost.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplosionFactory;

impl Factory for ExplosionFactory {
    fn kind(&self) -> &'static str {
        "Explosion"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(1.0, 0.2, 0.1)
    }

    fn bind(&self, entity: &Rc<Entity>, world: &World, _creating: bool) -> Result<(), FactoryError> {
        let transform = transform(entity)?;
        let (explosion, fresh) = entity.try_get_or_insert_default_tracked::<Explosion>(Explosion::KEY)?;
        let explode: engine_bind::Command = get_or_make_command(entity, "Explode");
        if fresh {
            explosion
                .base()
                .add_binding(PropertyBinding::new(&explosion.position, &transform.position));
            explosion.base().add_binding(CommandBinding::new(&explode, &explosion.go));
            // Removing the explosion takes the entity with it. The entity owns
            // this link so it outlives the component's own bindings.
            entity.add_binding(CommandBinding::new(&explosion.base().delete, entity.delete_command()));
        }

        entity.expose("Radius", &explosion.radius);
        entity.expose("PhysicsRadius", &explosion.physics_radius);
        entity.expose("DeleteAfter", &explosion.delete_after);
        make_attachable(entity, world, true, true, Some(explode));
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        attach_editor_model(entity, EDITOR_MODEL, ModelShape::Sphere, self.color())?;
        attach_offset_gizmo(entity, self.color())?;
        Ok(())
    }
}
