use std::rc::Rc;

use engine_bind::PropertyBinding;
use engine_entity::{Component, Entity, PropertyMeta, World};
use glam::Vec3;

use super::{expose_toggles, transform};
use crate::components::AmbientSound;
use crate::error::FactoryError;
use crate::factory::Factory;

/// Looping positional sounds.
#[derive(Debug, Default, Clone, Copy)]
pub struct AmbientSoundFactory;

impl Factory for AmbientSoundFactory {
    fn kind(&self) -> &'static str {
        "AmbientSound"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(1.0, 0.75, 0.2)
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        let transform = transform(entity)?;
        let (sound, fresh) = entity.try_get_or_insert_default_tracked::<AmbientSound>(AmbientSound::KEY)?;
        if fresh {
            sound
                .base()
                .add_binding(PropertyBinding::new(&sound.position, &transform.position));
        }

        entity.expose("PlayEvent", &sound.play_event);
        entity.expose("StopEvent", &sound.stop_event);
        entity.expose("Is3D", &sound.is_3d);
        entity.expose_with("Playing", &sound.playing, PropertyMeta::readonly());
        entity.expose_command("Play", &sound.play);
        entity.expose_command("Stop", &sound.stop);
        expose_toggles(entity, sound.base());
        entity.mark_bound();
        Ok(())
    }
}
