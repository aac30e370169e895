use std::rc::Rc;

use engine_entity::{Entity, PropertyMeta, World};
use glam::Vec3;

use crate::components::SoundBank;
use crate::editor::sound_bank_filter;
use crate::error::FactoryError;
use crate::factory::Factory;

/// Sound bank loaders. Banks stay loaded wherever the viewer is.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoundBankFactory;

impl Factory for SoundBankFactory {
    fn kind(&self) -> &'static str {
        "SoundBank"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(1.0, 0.5, 0.0)
    }

    fn bind(&self, entity: &Rc<Entity>, world: &World, _creating: bool) -> Result<(), FactoryError> {
        entity.set_cannot_suspend(true);
        entity.set_cannot_suspend_by_distance(true);

        let bank = entity.try_get_or_insert_default::<SoundBank>(SoundBank::KEY)?;
        let path = PropertyMeta::default()
            .with_description("Sound bank file")
            .with_file_filter(sound_bank_filter(world));
        entity.expose_with("Bank", &bank.bank, path);
        entity.expose_with("Loaded", &bank.loaded, PropertyMeta::readonly());
        entity.expose_command("Load", &bank.load);
        entity.expose_command("Unload", &bank.unload);
        entity.mark_bound();
        Ok(())
    }
}
