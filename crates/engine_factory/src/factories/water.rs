use std::rc::Rc;

use engine_bind::TwoWayBinding;
use engine_entity::{Component, Entity, World};
use glam::Vec3;

use super::transform;
use crate::components::Water;
use crate::error::FactoryError;
use crate::factory::Factory;

/// Water surfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaterFactory;

impl Factory for WaterFactory {
    fn kind(&self) -> &'static str {
        "Water"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(0.2, 0.4, 1.0)
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        let transform = transform(entity)?;
        let (water, fresh) = entity.try_get_or_insert_default_tracked::<Water>(Water::KEY)?;
        if fresh {
            // The surface can be moved from either side; the transform wins on creation.
            water
                .base()
                .add_binding(TwoWayBinding::new(&transform.position, &water.position));
        }

        entity.expose("Color", &water.color);
        entity.expose("UnderwaterColor", &water.underwater_color);
        entity.expose("Depth", &water.depth);
        entity.expose("Scale", &water.scale);
        entity.expose("Fresnel", &water.fresnel);
        entity.expose("Speed", &water.speed);
        entity.mark_bound();
        Ok(())
    }
}
