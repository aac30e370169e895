use std::rc::Rc;

use engine_bind::PropertyBinding;
use engine_entity::{Component, Entity, World};
use engine_math::Transform;
use glam::Vec3;

use super::transform;
use crate::components::Fog;
use crate::error::FactoryError;
use crate::factory::Factory;

/// Distance fog volumes. Fog is visible from afar, so it is never suspended
/// by distance.
#[derive(Debug, Default, Clone, Copy)]
pub struct FogFactory;

impl Factory for FogFactory {
    fn kind(&self) -> &'static str {
        "Fog"
    }

    fn color(&self) -> Vec3 {
        Vec3::new(0.7, 0.7, 0.7)
    }

    fn create(&self, world: &mut World) -> Rc<Entity> {
        let entity = world.allocate(self.kind());
        entity.add_component(Transform::KEY, Transform::default());
        entity.add_component(Fog::KEY, Fog::default());
        entity
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        entity.set_cannot_suspend_by_distance(true);
        let transform = transform(entity)?;
        let fog = entity.try_get_or_insert_default::<Fog>(Fog::KEY)?;
        if !entity.is_bound() {
            let center = PropertyBinding::map(&fog.vertical_center, &transform.position, |position: &Vec3| position.y);
            fog.base().add_binding(center);
        }

        entity.expose("Color", &fog.color);
        entity.expose("StartDistance", &fog.start_distance);
        entity.expose("EndDistance", &fog.end_distance);
        entity.expose("VerticalSize", &fog.vertical_size);
        entity.mark_bound();
        Ok(())
    }
}
