//! Distance and height fog parameters.

use engine_bind::Property;
use engine_entity::{Component, ComponentBase};
use glam::Vec3;

#[derive(Debug)]
pub struct Fog {
    base: ComponentBase,
    pub color: Property<Vec3>,
    pub start_distance: Property<f32>,
    pub end_distance: Property<f32>,
    /// Height the fog layer is centered on.
    pub vertical_center: Property<f32>,
    pub vertical_size: Property<f32>,
}

impl Fog {
    pub const KEY: &'static str = "Fog";

    /// Fog density in `[0, 1]` at `distance` from the viewer.
    #[must_use]
    pub fn density_at(&self, distance: f32) -> f32 {
        let (start, end) = (self.start_distance.get(), self.end_distance.get());
        if end <= start {
            return if distance >= start { 1.0 } else { 0.0 };
        }
        ((distance - start) / (end - start)).clamp(0.0, 1.0)
    }
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            color: Property::new(Vec3::new(0.6, 0.65, 0.7)),
            start_distance: Property::new(10.0),
            end_distance: Property::new(100.0),
            vertical_center: Property::new(0.0),
            vertical_size: Property::new(50.0),
        }
    }
}

impl Component for Fog {
    fn type_name() -> &'static str {
        "Fog"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_ramps_between_distances() {
        let fog = Fog::default();
        assert_eq!(fog.density_at(5.0), 0.0);
        assert_eq!(fog.density_at(55.0), 0.5);
        assert_eq!(fog.density_at(500.0), 1.0);

        fog.end_distance.set(10.0);
        assert_eq!(fog.density_at(9.0), 0.0);
        assert_eq!(fog.density_at(10.0), 1.0);
    }
}
