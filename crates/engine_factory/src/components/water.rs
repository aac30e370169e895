//! Water surface parameters.

use engine_bind::Property;
use engine_entity::{Component, ComponentBase};
use glam::Vec3;

/// A water plane. Only its parameters live here.
#[derive(Debug)]
pub struct Water {
    base: ComponentBase,
    /// Surface origin; kept in sync with the entity's transform both ways.
    pub position: Property<Vec3>,
    pub color: Property<Vec3>,
    pub underwater_color: Property<Vec3>,
    pub depth: Property<f32>,
    pub scale: Property<f32>,
    pub fresnel: Property<f32>,
    pub speed: Property<f32>,
}

impl Water {
    pub const KEY: &'static str = "Water";
}

impl Default for Water {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            position: Property::new(Vec3::ZERO),
            color: Property::new(Vec3::new(0.1, 0.3, 0.4)),
            underwater_color: Property::new(Vec3::new(0.05, 0.15, 0.2)),
            depth: Property::new(10.0),
            scale: Property::new(1.0),
            fresnel: Property::new(0.5),
            speed: Property::new(1.0),
        }
    }
}

impl Component for Water {
    fn type_name() -> &'static str {
        "Water"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }
}
