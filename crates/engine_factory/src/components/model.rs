//! Renderable model reference.

use engine_bind::{Property, PropertyBinding};
use engine_entity::{Component, ComponentBase};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// What a [`Model`] draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelShape {
    /// A mesh loaded from `filename`.
    #[default]
    Mesh,
    Sphere,
    Cone,
}

/// A model placed in the world. Rendering lives elsewhere; this only carries
/// what to draw and where.
#[derive(Debug)]
pub struct Model {
    base: ComponentBase,
    pub filename: Property<String>,
    pub shape: Property<ModelShape>,
    pub color: Property<Vec3>,
    pub scale: Property<f32>,
    /// World transform of the model.
    pub transform: Property<Mat4>,
    /// `true` while `filename` names something to load.
    pub is_valid: Property<bool>,
}

impl Model {
    pub const KEY: &'static str = "Model";
}

impl Default for Model {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            filename: Property::new(String::new()),
            shape: Property::new(ModelShape::Mesh),
            color: Property::new(Vec3::ONE),
            scale: Property::new(1.0),
            transform: Property::new(Mat4::IDENTITY),
            is_valid: Property::new(false),
        }
    }
}

impl Component for Model {
    fn type_name() -> &'static str {
        "Model"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let binding = PropertyBinding::map(&self.is_valid, &self.filename, |filename: &String| {
            !filename.trim().is_empty()
        });
        self.base.add_binding(binding);
    }
}

#[cfg(test)]
mod tests {
    use engine_entity::{Entity, EntityId};

    use super::*;

    #[test]
    fn test_validity_follows_filename() {
        let entity = Entity::new(EntityId(1), "Test");
        let model = entity.try_get_or_insert_default::<Model>(Model::KEY).unwrap();
        assert!(!model.is_valid.get());
        model.filename.set(String::from("Models/actor.glb"));
        assert!(model.is_valid.get());
        model.filename.set(String::from("  "));
        assert!(!model.is_valid.get());
    }
}
