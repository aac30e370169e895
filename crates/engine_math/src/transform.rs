//! 3D transform component.
//!
//! [`Transform`] carries position and rotation as observable cells and keeps a
//! model matrix computed from them. Nearly every placed entity has one, and
//! other components bind to its cells rather than copying values.

use engine_bind::{AnyProperty, Property, PropertyBinding};
use engine_entity::{Component, ComponentBase};
use glam::{Mat4, Quat, Vec3};

/// Position and rotation of an entity, plus the derived model matrix.
#[derive(Debug)]
pub struct Transform {
    base: ComponentBase,
    /// World-space position.
    pub position: Property<Vec3>,
    /// Rotation as a unit quaternion.
    pub rotation: Property<Quat>,
    /// `translation(position) * rotation`, recomputed on every write.
    pub matrix: Property<Mat4>,
}

impl Transform {
    /// Key factories store the transform under.
    pub const KEY: &'static str = "Transform";

    /// Compute the model matrix for a position and rotation.
    #[must_use]
    pub fn compose(position: Vec3, rotation: Quat) -> Mat4 {
        Mat4::from_rotation_translation(rotation, position)
    }

    /// Move by `offset`.
    pub fn translate(&self, offset: Vec3) {
        self.position.update(|position| *position += offset);
    }

    /// Rotate by `rotation`, applied after the current rotation.
    pub fn rotate(&self, rotation: Quat) {
        self.rotation.update(|current| *current = rotation * *current);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            position: Property::new(Vec3::ZERO),
            rotation: Property::new(Quat::IDENTITY),
            matrix: Property::new(Mat4::IDENTITY),
        }
    }
}

impl Component for Transform {
    fn type_name() -> &'static str {
        "Transform"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let position = self.position.downgrade();
        let rotation = self.rotation.downgrade();
        let sources: [&dyn AnyProperty; 2] = [&self.position, &self.rotation];
        let binding = PropertyBinding::computed(
            &self.matrix,
            move || match (position.upgrade(), rotation.upgrade()) {
                (Some(position), Some(rotation)) => Self::compose(position.get(), rotation.get()),
                _ => Mat4::IDENTITY,
            },
            &sources,
        );
        self.base.add_binding(binding);
    }
}

#[cfg(test)]
mod tests {
    use engine_entity::{Entity, EntityId};

    use super::*;

    fn attached() -> (std::rc::Rc<Entity>, std::rc::Rc<Transform>) {
        let entity = Entity::new(EntityId(1), "Test");
        let transform = entity.try_get_or_insert_default::<Transform>(Transform::KEY).unwrap();
        (entity, transform)
    }

    #[test]
    fn test_identity_by_default() {
        let (_entity, t) = attached();
        assert_eq!(t.position.get(), Vec3::ZERO);
        assert_eq!(t.rotation.get(), Quat::IDENTITY);
        assert_eq!(t.matrix.get(), Mat4::IDENTITY);
    }

    #[test]
    fn test_matrix_follows_position() {
        let (_entity, t) = attached();
        t.position.set(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.matrix.get(), Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        t.translate(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(t.matrix.get().w_axis.truncate(), Vec3::new(2.0, 2.0, 3.0));
    }

    #[test]
    fn test_matrix_follows_rotation() {
        let (_entity, t) = attached();
        let quarter = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        t.rotate(quarter);
        assert_eq!(t.matrix.get(), Transform::compose(Vec3::ZERO, quarter));
    }

    #[test]
    fn test_unattached_transform_has_no_matrix_binding() {
        let t = Transform::default();
        t.position.set(Vec3::ONE);
        assert_eq!(t.matrix.get(), Mat4::IDENTITY);
    }

    #[test]
    fn test_delete_stops_matrix_updates() {
        let (entity, t) = attached();
        entity.remove_component(Transform::KEY);
        t.position.set(Vec3::ONE);
        assert_eq!(t.matrix.get(), Mat4::IDENTITY);
        assert_eq!(t.position.observer_count(), 0);
    }
}
