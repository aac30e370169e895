//! The [`Factory`] contract.

use std::rc::Rc;

use engine_entity::{Entity, World};
use glam::Vec3;

use crate::components::ModelShape;
use crate::editor::{EDITOR_MODEL, attach_editor_model};
use crate::error::FactoryError;

/// Builds one kind of entity.
///
/// Implementations are stateless; everything they build lives on the entity.
pub trait Factory {
    /// Kind name, also the tag on every entity the factory creates.
    fn kind(&self) -> &'static str;

    /// Tint of the kind's editor gizmos.
    fn color(&self) -> Vec3 {
        Vec3::ONE
    }

    /// Allocate an empty entity tagged with [`Factory::kind`].
    fn create(&self, world: &mut World) -> Rc<Entity> {
        world.allocate(self.kind())
    }

    /// Attach components, wire bindings and expose members.
    ///
    /// `creating` is `true` for a brand-new entity and `false` when the entity
    /// is being rebuilt from saved state. Binding an entity twice must leave it
    /// unchanged.
    fn bind(&self, entity: &Rc<Entity>, world: &World, creating: bool) -> Result<(), FactoryError>;

    /// Add editor-only components. The default is a sphere tinted with
    /// [`Factory::color`] that follows the entity's transform.
    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        attach_editor_model(entity, EDITOR_MODEL, ModelShape::Sphere, self.color())?;
        Ok(())
    }
}
