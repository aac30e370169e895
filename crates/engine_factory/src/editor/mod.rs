//! Editor decoration shared by several factories.
//!
//! Everything here is get-or-create: calling a helper twice on the same
//! entity leaves one set of components and one set of bindings.

pub mod entity_connectable;
pub mod scriptlike;
pub mod voxel_attachable;

use std::rc::Rc;

use engine_bind::{Command, PropertyBinding};
use engine_entity::{Component, Entity, Exposed, FileFilter, World};
use engine_math::Transform;
use glam::{Mat4, Vec3};
use serde::de::DeserializeOwned;

use crate::components::{EditorSelection, Model, ModelShape};
use crate::error::FactoryError;

pub use entity_connectable::{attach_connection_line, make_connectable};
pub use scriptlike::make_scriptlike;
pub use voxel_attachable::{Attachment, make_attachable};

/// Key of the primary editor gizmo model.
pub const EDITOR_MODEL: &str = "EditorModel";

/// Key of the secondary editor gizmo model.
pub const EDITOR_MODEL_2: &str = "EditorModel2";

/// Extension of sound bank files.
pub const SOUND_BANK_EXTENSION: &str = "bnk";

/// Get or create a gizmo model under `key`, tinted with `color` and placed
/// at the entity's transform position when it has one.
pub fn attach_editor_model(
    entity: &Rc<Entity>,
    key: &str,
    shape: ModelShape,
    color: Vec3,
) -> Result<Rc<Model>, FactoryError> {
    let (model, fresh) = entity.try_get_or_insert_default_tracked::<Model>(key)?;
    if fresh {
        model.base().set_serialize(false);
        model.base().set_editable(false);
        model.shape.set(shape);
        model.color.set(color);
        if let Some(transform) = entity.get::<Transform>(Transform::KEY) {
            let binding = PropertyBinding::map(&model.transform, &transform.position, |position| {
                Mat4::from_translation(*position)
            });
            model.base().add_binding(binding);
        }
    }
    Ok(model)
}

/// The entity's editor selection state.
pub fn selection(entity: &Rc<Entity>) -> Result<Rc<EditorSelection>, FactoryError> {
    let selection = entity.try_get_or_insert_default::<EditorSelection>(EditorSelection::KEY)?;
    selection.base().set_serialize(false);
    Ok(selection)
}

/// The command exposed under `name`, or a new one exposed there.
pub fn get_or_make_command<A>(entity: &Entity, name: &str) -> Command<A>
where
    A: Clone + DeserializeOwned + 'static,
{
    if let Some(Exposed::Command(handle)) = entity.exposed(name)
        && let Some(command) = handle.downcast::<A>()
    {
        return command;
    }
    let command = Command::new();
    entity.expose_command(name, &command);
    command
}

/// File filter for sound bank paths, rooted at the world's sound bank directory.
#[must_use]
pub fn sound_bank_filter(world: &World) -> FileFilter {
    FileFilter::new(world.config().sound_bank_dir.clone(), SOUND_BANK_EXTENSION)
}
