//! Editor look for invisible scripting entities: a tinted sphere and a label.

use std::rc::Rc;

use engine_bind::PropertyBinding;
use engine_entity::{Component, Entity};
use glam::Vec3;

use super::{EDITOR_MODEL, attach_editor_model};
use crate::components::{EditorLabel, ModelShape};
use crate::error::FactoryError;

/// Give `entity` a sphere gizmo tinted with `color` and a label showing its
/// `ID`, or its kind while the `ID` is empty.
pub fn make_scriptlike(entity: &Rc<Entity>, color: Vec3) -> Result<(), FactoryError> {
    attach_editor_model(entity, EDITOR_MODEL, ModelShape::Sphere, color)?;

    let (label, fresh) = entity.try_get_or_insert_default_tracked::<EditorLabel>(EditorLabel::KEY)?;
    if fresh {
        label.base().set_serialize(false);
        let kind = entity.kind().to_owned();
        let binding = PropertyBinding::map(&label.text, entity.name(), move |name: &String| {
            if name.is_empty() { kind.clone() } else { name.clone() }
        });
        label.base().add_binding(binding);
    }
    Ok(())
}
