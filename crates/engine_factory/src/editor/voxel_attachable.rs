//! Attaching entities to voxel cells.
//!
//! An attachable entity remembers which voxel entity and which cell it sits
//! on. The voxel simulation reports emptied cells and moved bodies through the
//! `CellsEmptied` and `CellsMoved` commands; losing the anchor either deletes
//! the entity (or runs a stand-in command) or just detaches it.

use std::rc::Rc;

use engine_bind::{AnyProperty, Command, Property, PropertyBinding};
use engine_entity::{Component, Entity, EntityId, World};
use engine_math::VoxelCoord;
use glam::Vec3;
use tracing::debug;

use super::{EDITOR_MODEL_2, attach_editor_model, get_or_make_command, selection};
use crate::components::{Model, ModelShape};
use crate::error::FactoryError;

pub const ATTACHMENT_OFFSET: &str = "AttachmentOffset";
pub const ATTACHED_VOXEL: &str = "AttachedVoxel";
pub const ATTACHED_COORDINATE: &str = "AttachedCoordinate";
pub const DETACH: &str = "Detach";
pub const CELLS_EMPTIED: &str = "CellsEmptied";
pub const CELLS_MOVED: &str = "CellsMoved";

/// Handles to the attachment state of an entity.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Distance from the cell surface.
    pub offset: Property<f32>,
    pub voxel: Property<EntityId>,
    pub coordinate: Property<VoxelCoord>,
    pub detach: Command,
    pub cells_emptied: Command<VoxelCoord>,
    pub cells_moved: Command<EntityId>,
}

impl Attachment {
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.voxel.get().is_valid()
    }
}

/// Make `entity` attachable to voxels.
///
/// When the anchor cell is emptied and `delete_if_removed` is set, or the
/// anchor body moves and `delete_if_moved` is set, `delete_command` runs
/// (the entity's own delete when `None`). Otherwise the entity detaches or
/// follows the moved body. Editor worlds only get the properties.
pub fn make_attachable(
    entity: &Rc<Entity>,
    world: &World,
    delete_if_removed: bool,
    delete_if_moved: bool,
    delete_command: Option<Command>,
) -> Attachment {
    let offset = entity.get_or_make_property(ATTACHMENT_OFFSET, 0.0_f32);
    let voxel = entity.get_or_make_property(ATTACHED_VOXEL, EntityId::INVALID);
    let coordinate = entity.get_or_make_property(ATTACHED_COORDINATE, VoxelCoord::ZERO);

    if world.is_editor() {
        return Attachment {
            offset,
            voxel,
            coordinate,
            detach: Command::new(),
            cells_emptied: Command::new(),
            cells_moved: Command::new(),
        };
    }

    let detach: Command = get_or_make_command(entity, DETACH);
    let cells_emptied: Command<VoxelCoord> = get_or_make_command(entity, CELLS_EMPTIED);
    let cells_moved: Command<EntityId> = get_or_make_command(entity, CELLS_MOVED);
    let on_anchor_lost = delete_command.unwrap_or_else(|| entity.delete_command().clone());

    let (anchor, id) = (voxel.clone(), entity.id());
    detach.set_action(move |()| {
        if anchor.get().is_valid() {
            debug!(entity = %id, voxel = %anchor.get(), "detached from voxel");
            anchor.set(EntityId::INVALID);
        }
    });

    let (anchor, cell, lost, loose) = (
        voxel.clone(),
        coordinate.clone(),
        on_anchor_lost.clone(),
        detach.clone(),
    );
    cells_emptied.set_action(move |emptied: VoxelCoord| {
        if !anchor.get().is_valid() || emptied != cell.get() {
            return;
        }
        if delete_if_removed {
            lost.execute();
        } else {
            loose.execute();
        }
    });

    let (anchor, lost) = (voxel.clone(), on_anchor_lost);
    cells_moved.set_action(move |body: EntityId| {
        if !anchor.get().is_valid() {
            return;
        }
        if delete_if_moved {
            lost.execute();
        } else {
            anchor.set(body);
        }
    });

    Attachment {
        offset,
        voxel,
        coordinate,
        detach,
        cells_emptied,
        cells_moved,
    }
}

/// Editor cone showing the attachment offset, visible while the entity is
/// selected and the offset is positive.
pub fn attach_offset_gizmo(entity: &Rc<Entity>, color: Vec3) -> Result<Rc<Model>, FactoryError> {
    let offset = entity.get_or_make_property(ATTACHMENT_OFFSET, 0.0_f32);
    let selected = selection(entity)?.selected.clone();
    let fresh = !entity.has_component(EDITOR_MODEL_2);
    let cone = attach_editor_model(entity, EDITOR_MODEL_2, ModelShape::Cone, color)?;
    if fresh {
        let (s, o) = (selected.downgrade(), offset.downgrade());
        let sources: [&dyn AnyProperty; 2] = [&selected, &offset];
        let visible = PropertyBinding::computed(
            &cone.base().enabled,
            move || {
                let selected = s.upgrade().is_some_and(|s| s.get());
                let offset = o.upgrade().map_or(0.0, |o| o.get());
                selected && offset > 0.0
            },
            &sources,
        );
        cone.base().add_binding(visible);
        cone.base().add_binding(PropertyBinding::new(&cone.scale, &offset));
    }
    Ok(cone)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use engine_entity::WorldConfig;

    use super::*;

    fn attached(world: &mut World, delete_if_removed: bool, delete_if_moved: bool) -> (Rc<Entity>, Attachment) {
        let entity = world.allocate("Test");
        let attachment = make_attachable(&entity, world, delete_if_removed, delete_if_moved, None);
        attachment.voxel.set(EntityId(50));
        attachment.coordinate.set(VoxelCoord::new(1, 2, 3));
        world.add(Rc::clone(&entity));
        (entity, attachment)
    }

    #[test]
    fn test_exposes_properties_and_commands() {
        let mut world = World::default();
        let (entity, _) = attached(&mut world, false, false);
        let names = entity.exposed_names();
        for name in [ATTACHMENT_OFFSET, ATTACHED_VOXEL, ATTACHED_COORDINATE, DETACH, CELLS_EMPTIED, CELLS_MOVED] {
            assert!(names.iter().any(|n| n == name), "{name} missing");
        }
    }

    #[test]
    fn test_editor_world_gets_properties_only() {
        let mut world = World::new(WorldConfig {
            editor_enabled: true,
            ..WorldConfig::default()
        });
        let entity = world.allocate("Test");
        make_attachable(&entity, &world, true, true, None);
        assert!(entity.property::<EntityId>(ATTACHED_VOXEL).is_ok());
        assert!(entity.command(DETACH).is_err());
    }

    #[test]
    fn test_emptied_other_cell_is_ignored() {
        let mut world = World::default();
        let (entity, attachment) = attached(&mut world, true, false);
        attachment.cells_emptied.execute_with(VoxelCoord::new(9, 9, 9));
        assert!(entity.is_active());
        assert!(attachment.is_attached());
    }

    #[test]
    fn test_emptied_anchor_deletes_entity() {
        let mut world = World::default();
        let (entity, attachment) = attached(&mut world, true, false);
        attachment.cells_emptied.execute_with(VoxelCoord::new(1, 2, 3));
        assert!(!entity.is_active());
    }

    #[test]
    fn test_emptied_anchor_detaches_when_not_deleting() {
        let mut world = World::default();
        let (entity, attachment) = attached(&mut world, false, false);
        attachment.cells_emptied.execute_with(VoxelCoord::new(1, 2, 3));
        assert!(entity.is_active());
        assert!(!attachment.is_attached());
    }

    #[test]
    fn test_moved_body_is_followed_or_runs_stand_in() {
        let mut world = World::default();
        let (_, follows) = attached(&mut world, false, false);
        follows.cells_moved.execute_with(EntityId(51));
        assert_eq!(follows.voxel.get(), EntityId(51));

        let entity = world.allocate("Test");
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let stand_in = Command::from_fn(move || flag.set(true));
        let attachment = make_attachable(&entity, &world, false, true, Some(stand_in));
        attachment.voxel.set(EntityId(50));
        attachment.cells_moved.execute_with(EntityId(52));
        assert!(ran.get());
        assert!(entity.is_active());
    }

    #[test]
    fn test_offset_gizmo_visible_when_selected_with_offset() {
        let entity = Entity::new(EntityId(1), "Test");
        let cone = attach_offset_gizmo(&entity, Vec3::ONE).unwrap();
        assert!(!cone.base().enabled.get());

        let offset = entity.property::<f32>(ATTACHMENT_OFFSET).unwrap();
        offset.set(2.0);
        assert!(!cone.base().enabled.get());
        entity.get::<crate::components::EditorSelection>(crate::components::EditorSelection::KEY)
            .unwrap()
            .selected
            .set(true);
        assert!(cone.base().enabled.get());
        assert_eq!(cone.scale.get(), 2.0);

        attach_offset_gizmo(&entity, Vec3::ONE).unwrap();
        assert_eq!(offset.observer_count(), 2);
    }
}
