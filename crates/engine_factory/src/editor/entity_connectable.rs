//! Connections from one entity to another.
//!
//! A connectable entity property holds the id of a target entity. The
//! `Toggle<Name>Connected` command connects a target, or disconnects it when
//! it is already the one connected. Editor worlds add a [`LineDrawer`] that
//! shows the connection while the entity is selected.

use std::rc::Rc;

use engine_bind::{Command, Property, PropertyBinding};
use engine_entity::{Component, Entity, EntityId};
use glam::Vec3;
use tracing::debug;

use super::{get_or_make_command, selection};
use crate::components::LineDrawer;
use crate::error::FactoryError;

/// Name of the toggle command for connection `name`.
#[must_use]
pub fn toggle_command_name(name: &str) -> String {
    format!("Toggle{name}Connected")
}

/// Make `target` connectable under `name`. Returns the toggle command.
pub fn make_connectable(entity: &Entity, name: &str, target: &Property<EntityId>) -> Command<EntityId> {
    let toggle: Command<EntityId> = get_or_make_command(entity, &toggle_command_name(name));
    let (connection, label, id) = (target.clone(), name.to_owned(), entity.id());
    toggle.set_action(move |other: EntityId| {
        let next = if connection.get() == other { EntityId::INVALID } else { other };
        debug!(entity = %id, connection = %label, target = %next, "connection toggled");
        connection.set(next);
    });
    toggle
}

/// Editor line for the connection exposed under `name`, visible while the
/// entity is selected.
pub fn attach_connection_line(entity: &Rc<Entity>, name: &str, color: Vec3) -> Result<Rc<LineDrawer>, FactoryError> {
    let target = entity.property::<EntityId>(name)?;
    let selected = selection(entity)?.selected.clone();
    let (drawer, fresh) = entity.try_get_or_insert_default_tracked::<LineDrawer>(&format!("{name}Line"))?;
    if fresh {
        drawer.base().set_serialize(false);
        drawer.color.set(color);
        drawer.base().add_binding(PropertyBinding::new(&drawer.target, &target));
        drawer.base().add_binding(PropertyBinding::new(&drawer.visible, &selected));
    }
    Ok(drawer)
}

#[cfg(test)]
mod tests {
    use engine_entity::{World, WorldConfig};
    use engine_math::Transform;

    use super::*;

    #[test]
    fn test_toggle_connects_and_disconnects() {
        let entity = Entity::new(EntityId(1), "LogicGate");
        let target = Property::new(EntityId::INVALID);
        make_connectable(&entity, "Input1Target", &target);

        entity.execute("ToggleInput1TargetConnected", serde_json::json!(5)).unwrap();
        assert_eq!(target.get(), EntityId(5));
        entity.execute("ToggleInput1TargetConnected", serde_json::json!(6)).unwrap();
        assert_eq!(target.get(), EntityId(6));
        entity.execute("ToggleInput1TargetConnected", serde_json::json!(6)).unwrap();
        assert_eq!(target.get(), EntityId::INVALID);
        assert!(!entity.has_component("Input1TargetLine"));
    }

    #[test]
    fn test_line_needs_exposed_target() {
        let entity = Entity::new(EntityId(1), "LogicGate");
        assert!(attach_connection_line(&entity, "Input1Target", Vec3::ONE).is_err());
    }

    #[test]
    fn test_line_drawn_while_selected() {
        let mut world = World::new(WorldConfig {
            editor_enabled: true,
            ..WorldConfig::default()
        });
        let other = world.allocate("Starter");
        other
            .try_get_or_insert_default::<Transform>(Transform::KEY)
            .unwrap()
            .position
            .set(Vec3::new(0.0, 0.0, 10.0));
        let other_id = other.id();
        world.add(other);

        let entity = world.allocate("LogicGate");
        entity.try_get_or_insert_default::<Transform>(Transform::KEY).unwrap();
        let target = Property::new(EntityId::INVALID);
        entity.expose("Input1Target", &target);
        make_connectable(&entity, "Input1Target", &target);
        attach_connection_line(&entity, "Input1Target", Vec3::X).unwrap();
        attach_connection_line(&entity, "Input1Target", Vec3::X).unwrap();
        assert_eq!(target.observer_count(), 1);

        let drawer = entity.get::<LineDrawer>("Input1TargetLine").unwrap();
        target.set(other_id);
        drawer.refresh(&world);
        assert!(drawer.lines.get().is_empty());

        selection(&entity).unwrap().selected.set(true);
        drawer.refresh(&world);
        let lines = drawer.lines.get();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(lines[0].color, Vec3::X);
    }
}
