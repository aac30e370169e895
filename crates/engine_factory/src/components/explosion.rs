//! Scripted explosions.

use engine_bind::{Command, Property};
use engine_entity::{Component, ComponentBase};
use glam::Vec3;
use tracing::info;

/// A blast that goes off on `go`.
#[derive(Debug)]
pub struct Explosion {
    base: ComponentBase,
    pub position: Property<Vec3>,
    /// Radius of voxel damage.
    pub radius: Property<f32>,
    /// Radius within which physics bodies are pushed.
    pub physics_radius: Property<f32>,
    /// Delete the explosion after it goes off.
    pub delete_after: Property<bool>,
    pub detonations: Property<u32>,
    pub go: Command,
}

impl Explosion {
    pub const KEY: &'static str = "Explosion";
}

impl Default for Explosion {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            position: Property::new(Vec3::ZERO),
            radius: Property::new(8.0),
            physics_radius: Property::new(12.0),
            delete_after: Property::new(true),
            detonations: Property::new(0),
            go: Command::new(),
        }
    }
}

impl Component for Explosion {
    fn type_name() -> &'static str {
        "Explosion"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let (position, radius, physics_radius, delete_after, detonations, delete) = (
            self.position.clone(),
            self.radius.clone(),
            self.physics_radius.clone(),
            self.delete_after.clone(),
            self.detonations.clone(),
            self.base.delete.clone(),
        );
        let enabled = self.base.enabled.downgrade();
        self.go.set_action(move |()| {
            if !enabled.upgrade().is_some_and(|enabled| enabled.get()) {
                return;
            }
            let at = position.get();
            info!(
                radius = radius.get(),
                physics_radius = physics_radius.get(),
                x = at.x,
                y = at.y,
                z = at.z,
                "explosion"
            );
            detonations.update(|n| *n += 1);
            if delete_after.get() {
                delete.execute();
            }
        });
    }
}
