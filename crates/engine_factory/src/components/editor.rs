//! Editor-only decoration: labels, selection state and connection lines.

use engine_bind::Property;
use engine_entity::{Component, ComponentBase, EntityId, World};
use engine_math::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Whether the editor has the entity selected.
#[derive(Debug, Default)]
pub struct EditorSelection {
    base: ComponentBase,
    pub selected: Property<bool>,
}

impl EditorSelection {
    pub const KEY: &'static str = "EditorSelected";
}

impl Component for EditorSelection {
    fn type_name() -> &'static str {
        "EditorSelection"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }
}

/// Floating text above an entity.
#[derive(Debug)]
pub struct EditorLabel {
    base: ComponentBase,
    pub text: Property<String>,
    pub offset: Property<Vec3>,
}

impl EditorLabel {
    pub const KEY: &'static str = "EditorLabel";
}

impl Default for EditorLabel {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            text: Property::new(String::new()),
            offset: Property::new(Vec3::new(0.0, 1.5, 0.0)),
        }
    }
}

impl Component for EditorLabel {
    fn type_name() -> &'static str {
        "EditorLabel"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }
}

/// One line segment to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Vec3,
}

/// Draws a line from its entity to a target entity while visible.
///
/// `lines` is resolved against the world every tick, since the target can
/// move or disappear at any time.
#[derive(Debug)]
pub struct LineDrawer {
    base: ComponentBase,
    pub target: Property<EntityId>,
    pub visible: Property<bool>,
    pub color: Property<Vec3>,
    pub lines: Property<Vec<Line>>,
}

impl Default for LineDrawer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            target: Property::new(EntityId::INVALID),
            visible: Property::new(false),
            color: Property::new(Vec3::ONE),
            lines: Property::new(Vec::new()),
        }
    }
}

impl LineDrawer {
    /// Recompute `lines` from the current positions of both ends.
    pub fn refresh(&self, world: &World) {
        let lines = self.resolve(world).unwrap_or_default();
        if self.lines.with(|current| *current != lines) {
            self.lines.set(lines);
        }
    }

    fn resolve(&self, world: &World) -> Option<Vec<Line>> {
        if !self.visible.get() {
            return None;
        }
        let from = self.base.entity()?.get::<Transform>(Transform::KEY)?.position.get();
        let target = world.get(self.target.get())?;
        let to = target.get::<Transform>(Transform::KEY)?.position.get();
        Some(vec![Line {
            from,
            to,
            color: self.color.get(),
        }])
    }
}

impl Component for LineDrawer {
    fn type_name() -> &'static str {
        "LineDrawer"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn update(&self, world: &World, _dt: f32) {
        self.refresh(world);
    }
}
