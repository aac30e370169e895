//! Fires once when the level starts.

use std::cell::Cell;

use engine_bind::{Command, Property};
use engine_entity::{Component, ComponentBase, World};
use tracing::debug;

/// Fires `on_start` once, `delay` seconds after the world starts.
#[derive(Debug)]
pub struct Starter {
    base: ComponentBase,
    pub delay: Property<f32>,
    pub on_start: Command,
    elapsed: Cell<f32>,
    fired: Cell<bool>,
}

impl Starter {
    pub const KEY: &'static str = "Starter";

    /// Returns `true` once `on_start` has fired.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }

    fn fire(&self) {
        if !self.fired.replace(true) {
            debug!(delay = self.delay.get(), "starter fired");
            self.on_start.execute();
        }
    }
}

impl Default for Starter {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            delay: Property::new(0.0),
            on_start: Command::new(),
            elapsed: Cell::new(0.0),
            fired: Cell::new(false),
        }
    }
}

impl Component for Starter {
    fn type_name() -> &'static str {
        "Starter"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn start(&self, _world: &World) {
        if self.base.is_running() && self.delay.get() <= 0.0 {
            self.fire();
        }
    }

    fn update(&self, _world: &World, dt: f32) {
        if self.fired.get() {
            return;
        }
        self.elapsed.set(self.elapsed.get() + dt);
        if self.elapsed.get() >= self.delay.get() {
            self.fire();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starter(world: &mut World, delay: f32) -> std::rc::Rc<Starter> {
        let entity = world.allocate("Starter");
        let starter = entity.try_get_or_insert_default::<Starter>(Starter::KEY).unwrap();
        starter.delay.set(delay);
        world.add(entity);
        starter
    }

    #[test]
    fn test_zero_delay_fires_at_start() {
        let mut world = World::default();
        let s = starter(&mut world, 0.0);
        world.start();
        assert!(s.has_fired());
    }

    #[test]
    fn test_delay_fires_once_after_elapsed() {
        let mut world = World::default();
        let s = starter(&mut world, 1.0);
        world.start();
        assert!(!s.has_fired());
        world.update(0.6);
        assert!(!s.has_fired());
        world.update(0.6);
        assert!(s.has_fired());
    }

    #[test]
    fn test_disabled_starter_waits() {
        let mut world = World::default();
        let s = starter(&mut world, 0.0);
        s.base().disable.execute();
        world.start();
        world.update(1.0);
        assert!(!s.has_fired());
    }
}
