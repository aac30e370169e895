//! Integer counter for scripted logic.

use engine_bind::{ChangeBinding, Command, Property};
use engine_entity::{Component, ComponentBase, World};
use tracing::debug;

/// Counts up or down in steps and fires `on_target` on reaching `target`.
#[derive(Debug)]
pub struct Counter {
    base: ComponentBase,
    pub value: Property<i32>,
    /// Value the counter holds after start and after a reset.
    pub start_value: Property<i32>,
    pub target: Property<i32>,
    pub step_size: Property<i32>,
    pub increment: Command,
    pub decrement: Command,
    pub reset: Command,
    /// Fires when `value` becomes equal to `target`.
    pub on_target: Command,
}

impl Counter {
    pub const KEY: &'static str = "Counter";
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            value: Property::new(0),
            start_value: Property::new(0),
            target: Property::new(10),
            step_size: Property::new(1),
            increment: Command::new(),
            decrement: Command::new(),
            reset: Command::new(),
            on_target: Command::new(),
        }
    }
}

impl Component for Counter {
    fn type_name() -> &'static str {
        "Counter"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let (value, step) = (self.value.clone(), self.step_size.clone());
        self.increment.set_action(move |()| {
            let step = step.get();
            value.update(|v| *v = v.saturating_add(step));
        });

        let (value, step) = (self.value.clone(), self.step_size.clone());
        self.decrement.set_action(move |()| {
            let step = step.get();
            value.update(|v| *v = v.saturating_sub(step));
        });

        let (value, start) = (self.value.clone(), self.start_value.clone());
        self.reset.set_action(move |()| value.set(start.get()));

        let target = self.target.downgrade();
        let on_target = self.on_target.clone();
        let reached = ChangeBinding::new(&self.value, move |_, new| {
            if target.upgrade().is_some_and(|target| target.get() == *new) {
                debug!(value = *new, "counter reached target");
                on_target.execute();
            }
        });
        self.base.add_binding(reached);
    }

    fn start(&self, _world: &World) {
        self.reset.execute();
    }
}
