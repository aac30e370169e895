//! Two-input boolean gate for scripted logic.

use engine_bind::{AnyProperty, ChangeBinding, Command, Property, PropertyBinding};
use engine_entity::{Component, ComponentBase, EntityId, World};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Boolean function a [`LogicGate`] applies to its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateMode {
    #[default]
    And,
    Nand,
    Or,
    Nor,
    ExclusiveOr,
    ExclusiveNor,
}

impl GateMode {
    #[must_use]
    pub fn evaluate(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Nand => !(a && b),
            Self::Or => a || b,
            Self::Nor => !(a || b),
            Self::ExclusiveOr => a != b,
            Self::ExclusiveNor => a == b,
        }
    }
}

/// Combines two boolean inputs into `output`.
///
/// Inputs can be driven by commands, written directly, or bound at start to
/// a boolean property exposed by another entity.
#[derive(Debug)]
pub struct LogicGate {
    base: ComponentBase,
    pub mode: Property<GateMode>,
    pub input1: Property<bool>,
    pub input2: Property<bool>,
    pub output: Property<bool>,
    pub input1_target: Property<EntityId>,
    pub input1_target_property: Property<String>,
    pub input2_target: Property<EntityId>,
    pub input2_target_property: Property<String>,
    pub input1_on: Command,
    pub input1_off: Command,
    pub input2_on: Command,
    pub input2_off: Command,
    /// Fires when `output` turns true.
    pub output_on: Command,
    /// Fires when `output` turns false.
    pub output_off: Command,
}

impl LogicGate {
    pub const KEY: &'static str = "LogicGate";

    fn bind_input(&self, world: &World, input: &Property<bool>, target: EntityId, property: &str) {
        if !target.is_valid() || property.is_empty() {
            return;
        }
        let Some(entity) = world.get(target) else {
            warn!(%target, "logic gate input target does not exist");
            return;
        };
        match entity.property::<bool>(property) {
            Ok(source) => {
                debug!(%target, property, "logic gate input bound");
                self.base.add_binding(PropertyBinding::new(input, &source));
            }
            Err(err) => warn!(%err, "logic gate input target has no such boolean property"),
        }
    }
}

impl Default for LogicGate {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            mode: Property::new(GateMode::And),
            input1: Property::new(false),
            input2: Property::new(false),
            output: Property::new(false),
            input1_target: Property::new(EntityId::INVALID),
            input1_target_property: Property::new(String::new()),
            input2_target: Property::new(EntityId::INVALID),
            input2_target_property: Property::new(String::new()),
            input1_on: Command::new(),
            input1_off: Command::new(),
            input2_on: Command::new(),
            input2_off: Command::new(),
            output_on: Command::new(),
            output_off: Command::new(),
        }
    }
}

fn setter(property: &Property<bool>, value: bool) -> impl Fn(()) + 'static {
    let property = property.clone();
    move |()| property.set(value)
}

impl Component for LogicGate {
    fn type_name() -> &'static str {
        "LogicGate"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        self.input1_on.set_action(setter(&self.input1, true));
        self.input1_off.set_action(setter(&self.input1, false));
        self.input2_on.set_action(setter(&self.input2, true));
        self.input2_off.set_action(setter(&self.input2, false));

        let (mode, a, b) = (self.mode.downgrade(), self.input1.downgrade(), self.input2.downgrade());
        let sources: [&dyn AnyProperty; 3] = [&self.mode, &self.input1, &self.input2];
        let compute = PropertyBinding::computed(
            &self.output,
            move || match (mode.upgrade(), a.upgrade(), b.upgrade()) {
                (Some(mode), Some(a), Some(b)) => mode.get().evaluate(a.get(), b.get()),
                _ => false,
            },
            &sources,
        );
        self.base.add_binding(compute);

        let (on, off) = (self.output_on.clone(), self.output_off.clone());
        let transitions = ChangeBinding::new(&self.output, move |_, output| {
            if *output {
                on.execute();
            } else {
                off.execute();
            }
        });
        self.base.add_binding(transitions);
    }

    fn start(&self, world: &World) {
        self.bind_input(
            world,
            &self.input1,
            self.input1_target.get(),
            &self.input1_target_property.get(),
        );
        self.bind_input(
            world,
            &self.input2,
            self.input2_target.get(),
            &self.input2_target_property.get(),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use engine_bind::ObserverId;
    use engine_entity::Entity;

    use super::*;

    fn gate() -> (Rc<Entity>, Rc<LogicGate>) {
        let entity = Entity::new(EntityId(1), "LogicGate");
        let gate = entity.try_get_or_insert_default::<LogicGate>(LogicGate::KEY).unwrap();
        (entity, gate)
    }

    #[test]
    fn test_truth_tables() {
        let cases = [
            (GateMode::And, [false, false, false, true]),
            (GateMode::Nand, [true, true, true, false]),
            (GateMode::Or, [false, true, true, true]),
            (GateMode::Nor, [true, false, false, false]),
            (GateMode::ExclusiveOr, [false, true, true, false]),
            (GateMode::ExclusiveNor, [true, false, false, true]),
        ];
        for (mode, expected) in cases {
            let got = [
                mode.evaluate(false, false),
                mode.evaluate(false, true),
                mode.evaluate(true, false),
                mode.evaluate(true, true),
            ];
            assert_eq!(got, expected, "{mode:?}");
        }
    }

    #[test]
    fn test_output_follows_inputs_and_mode() {
        let (_e, g) = gate();
        g.input1_on.execute();
        assert!(!g.output.get());
        g.input2_on.execute();
        assert!(g.output.get());
        g.mode.set(GateMode::Nand);
        assert!(!g.output.get());
        g.input1_off.execute();
        assert!(g.output.get());
    }

    #[test]
    fn test_output_commands_follow_transitions() {
        let (_e, g) = gate();
        let ons = Rc::new(Cell::new(0));
        let offs = Rc::new(Cell::new(0));
        let (on, off) = (Rc::clone(&ons), Rc::clone(&offs));
        g.output_on.add_listener(ObserverId::next(), move |()| on.set(on.get() + 1));
        g.output_off.add_listener(ObserverId::next(), move |()| off.set(off.get() + 1));

        g.mode.set(GateMode::Or);
        g.input1_on.execute();
        g.input2_on.execute();
        g.input1_off.execute();
        assert_eq!(ons.get(), 1);
        assert_eq!(offs.get(), 0);
        g.input2_off.execute();
        assert_eq!(offs.get(), 1);
    }

    #[test]
    fn test_inputs_bind_to_target_properties_at_start() {
        let mut world = World::default();
        let switch = world.allocate("Switch");
        let pressed = Property::new(false);
        switch.expose("Pressed", &pressed);
        let switch_id = switch.id();
        world.add(switch);

        let entity = world.allocate("LogicGate");
        let g = entity.try_get_or_insert_default::<LogicGate>(LogicGate::KEY).unwrap();
        g.mode.set(GateMode::Or);
        g.input1_target.set(switch_id);
        g.input1_target_property.set(String::from("Pressed"));
        g.input2_target.set(EntityId(999));
        g.input2_target_property.set(String::from("Pressed"));
        world.add(entity);
        world.start();

        assert!(!g.output.get());
        pressed.set(true);
        assert!(g.input1.get());
        assert!(g.output.get());
    }
}
