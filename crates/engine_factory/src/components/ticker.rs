//! Time-driven triggers: fixed tickers, random tickers and one-shot timers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use engine_bind::{ChangeBinding, Command, Property};
use engine_entity::{Component, ComponentBase, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Upper bound on `Ticker` fires in a single update.
pub const MAX_FIRES_PER_UPDATE: u32 = 64;

/// Fires `on_fire` every `interval` seconds while enabled.
#[derive(Debug)]
pub struct Ticker {
    base: ComponentBase,
    /// Seconds between fires.
    pub interval: Property<f32>,
    /// Number of fires before the ticker disables itself; 0 repeats forever.
    pub repeat: Property<u32>,
    /// Fires since the ticker was last enabled.
    pub fired: Property<u32>,
    pub on_fire: Command,
    elapsed: Rc<Cell<f32>>,
}

impl Ticker {
    pub const KEY: &'static str = "Ticker";
}

impl Default for Ticker {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            interval: Property::new(1.0),
            repeat: Property::new(0),
            fired: Property::new(0),
            on_fire: Command::new(),
            elapsed: Rc::new(Cell::new(0.0)),
        }
    }
}

impl Component for Ticker {
    fn type_name() -> &'static str {
        "Ticker"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        // Re-enabling starts a fresh run.
        let (elapsed, fired) = (Rc::clone(&self.elapsed), self.fired.downgrade());
        let restart = ChangeBinding::new(&self.base.enabled, move |_, enabled| {
            if *enabled {
                elapsed.set(0.0);
                if let Some(fired) = fired.upgrade() {
                    fired.set(0);
                }
            }
        });
        self.base.add_binding(restart);
    }

    fn update(&self, _world: &World, dt: f32) {
        let interval = self.interval.get();
        if interval.is_nan() || interval <= 0.0 {
            return;
        }
        let elapsed = self.elapsed.get() + dt;
        let due = (elapsed / interval).floor();
        if due < 1.0 {
            self.elapsed.set(elapsed);
            return;
        }
        self.elapsed.set(elapsed % interval);
        // Saturating cast caps huge counts.
        let due = (due as u32).min(MAX_FIRES_PER_UPDATE);
        for _ in 0..due {
            self.fired.update(|n| *n += 1);
            self.on_fire.execute();

            let repeat = self.repeat.get();
            if repeat > 0 && self.fired.get() >= repeat {
                debug!(fired = self.fired.get(), "ticker finished");
                self.base.disable.execute();
                break;
            }
            if !self.base.is_running() {
                break;
            }
        }
    }
}

/// Fires `on_fire` after random delays drawn from
/// `[min_interval, max_interval]`.
#[derive(Debug)]
pub struct RandomTicker {
    base: ComponentBase,
    pub min_interval: Property<f32>,
    pub max_interval: Property<f32>,
    pub on_fire: Command,
    rng: RefCell<StdRng>,
    next: Cell<f32>,
    elapsed: Cell<f32>,
}

impl RandomTicker {
    pub const KEY: &'static str = "RandomTicker";

    /// Make the sequence of delays reproducible.
    pub fn reseed(&self, seed: u64) {
        *self.rng.borrow_mut() = StdRng::seed_from_u64(seed);
        self.schedule();
    }

    /// Seconds until the next fire.
    #[must_use]
    pub fn next_interval(&self) -> f32 {
        self.next.get()
    }

    fn schedule(&self) {
        let (a, b) = (self.min_interval.get(), self.max_interval.get());
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let next = self.rng.borrow_mut().gen_range(low..=high);
        self.next.set(next);
        self.elapsed.set(0.0);
    }
}

impl Default for RandomTicker {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            min_interval: Property::new(1.0),
            max_interval: Property::new(5.0),
            on_fire: Command::new(),
            rng: RefCell::new(StdRng::from_entropy()),
            next: Cell::new(0.0),
            elapsed: Cell::new(0.0),
        }
    }
}

impl Component for RandomTicker {
    fn type_name() -> &'static str {
        "RandomTicker"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn start(&self, _world: &World) {
        self.schedule();
    }

    fn update(&self, _world: &World, dt: f32) {
        self.elapsed.set(self.elapsed.get() + dt);
        if self.elapsed.get() >= self.next.get() {
            self.on_fire.execute();
            self.schedule();
        }
    }
}

/// One-shot countdown.
#[derive(Debug)]
pub struct Timer {
    base: ComponentBase,
    /// Seconds from `start` to `on_done`.
    pub duration: Property<f32>,
    pub running: Property<bool>,
    pub start: Command,
    pub stop: Command,
    pub on_done: Command,
    elapsed: Rc<Cell<f32>>,
}

impl Timer {
    pub const KEY: &'static str = "Timer";
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            duration: Property::new(1.0),
            running: Property::new(false),
            start: Command::new(),
            stop: Command::new(),
            on_done: Command::new(),
            elapsed: Rc::new(Cell::new(0.0)),
        }
    }
}

impl Component for Timer {
    fn type_name() -> &'static str {
        "Timer"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let (running, elapsed) = (self.running.clone(), Rc::clone(&self.elapsed));
        self.start.set_action(move |()| {
            elapsed.set(0.0);
            running.set(true);
        });
        let running = self.running.clone();
        self.stop.set_action(move |()| running.set(false));
    }

    fn update(&self, _world: &World, dt: f32) {
        if !self.running.get() {
            return;
        }
        self.elapsed.set(self.elapsed.get() + dt);
        if self.elapsed.get() >= self.duration.get() {
            self.running.set(false);
            self.on_done.execute();
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_bind::ObserverId;
    use engine_entity::{Entity, EntityId};

    use super::*;

    fn attach<T: Component + Default>(key: &str) -> (Rc<Entity>, Rc<T>) {
        let entity = Entity::new(EntityId(1), "Test");
        let component = entity.try_get_or_insert_default::<T>(key).unwrap();
        (entity, component)
    }

    fn count_fires(command: &Command) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        command.add_listener(ObserverId::next(), move |()| counter.set(counter.get() + 1));
        hits
    }

    #[test]
    fn test_ticker_fires_every_interval() {
        let world = World::default();
        let (_e, ticker) = attach::<Ticker>(Ticker::KEY);
        ticker.interval.set(0.5);
        let hits = count_fires(&ticker.on_fire);
        for _ in 0..5 {
            ticker.update(&world, 0.25);
        }
        assert_eq!(hits.get(), 2);
        assert_eq!(ticker.fired.get(), 2);
    }

    #[test]
    fn test_ticker_repeat_disables_and_reenable_restarts() {
        let world = World::default();
        let (_e, ticker) = attach::<Ticker>(Ticker::KEY);
        ticker.interval.set(1.0);
        ticker.repeat.set(2);
        let hits = count_fires(&ticker.on_fire);
        ticker.update(&world, 5.0);
        assert_eq!(hits.get(), 2);
        assert!(!ticker.base().enabled.get());

        ticker.base().enable.execute();
        assert_eq!(ticker.fired.get(), 0);
    }

    #[test]
    fn test_ticker_tiny_interval_is_bounded() {
        let world = World::default();
        let (_e, ticker) = attach::<Ticker>(Ticker::KEY);
        ticker.interval.set(1e-10);
        let hits = count_fires(&ticker.on_fire);
        ticker.update(&world, 1.0 / 60.0);
        assert_eq!(hits.get(), MAX_FIRES_PER_UPDATE);
        ticker.update(&world, 1.0e6);
        assert_eq!(hits.get(), 2 * MAX_FIRES_PER_UPDATE);
        assert!(ticker.elapsed.get() < 1e-10);
    }

    #[test]
    fn test_random_ticker_stays_within_bounds() {
        let world = World::default();
        let (_e, ticker) = attach::<RandomTicker>(RandomTicker::KEY);
        ticker.min_interval.set(2.0);
        ticker.max_interval.set(3.0);
        ticker.reseed(7);
        for _ in 0..20 {
            let next = ticker.next_interval();
            assert!((2.0..=3.0).contains(&next));
            let hits = count_fires(&ticker.on_fire);
            ticker.update(&world, next);
            assert_eq!(hits.get(), 1);
        }
    }

    #[test]
    fn test_random_ticker_seed_is_reproducible() {
        let (_a, first) = attach::<RandomTicker>(RandomTicker::KEY);
        let (_b, second) = attach::<RandomTicker>(RandomTicker::KEY);
        first.reseed(42);
        second.reseed(42);
        assert_eq!(first.next_interval(), second.next_interval());
    }

    #[test]
    fn test_timer_fires_once() {
        let world = World::default();
        let (_e, timer) = attach::<Timer>(Timer::KEY);
        timer.duration.set(1.0);
        let hits = count_fires(&timer.on_done);

        timer.update(&world, 2.0);
        assert_eq!(hits.get(), 0);

        timer.start.execute();
        assert!(timer.running.get());
        timer.update(&world, 0.6);
        timer.update(&world, 0.6);
        timer.update(&world, 0.6);
        assert_eq!(hits.get(), 1);
        assert!(!timer.running.get());
    }
}
