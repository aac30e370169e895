//! Fixed-timestep tick loop.
//!
//! Each tick:
//!
//! 1. Suspend entities farther than the suspend distance from the viewer.
//! 2. Update the world (start new components, update running ones, purge
//!    deleted entities).
//! 3. Advance the tick counter.

use std::time::{Duration, Instant};

use anyhow::{Result, ensure};
use engine_entity::World;
use engine_factory::suspension::apply_distance_suspension;
use engine_math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Point distance suspension is measured from.
    pub viewer: Vec3,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            viewer: Vec3::ZERO,
        }
    }
}

/// Drives a [`World`] at a fixed rate.
#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    world: World,
}

impl TickLoop {
    /// Fails unless `tick_rate` is a finite, positive number.
    pub fn new(config: TickConfig, world: World) -> Result<Self> {
        ensure!(
            config.tick_rate.is_finite() && config.tick_rate > 0.0,
            "tick rate must be a positive number of ticks per second, got {}",
            config.tick_rate
        );
        Ok(Self {
            tick_id: 0,
            config,
            world,
        })
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Run one tick of `dt` seconds. Starts the world on the first tick.
    pub fn tick(&mut self, dt: f32) {
        if !self.world.is_started() {
            self.world.start();
        }
        self.tick_id += 1;

        let radius = self.world.config().suspend_distance;
        let suspended = apply_distance_suspension(&self.world, self.config.viewer, radius);
        self.world.update(dt);

        debug!(
            tick_id = self.tick_id,
            dt,
            suspended,
            entities = self.world.entity_count(),
            "tick"
        );
    }

    /// Run the tick loop for the configured number of ticks, or indefinitely.
    pub fn run(&mut self) {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f32());

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use engine_entity::Entity;
    use engine_factory::FactoryRegistry;
    use engine_math::Transform;

    use super::*;

    #[test]
    fn test_tick_advances_counter_and_starts_world() {
        let mut tick_loop = TickLoop::new(TickConfig::default(), World::default()).unwrap();
        assert_eq!(tick_loop.tick_id(), 0);
        tick_loop.tick(1.0 / 60.0);
        assert_eq!(tick_loop.tick_id(), 1);
        assert!(tick_loop.world().is_started());
    }

    #[test]
    fn test_run_limited_ticks() {
        let config = TickConfig {
            tick_rate: 1000.0,
            max_ticks: 5,
            ..TickConfig::default()
        };
        let mut tick_loop = TickLoop::new(config, World::default()).unwrap();
        tick_loop.run();
        assert_eq!(tick_loop.tick_id(), 5);
    }

    #[test]
    fn test_rejects_unusable_tick_rates() {
        for tick_rate in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let config = TickConfig {
                tick_rate,
                max_ticks: 1,
                ..TickConfig::default()
            };
            assert!(TickLoop::new(config, World::default()).is_err(), "{tick_rate}");
        }
    }

    fn far_ticker_and_fog(viewer: Vec3) -> (TickLoop, Rc<Entity>, Rc<Entity>) {
        let registry = FactoryRegistry::with_defaults();
        let mut world = World::default();
        let far = registry.spawn("Ticker", &mut world).unwrap();
        far.require::<Transform>(Transform::KEY)
            .unwrap()
            .position
            .set(Vec3::new(1000.0, 0.0, 0.0));
        let fog = registry.spawn("Fog", &mut world).unwrap();
        fog.require::<Transform>(Transform::KEY)
            .unwrap()
            .position
            .set(Vec3::new(1000.0, 0.0, 0.0));
        let config = TickConfig {
            viewer,
            ..TickConfig::default()
        };
        (TickLoop::new(config, world).unwrap(), far, fog)
    }

    #[test]
    fn test_far_entities_are_suspended_each_tick() {
        let (mut tick_loop, far, fog) = far_ticker_and_fog(Vec3::ZERO);
        tick_loop.tick(0.1);
        assert!(far.is_suspended());
        assert!(!fog.is_suspended());
    }

    #[test]
    fn test_suspension_follows_configured_viewer() {
        let (mut tick_loop, far, _) = far_ticker_and_fog(Vec3::new(990.0, 0.0, 0.0));
        tick_loop.tick(0.1);
        assert!(!far.is_suspended());
    }
}
