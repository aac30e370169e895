use std::rc::Rc;

use engine_entity::{Component, Entity, PropertyMeta, World};
use glam::Vec3;

use super::{expose_toggles, transform};
use crate::components::{RandomTicker, Ticker, Timer};
use crate::editor::make_scriptlike;
use crate::error::FactoryError;
use crate::factory::Factory;

const TIMER_COLOR: Vec3 = Vec3::new(0.3, 1.0, 0.6);

/// Fixed-interval tickers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickerFactory;

impl Factory for TickerFactory {
    fn kind(&self) -> &'static str {
        "Ticker"
    }

    fn color(&self) -> Vec3 {
        TIMER_COLOR
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        transform(entity)?;
        let ticker = entity.try_get_or_insert_default::<Ticker>(Ticker::KEY)?;
        entity.expose("Interval", &ticker.interval);
        entity.expose("Repeat", &ticker.repeat);
        entity.expose_with("Fired", &ticker.fired, PropertyMeta::readonly());
        entity.expose_command("OnFire", &ticker.on_fire);
        expose_toggles(entity, ticker.base());
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        make_scriptlike(entity, self.color())
    }
}

/// Tickers with random intervals.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTickerFactory;

impl Factory for RandomTickerFactory {
    fn kind(&self) -> &'static str {
        "RandomTicker"
    }

    fn color(&self) -> Vec3 {
        TIMER_COLOR
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        transform(entity)?;
        let ticker = entity.try_get_or_insert_default::<RandomTicker>(RandomTicker::KEY)?;
        entity.expose("MinInterval", &ticker.min_interval);
        entity.expose("MaxInterval", &ticker.max_interval);
        entity.expose_command("OnFire", &ticker.on_fire);
        expose_toggles(entity, ticker.base());
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        make_scriptlike(entity, self.color())
    }
}

/// One-shot timers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerFactory;

impl Factory for TimerFactory {
    fn kind(&self) -> &'static str {
        "Timer"
    }

    fn color(&self) -> Vec3 {
        TIMER_COLOR
    }

    fn bind(&self, entity: &Rc<Entity>, _world: &World, _creating: bool) -> Result<(), FactoryError> {
        transform(entity)?;
        let timer = entity.try_get_or_insert_default::<Timer>(Timer::KEY)?;
        entity.expose("Duration", &timer.duration);
        entity.expose_with("Running", &timer.running, PropertyMeta::readonly());
        entity.expose_command("Start", &timer.start);
        entity.expose_command("Stop", &timer.stop);
        entity.expose_command("OnDone", &timer.on_done);
        entity.mark_bound();
        Ok(())
    }

    fn attach_editor_components(&self, entity: &Rc<Entity>, _world: &World) -> Result<(), FactoryError> {
        make_scriptlike(entity, self.color())
    }
}
