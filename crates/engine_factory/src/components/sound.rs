//! Sound emitters, banks and speakers.
//!
//! Audio middleware is out of reach here: posting an event means logging it
//! and recording it as the last posted event.

use std::cell::Cell;
use std::rc::Rc;

use engine_bind::{AnyProperty, Command, NotifyBinding, Property};
use engine_entity::{Component, ComponentBase, World};
use glam::Vec3;
use tracing::{debug, info, warn};

fn post_event(event: &str, position: Vec3) {
    debug!(event, x = position.x, y = position.y, z = position.z, "posting sound event");
}

/// A looping ambient sound that plays while enabled.
#[derive(Debug)]
pub struct AmbientSound {
    base: ComponentBase,
    pub play_event: Property<String>,
    pub stop_event: Property<String>,
    pub is_3d: Property<bool>,
    pub playing: Property<bool>,
    pub position: Property<Vec3>,
    pub last_event: Property<String>,
    pub play: Command,
    pub stop: Command,
}

impl AmbientSound {
    pub const KEY: &'static str = "AmbientSound";
}

impl Default for AmbientSound {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            play_event: Property::new(String::new()),
            stop_event: Property::new(String::new()),
            is_3d: Property::new(true),
            playing: Property::new(false),
            position: Property::new(Vec3::ZERO),
            last_event: Property::new(String::new()),
            play: Command::new(),
            stop: Command::new(),
        }
    }
}

impl Component for AmbientSound {
    fn type_name() -> &'static str {
        "AmbientSound"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let (event, is_3d, position, playing, last) = (
            self.play_event.clone(),
            self.is_3d.clone(),
            self.position.clone(),
            self.playing.clone(),
            self.last_event.clone(),
        );
        self.play.set_action(move |()| {
            let name = event.get();
            if name.is_empty() {
                warn!("ambient sound has no play event");
            } else {
                let at = if is_3d.get() { position.get() } else { Vec3::ZERO };
                post_event(&name, at);
                last.set(name);
            }
            playing.set(true);
        });

        let (event, position, playing, last) = (
            self.stop_event.clone(),
            self.position.clone(),
            self.playing.clone(),
            self.last_event.clone(),
        );
        self.stop.set_action(move |()| {
            let name = event.get();
            if !name.is_empty() {
                post_event(&name, position.get());
                last.set(name);
            }
            playing.set(false);
        });

        // Playback follows "enabled and not suspended".
        let enabled = self.base.enabled.downgrade();
        let suspended = self.base.suspended.downgrade();
        let playing = self.playing.downgrade();
        let (play, stop) = (self.play.downgrade(), self.stop.downgrade());
        let follow = NotifyBinding::new(
            move || {
                let (Some(enabled), Some(suspended), Some(playing), Some(play), Some(stop)) = (
                    enabled.upgrade(),
                    suspended.upgrade(),
                    playing.upgrade(),
                    play.upgrade(),
                    stop.upgrade(),
                ) else {
                    return;
                };
                let want = enabled.get() && !suspended.get();
                if want && !playing.get() {
                    play.execute();
                } else if !want && playing.get() {
                    stop.execute();
                }
            },
            &[&self.base.enabled as &dyn AnyProperty, &self.base.suspended],
        );
        self.base.add_binding(follow);
    }

    fn start(&self, _world: &World) {
        if self.base.is_running() && !self.playing.get() {
            self.play.execute();
        }
    }

    fn on_delete(&self) {
        if self.playing.get() {
            self.stop.execute();
        }
    }
}

/// A sound bank file that must be loaded before its events can play.
#[derive(Debug)]
pub struct SoundBank {
    base: ComponentBase,
    /// Bank path, relative to the sound bank directory.
    pub bank: Property<String>,
    pub loaded: Property<bool>,
    pub load: Command,
    pub unload: Command,
}

impl SoundBank {
    pub const KEY: &'static str = "SoundBank";
}

impl Default for SoundBank {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            bank: Property::new(String::new()),
            loaded: Property::new(false),
            load: Command::new(),
            unload: Command::new(),
        }
    }
}

impl Component for SoundBank {
    fn type_name() -> &'static str {
        "SoundBank"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let (bank, loaded) = (self.bank.clone(), self.loaded.clone());
        self.load.set_action(move |()| {
            let path = bank.get();
            if path.is_empty() {
                warn!("sound bank has no bank path");
                return;
            }
            info!(bank = %path, "loading sound bank");
            loaded.set(true);
        });

        let (bank, loaded) = (self.bank.clone(), self.loaded.clone());
        self.unload.set_action(move |()| {
            if loaded.get() {
                info!(bank = %bank.get(), "unloading sound bank");
                loaded.set(false);
            }
        });

        // A new path while loaded swaps banks.
        let loaded = self.loaded.downgrade();
        let (load, unload) = (self.load.downgrade(), self.unload.downgrade());
        let reload = NotifyBinding::new(
            move || {
                if !loaded.upgrade().is_some_and(|loaded| loaded.get()) {
                    return;
                }
                if let (Some(load), Some(unload)) = (load.upgrade(), unload.upgrade()) {
                    unload.execute();
                    load.execute();
                }
            },
            &[&self.bank as &dyn AnyProperty],
        );
        self.base.add_binding(reload);
    }

    fn start(&self, _world: &World) {
        if self.base.enabled.get() && !self.bank.with(String::is_empty) {
            self.load.execute();
        }
    }

    fn on_delete(&self) {
        self.unload.execute();
    }
}

/// Seconds of speech per character of a line, for the speaking estimate.
const SECONDS_PER_CHARACTER: f32 = 0.06;

/// Voice output for characters.
#[derive(Debug)]
pub struct Speaker {
    base: ComponentBase,
    pub position: Property<Vec3>,
    pub speaking: Property<bool>,
    pub last_line: Property<String>,
    pub speak: Command<String>,
    remaining: Rc<Cell<f32>>,
}

impl Speaker {
    pub const KEY: &'static str = "Speaker";
}

impl Default for Speaker {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            position: Property::new(Vec3::ZERO),
            speaking: Property::new(false),
            last_line: Property::new(String::new()),
            speak: Command::new(),
            remaining: Rc::new(Cell::new(0.0)),
        }
    }
}

impl Component for Speaker {
    fn type_name() -> &'static str {
        "Speaker"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn awake(&self) {
        let (position, speaking, last, remaining) = (
            self.position.clone(),
            self.speaking.clone(),
            self.last_line.clone(),
            Rc::clone(&self.remaining),
        );
        self.speak.set_action(move |line: String| {
            if line.is_empty() {
                return;
            }
            post_event("Play_Voice", position.get());
            remaining.set((line.chars().count() as f32 * SECONDS_PER_CHARACTER).max(1.0));
            last.set(line);
            speaking.set(true);
        });
    }

    fn update(&self, _world: &World, dt: f32) {
        if !self.speaking.get() {
            return;
        }
        let left = self.remaining.get() - dt;
        self.remaining.set(left.max(0.0));
        if left <= 0.0 {
            self.speaking.set(false);
        }
    }
}
