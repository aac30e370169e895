//! Components the factories attach.
//!
//! Each component embeds a [`ComponentBase`](engine_entity::ComponentBase)
//! and keeps its state in [`Property`](engine_bind::Property) cells so
//! factories can bind and expose them. Commands are wired in `awake`.

pub mod counter;
pub mod editor;
pub mod explosion;
pub mod fog;
pub mod logic_gate;
pub mod model;
pub mod sound;
pub mod starter;
pub mod ticker;
pub mod water;

pub use counter::Counter;
pub use editor::{EditorLabel, EditorSelection, Line, LineDrawer};
pub use explosion::Explosion;
pub use fog::Fog;
pub use logic_gate::{GateMode, LogicGate};
pub use model::{Model, ModelShape};
pub use sound::{AmbientSound, SoundBank, Speaker};
pub use starter::Starter;
pub use ticker::{RandomTicker, Ticker, Timer};
pub use water::Water;
