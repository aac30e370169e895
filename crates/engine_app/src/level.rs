//! Level files.
//!
//! A level is JSON:
//!
//! ```json
//! {
//!   "world": { "editor_enabled": false },
//!   "tick": { "tick_rate": 60.0, "max_ticks": 600, "viewer": [0.0, 2.0, 0.0] },
//!   "entities": [
//!     { "kind": "Starter", "id": "intro", "properties": { "Delay": 2.0 } },
//!     { "kind": "AmbientSound", "properties": { "PlayEvent": "Play_Wind" } }
//!   ],
//!   "links": [
//!     { "source": "intro", "command": "OnStart", "target": "wind", "target_command": "Play" }
//!   ]
//! }
//! ```
//!
//! Entities are spawned in file order, so in a fresh world the n-th entity
//! gets id n. Properties that hold entity ids can rely on that.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use engine_entity::{Entity, World, WorldConfig};
use engine_factory::FactoryRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tick::TickConfig;

/// One entity to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub kind: String,
    /// Script name, stored in the entity's `ID` property.
    #[serde(default)]
    pub id: Option<String>,
    /// Exposed property values by name.
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Runs `target_command` on the entity named `target` whenever `command`
/// runs on the entity named `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub command: String,
    pub target: String,
    pub target_command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Level {
    pub world: WorldConfig,
    pub tick: TickConfig,
    pub entities: Vec<EntityEntry>,
    pub links: Vec<Link>,
}

impl Level {
    /// Read a level file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading level {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing level {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Spawn every entity into `world`, then wire the links.
    pub fn spawn(&self, registry: &FactoryRegistry, world: &mut World) -> Result<Vec<Rc<Entity>>> {
        let mut spawned = Vec::with_capacity(self.entities.len());
        for entry in &self.entities {
            let entity = registry
                .spawn(&entry.kind, world)
                .with_context(|| format!("spawning {}", entry.kind))?;
            if let Some(id) = &entry.id {
                entity.name().set(id.clone());
            }
            for (name, value) in &entry.properties {
                entity
                    .set_property_json(name, value.clone())
                    .with_context(|| format!("setting {name} on {}", entity.id()))?;
            }
            debug!(entity = %entity.id(), kind = %entry.kind, "level entity spawned");
            spawned.push(entity);
        }

        for link in &self.links {
            let source = world
                .find(&link.source)
                .with_context(|| format!("no entity named {}", link.source))?;
            let target = world
                .find(&link.target)
                .with_context(|| format!("no entity named {}", link.target))?;
            world.link_command(source.id(), &link.command, target.id(), &link.target_command)?;
        }
        Ok(spawned)
    }
}
