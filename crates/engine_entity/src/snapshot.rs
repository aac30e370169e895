//! Saved form of an entity.
//!
//! A snapshot holds the JSON value of every exposed property marked for
//! saving, in exposure order. Snapshots travel as MessagePack.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::EntityError;

/// Exposed property values of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Id the entity had when captured.
    pub id: EntityId,
    /// Factory kind, used to rebuild the entity.
    pub kind: String,
    /// `(exposed name, value)` pairs.
    pub properties: Vec<(String, serde_json::Value)>,
}

impl EntitySnapshot {
    /// A snapshot with no properties.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: EntityId::INVALID,
            kind: kind.into(),
            properties: Vec::new(),
        }
    }

    /// Add or overwrite a property value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        let name = name.into();
        match self.properties.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
        self
    }

    /// The saved value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Encode as MessagePack.
    pub fn encode(&self) -> Result<Vec<u8>, EntityError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Decode from MessagePack.
    pub fn decode(bytes: &[u8]) -> Result<Self, EntityError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
