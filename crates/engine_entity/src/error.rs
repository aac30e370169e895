//! Entity-layer error types.

use engine_bind::BindError;

use crate::entity::EntityId;

/// Errors raised while wiring or addressing entities.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// A required component is not attached.
    #[error("component '{key}' not found on {entity}")]
    ComponentNotFound {
        /// Entity that was searched.
        entity: EntityId,
        /// Component key (or type name for typed lookups).
        key: String,
    },

    /// A component exists under the key but has a different type.
    #[error("component '{key}' on {entity} is a {found}, expected {expected}")]
    ComponentTypeMismatch {
        /// Entity that was searched.
        entity: EntityId,
        /// Component key.
        key: String,
        /// Type name that was requested.
        expected: &'static str,
        /// Type name that is stored.
        found: &'static str,
    },

    /// No property is exposed under the name, or it has another type.
    #[error("property '{name}' not found on {entity}")]
    PropertyNotFound {
        /// Entity that was searched.
        entity: EntityId,
        /// Exposed name.
        name: String,
    },

    /// No command is exposed under the name.
    #[error("command '{name}' not found on {entity}")]
    CommandNotFound {
        /// Entity that was searched.
        entity: EntityId,
        /// Exposed name.
        name: String,
    },

    /// The property is exposed read-only and cannot be written by name.
    #[error("property '{name}' on {entity} is read-only")]
    ReadOnly {
        /// Entity that was addressed.
        entity: EntityId,
        /// Exposed name.
        name: String,
    },

    /// The world has no live entity with this id.
    #[error("{0} not found")]
    EntityNotFound(EntityId),

    /// A property or command rejected a JSON value.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Failed to encode a snapshot to MessagePack.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a snapshot from MessagePack.
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
