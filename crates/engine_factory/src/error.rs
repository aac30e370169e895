//! Factory error types.

use engine_bind::BindError;
use engine_entity::EntityError;

/// Errors raised while building entities.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// No factory is registered for the kind.
    #[error("no factory registered for kind '{0}'")]
    UnknownKind(String),

    /// A component could not be created or found, or a name lookup failed.
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// A property or command rejected a value.
    #[error(transparent)]
    Bind(#[from] BindError),
}
