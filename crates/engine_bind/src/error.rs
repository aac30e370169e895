//! Binding-layer error types.

/// Errors raised when a property or command is driven through its
/// type-erased handle.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A JSON value could not be converted into the cell's type.
    #[error("cannot assign JSON to {type_name}: {source}")]
    Decode {
        /// Rust type name of the target cell.
        type_name: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The cell's current value could not be rendered as JSON.
    #[error("cannot render {type_name} as JSON: {source}")]
    Encode {
        /// Rust type name of the source cell.
        type_name: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A typed handle was requested with the wrong argument type.
    #[error("command takes {found}, not {expected}")]
    ArgumentMismatch {
        /// Argument type the caller asked for.
        expected: &'static str,
        /// Argument type the command was created with.
        found: &'static str,
    },
}
