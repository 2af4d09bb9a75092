//! Error types for schema resolution

use thiserror::Error;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Schema resolution errors
///
/// Only conditions that abort a resolution call live here. Degraded results
/// (unresolved references, missing type or title) are reported through
/// [`crate::Diagnostics`] instead.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid schema at {pointer}: {message}")]
    InvalidSchema { pointer: String, message: String },

    #[error("Reference cycle detected: {}", path.join(" -> "))]
    ReferenceCycle { path: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl ResolveError {
    pub(crate) fn invalid_schema(pointer: &str, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            pointer: if pointer.is_empty() { "#".to_string() } else { pointer.to_string() },
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = ResolveError::ReferenceCycle {
            path: vec!["Node".into(), "Edge".into(), "Node".into()],
        };
        assert_eq!(err.to_string(), "Reference cycle detected: Node -> Edge -> Node");
    }

    #[test]
    fn test_invalid_schema_root_pointer() {
        let err = ResolveError::invalid_schema("", "expected an object");
        assert_eq!(err.to_string(), "Invalid schema at #: expected an object");
    }
}
