//! Error types for the Taller console core.

use thiserror::Error;

use crate::work_order::TransitionError;

/// A shared error type for the whole Taller console.
///
/// Every gateway, service and adapter returns this type so callers can
/// decide how to surface a failure (inline message, toast, silent log)
/// without inspecting transport-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TallerError {
    /// Bad credentials or an expired/invalid session.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A stage transition was rejected locally before reaching the server.
    #[error("Validation failed: {0}")]
    Validation(#[from] TransitionError),

    /// Transport failure (connect, timeout, body read).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Push channel error (failed open, malformed frame)
    #[error("Push channel error: {0}")]
    Push(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TallerError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a Server error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Push error
    pub fn push(message: impl Into<String>) -> Self {
        Self::Push(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this is a local validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the failure happened on the wire or on the server.
    ///
    /// These are the failures reported to the operator as a transient notice;
    /// local state is left untouched by them.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TallerError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for TallerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TallerError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TallerError>`.
pub type Result<T> = std::result::Result<T, TallerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_order::Stage;

    #[test]
    fn test_transition_error_converts_into_validation() {
        let err: TallerError = TransitionError::TechnicianRequired {
            stage: Stage::Salida,
        }
        .into();

        assert!(err.is_validation());
        assert!(!err.is_remote());
        assert!(err.to_string().contains("technician required"));
    }

    #[test]
    fn test_remote_errors() {
        assert!(TallerError::network("connection refused").is_remote());
        assert!(TallerError::server(500, "boom").is_remote());
        assert!(!TallerError::authentication("bad password").is_remote());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: TallerError = parse.unwrap_err().into();
        match err {
            TallerError::Serialization { format, .. } => assert_eq!(format, "JSON"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
