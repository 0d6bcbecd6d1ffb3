//! Error types for the quorum agent system.

use thiserror::Error;

/// Result alias used across the crate.
pub type QuorumResult<T> = Result<T, QuorumError>;

/// Errors produced by the agents, the memory store and the session journal.
#[derive(Debug, Error)]
pub enum QuorumError {
    /// A caller violated an argument contract.
    #[error("validation failed for {field}: expected {expected}, got {actual}")]
    Validation {
        /// Name of the offending argument or field
        field: String,
        /// What the contract requires
        expected: String,
        /// What was actually supplied
        actual: String,
    },

    /// Serializing or deserializing a payload failed.
    #[error("serialization failed during {operation}")]
    Serialization {
        /// The operation that was being performed
        operation: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the session journal failed.
    #[error("journal {operation} failed")]
    Journal {
        /// The journal operation that was being performed
        operation: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl QuorumError {
    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(operation: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            operation: operation.into(),
            source,
        }
    }

    /// Create a journal I/O error
    pub fn journal(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Journal {
            operation: operation.into(),
            source,
        }
    }
}
