// Error types for telemetry processing

use thiserror::Error;

/// Result type alias for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors that can occur while ingesting readings or querying telemetry
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Backing store failed (connection, query, constraint)
    #[error("Store error: {0}")]
    Store(String),

    /// Input rejected before touching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TelemetryError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        TelemetryError::Store(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        TelemetryError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        TelemetryError::NotFound(msg.into())
    }
}
