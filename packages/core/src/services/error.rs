//! Service Error Types
//!
//! Errors surfaced by the orchestration layer. Only destructive operations
//! report persistence failures; additive writes degrade silently and are
//! logged instead.

use thiserror::Error;

/// Errors returned by `TrainingService` operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The node is protected and cannot be deleted
    #[error("Cannot delete protected node: {id}")]
    ProtectedNode { id: String },

    /// No workout log with this id exists
    #[error("Workout log not found: {id}")]
    LogNotFound { id: String },

    /// A destructive change could not be persisted
    #[error("Failed to persist {operation}: {source}")]
    PersistenceFailed {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ServiceError {
    /// Create a protected node error
    pub fn protected_node(id: impl Into<String>) -> Self {
        Self::ProtectedNode { id: id.into() }
    }

    /// Create a log not found error
    pub fn log_not_found(id: impl Into<String>) -> Self {
        Self::LogNotFound { id: id.into() }
    }

    /// Create a persistence failed error with operation context
    pub fn persistence_failed(operation: impl Into<String>, source: anyhow::Error) -> Self {
        Self::PersistenceFailed {
            operation: operation.into(),
            source,
        }
    }
}
