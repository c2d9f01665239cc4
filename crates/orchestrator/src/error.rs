//! Error types for orchestrator operations.

use chat_core::CoreError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The generation backend failed.
    #[error("generation error: {0}")]
    Generation(#[from] CoreError),

    /// A database operation failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}
