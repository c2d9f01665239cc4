//! Error types for generator and classifier operations.

use thiserror::Error;

/// Errors that can occur while talking to the reasoning backend.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network-level failure reaching the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The backend responded but the request could not be completed.
    #[error("backend error: {0}")]
    Backend(String),
}
