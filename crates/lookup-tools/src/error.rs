//! Internal error type for lookup requests.
//!
//! These errors never cross the [`chat_core::LookupTool`] boundary; each tool
//! converts them into degraded text before returning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed (connect, timeout, non-2xx status).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
