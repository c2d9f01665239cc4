//! The `Generator` and `Classifier` traits.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::request::{GenerationRequest, GenerationResult};

/// A tool-augmented response generator backed by a reasoning model.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a response for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, CoreError>;

    /// Identifier for logging.
    fn name(&self) -> &str;
}

/// A binary safety classifier. `true` means the text is safe.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<bool, CoreError>;
}
