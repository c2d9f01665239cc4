//! Core traits and types for the dialogue orchestration pipeline.
//!
//! This crate provides the shared interface between the orchestrator, the
//! reasoning backend, and the lookup tools. It defines:
//!
//! - [`Generator`] - The trait a tool-augmented response generator implements
//! - [`Classifier`] - The trait a safety classifier implements
//! - [`LookupTool`] / [`ToolSet`] - External lookup capabilities and their registry
//! - [`IncomingMessage`] / [`Reply`] - Transport-level message types
//! - [`GenerationRequest`] / [`GenerationResult`] - The generator contract
//! - [`CoreError`] - Error types for backend operations
//!
//! # Example
//!
//! ```rust
//! use chat_core::{async_trait, CoreError, GenerationRequest, GenerationResult, Generator};
//!
//! struct EchoGenerator;
//!
//! #[async_trait]
//! impl Generator for EchoGenerator {
//!     async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, CoreError> {
//!         Ok(GenerationResult::text(request.user_message))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "EchoGenerator"
//!     }
//! }
//! ```

mod error;
mod message;
mod request;
mod tools;
mod trait_def;

pub use error::CoreError;
pub use message::{IncomingMessage, Reply};
pub use request::{GenerationRequest, GenerationResult, ToolInvocation};
pub use tools::{LookupTool, ToolSet};
pub use trait_def::{Classifier, Generator};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
