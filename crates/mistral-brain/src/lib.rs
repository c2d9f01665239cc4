//! Mistral-backed implementations of the generation and classification traits.
//!
//! - [`MistralGenerator`] - tool-augmented response generation via the
//!   Mistral chat completions API
//! - [`SafetyClassifier`] - chain-of-thought safety verdicts for inbound
//!   messages and generated responses
//! - [`MistralConfig`] - environment/builder configuration shared by both

pub mod api_types;
pub mod classifier;
pub mod client;
pub mod config;
pub mod generator;

pub use classifier::{GateStage, SafetyClassifier};
pub use client::MistralClient;
pub use config::MistralConfig;
pub use generator::MistralGenerator;
