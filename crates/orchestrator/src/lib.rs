//! Message orchestrator for the safety-gated response pipeline.
//!
//! This crate provides the [`Orchestrator`] type which sequences each inbound
//! message through a strictly linear pipeline:
//!
//! ```text
//! Incoming message
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Acquire per-conversation lock                           │
//! │         ↓                                                   │
//! │  2. Input safety gate (blocked → fixed notice, stop)        │
//! │         ↓                                                   │
//! │  3. Build context from recent history                       │
//! │         ↓                                                   │
//! │  4. Generate response (tool-augmented)                      │
//! │         ↓                                                   │
//! │  5. Output safety gate (unsafe → withholding notice)        │
//! │         ↓                                                   │
//! │  6. Persist the exchange                                    │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! Reply
//! ```
//!
//! Failure policy: gate errors fail closed, a context read failure degrades
//! to an empty-history context, and a persistence failure after generation is
//! logged without losing the response. Only a generation failure surfaces as
//! an error.

pub mod context;
pub mod error;
pub mod locks;
pub mod orchestrator;

pub use context::{render, ContextBuilder, DEFAULT_CONTEXT_TURNS};
pub use error::OrchestratorError;
pub use locks::ConversationLocks;
pub use orchestrator::{Orchestrator, INPUT_BLOCKED_MESSAGE, OUTPUT_WITHHELD_MESSAGE};
