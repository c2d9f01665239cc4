//! Transport-level message types.
//!
//! The transport layer (webhook bridge, HTTP API) normalizes whatever the
//! messaging channel delivers into an [`IncomingMessage`] and receives a
//! [`Reply`] back. Everything in between is owned by the orchestrator.

use serde::{Deserialize, Serialize};

/// A normalized inbound message from the messaging channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Raw message text.
    pub message: String,
    /// Stable identifier for the sending user.
    pub user_id: String,
    /// Display name of the sending user.
    pub user_name: String,
    /// Whether the message originated in a group conversation.
    #[serde(default)]
    pub is_group: bool,
    /// Whether the bot was mentioned (group conversations only).
    #[serde(default)]
    pub is_mentioned: bool,
}

impl IncomingMessage {
    /// Create a direct (private) message.
    pub fn direct(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            is_group: false,
            is_mentioned: false,
        }
    }

    /// Create a group message.
    pub fn group(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        message: impl Into<String>,
        is_mentioned: bool,
    ) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            is_group: true,
            is_mentioned,
        }
    }
}

/// The reply returned to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    /// Response text (may be a safety-block notice).
    pub response: String,
    /// ISO-8601 timestamp of when the reply was produced.
    pub timestamp: String,
}
