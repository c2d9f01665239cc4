//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Suffix appended to a user's id to form their group conversation id.
pub const GROUP_SUFFIX: &str = "_group";

/// Derive the conversation id for a user.
///
/// A user's private thread and group thread are separate conversations with
/// separate histories.
pub fn conversation_id(user_id: &str, is_group: bool) -> String {
    if is_group {
        format!("{}{}", user_id, GROUP_SUFFIX)
    } else {
        user_id.to_string()
    }
}

/// A single user/bot exchange. Append-only; rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exchange {
    /// Autoincrement row id; provides ordering within a conversation.
    pub id: i64,
    /// Conversation this exchange belongs to.
    pub conversation_id: String,
    /// The user's message text.
    pub user_message: String,
    /// The bot's response (may be a safety-withhold notice).
    pub bot_response: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
}

/// Aggregate counters over the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of distinct conversations.
    pub total_conversations: i64,
    /// Total number of exchanges across all conversations.
    pub total_exchanges: i64,
    /// Conversations with at least one exchange at or after the cutoff.
    pub active_conversations: i64,
}
