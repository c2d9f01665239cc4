//! Exchange persistence operations.
//!
//! The history store is append-only: exchanges are inserted and read, never
//! updated. The only deletion path is a per-user bulk clear.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{Exchange, HistoryStats, GROUP_SUFFIX};

/// Append one exchange to a conversation's history.
pub async fn append(
    pool: &SqlitePool,
    conversation_id: &str,
    user_message: &str,
    bot_response: &str,
    timestamp: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO exchanges (conversation_id, user_message, bot_response, timestamp)
         VALUES (?, ?, ?, ?)",
    )
    .bind(conversation_id)
    .bind(user_message)
    .bind(bot_response)
    .bind(timestamp)
    .execute(pool)
    .await?;

    tracing::debug!("Appended exchange to conversation {}", conversation_id);
    Ok(())
}

/// Fetch the most recent exchanges for a conversation, newest first.
///
/// Returns an empty vec when the conversation has no history.
pub async fn recent(
    pool: &SqlitePool,
    conversation_id: &str,
    limit: u32,
) -> Result<Vec<Exchange>> {
    let exchanges = sqlx::query_as::<_, Exchange>(
        "SELECT id, conversation_id, user_message, bot_response, timestamp
         FROM exchanges
         WHERE conversation_id = ?
         ORDER BY id DESC
         LIMIT ?",
    )
    .bind(conversation_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(exchanges)
}

/// Delete all history for a user, across both their private and group
/// conversations. Idempotent; returns the number of rows removed.
pub async fn clear_user(pool: &SqlitePool, user_id: &str) -> Result<u64> {
    let mut deleted = 0;
    for suffix in ["", GROUP_SUFFIX] {
        let conversation_id = format!("{}{}", user_id, suffix);
        let result = sqlx::query("DELETE FROM exchanges WHERE conversation_id = ?")
            .bind(&conversation_id)
            .execute(pool)
            .await?;
        deleted += result.rows_affected();
    }

    tracing::info!("Cleared {} exchanges for user {}", deleted, user_id);
    Ok(deleted)
}

/// Aggregate history counters. A conversation is active when its latest
/// exchange timestamp is at or after `active_cutoff` (ISO-8601 strings
/// compare lexicographically).
pub async fn stats(pool: &SqlitePool, active_cutoff: &str) -> Result<HistoryStats> {
    let (total_conversations,): (i64,) =
        sqlx::query_as("SELECT COUNT(DISTINCT conversation_id) FROM exchanges")
            .fetch_one(pool)
            .await?;

    let (total_exchanges,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exchanges")
        .fetch_one(pool)
        .await?;

    let (active_conversations,): (i64,) = sqlx::query_as(
        "SELECT COUNT(DISTINCT conversation_id) FROM exchanges WHERE timestamp >= ?",
    )
    .bind(active_cutoff)
    .fetch_one(pool)
    .await?;

    Ok(HistoryStats {
        total_conversations,
        total_exchanges,
        active_conversations,
    })
}
