//! Conversation context construction.
//!
//! Builds the textual context handed to the generator from the most recent
//! exchanges of a conversation. Rendering is a pure function over the fetched
//! rows so it can be tested without a store.

use database::{exchange, Database, Exchange};

use crate::error::OrchestratorError;

/// Number of most recent exchanges included in the context.
pub const DEFAULT_CONTEXT_TURNS: u32 = 5;

/// Builds generation context from stored history.
#[derive(Clone)]
pub struct ContextBuilder {
    db: Database,
    limit: u32,
}

impl ContextBuilder {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            limit: DEFAULT_CONTEXT_TURNS,
        }
    }

    /// Override the number of exchanges included.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Build the context string for a conversation.
    pub async fn build(
        &self,
        conversation_id: &str,
        is_group: bool,
        is_mentioned: bool,
    ) -> Result<String, OrchestratorError> {
        let mut exchanges = exchange::recent(self.db.pool(), conversation_id, self.limit).await?;
        // Fetched newest-first; the context reads oldest-to-newest.
        exchanges.reverse();
        Ok(render(&exchanges, is_group, is_mentioned))
    }
}

/// Render exchanges into the context text.
///
/// Empty history yields a "new conversation" marker instead of a header.
/// Group conversations get a trailing directive telling the generator how to
/// weigh the message; private ones get none.
pub fn render(exchanges: &[Exchange], is_group: bool, is_mentioned: bool) -> String {
    let mut context = if exchanges.is_empty() {
        if is_group {
            "New group conversation".to_string()
        } else {
            "New conversation".to_string()
        }
    } else {
        let header = if is_group {
            "Recent history (group conversation):"
        } else {
            "Recent history (private conversation):"
        };

        let mut lines = vec![header.to_string()];
        for exchange in exchanges {
            lines.push(format!("User: {}", exchange.user_message));
            lines.push(format!("Bot: {}", exchange.bot_response));
        }
        lines.join("\n")
    };

    if is_group {
        if is_mentioned {
            context.push_str("\n[GROUP - BOT MENTIONED] Respond concisely.");
        } else {
            context.push_str("\n[GROUP - NO MENTION] General group message.");
        }
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(id: i64, user_message: &str, bot_response: &str) -> Exchange {
        Exchange {
            id,
            conversation_id: "u1".to_string(),
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            timestamp: "2026-01-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_render_empty_private() {
        assert_eq!(render(&[], false, false), "New conversation");
    }

    #[test]
    fn test_render_empty_group_keeps_directive() {
        assert_eq!(
            render(&[], true, false),
            "New group conversation\n[GROUP - NO MENTION] General group message."
        );
    }

    #[test]
    fn test_render_private_history() {
        let exchanges = vec![exchange(1, "hello", "hi"), exchange(2, "how are you", "fine")];
        assert_eq!(
            render(&exchanges, false, false),
            "Recent history (private conversation):\nUser: hello\nBot: hi\nUser: how are you\nBot: fine"
        );
    }

    #[test]
    fn test_render_group_mentioned_directive() {
        let exchanges = vec![exchange(1, "hello", "hi")];
        let context = render(&exchanges, true, true);
        assert!(context.starts_with("Recent history (group conversation):"));
        assert!(context.ends_with("[GROUP - BOT MENTIONED] Respond concisely."));
    }

    #[test]
    fn test_render_no_directive_for_private() {
        let exchanges = vec![exchange(1, "hello", "hi")];
        let context = render(&exchanges, false, true);
        assert!(!context.contains("[GROUP"));
    }

    #[tokio::test]
    async fn test_build_orders_oldest_to_newest() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();

        for i in 1..=7 {
            exchange::append(
                db.pool(),
                "u1",
                &format!("message {}", i),
                &format!("response {}", i),
                &format!("2026-01-01T10:00:0{}Z", i),
            )
            .await
            .unwrap();
        }

        let builder = ContextBuilder::new(db);
        let context = builder.build("u1", false, false).await.unwrap();

        // Only the 5 most recent, in chronological order
        assert!(!context.contains("message 2"));
        let pos_3 = context.find("message 3").unwrap();
        let pos_7 = context.find("message 7").unwrap();
        assert!(pos_3 < pos_7);
    }
}
