//! Main orchestrator that sequences the response pipeline.

use std::sync::Arc;

use chat_core::{Classifier, GenerationRequest, Generator, IncomingMessage, Reply};
use chrono::{Duration, Utc};
use database::{exchange, Database, HistoryStats};
use tracing::{debug, info, warn};

use crate::context::ContextBuilder;
use crate::error::OrchestratorError;
use crate::locks::ConversationLocks;

/// Returned when the input gate blocks a message.
pub const INPUT_BLOCKED_MESSAGE: &str = "🚫 Your message was blocked because it may \
contain unsafe content or a prompt injection attempt.";

/// Returned when the output gate withholds a generated response.
pub const OUTPUT_WITHHELD_MESSAGE: &str = "🚫 The generated response was withheld \
because it may contain unsafe content.";

/// Sequences each message through the pipeline: input gate, context build,
/// generation, output gate, persistence.
///
/// Requests for the same conversation are serialized; different conversations
/// proceed concurrently.
pub struct Orchestrator {
    db: Database,
    input_gate: Arc<dyn Classifier>,
    output_gate: Arc<dyn Classifier>,
    generator: Arc<dyn Generator>,
    context: ContextBuilder,
    locks: ConversationLocks,
    gate_output: bool,
}

impl Orchestrator {
    pub fn new(
        db: Database,
        input_gate: Arc<dyn Classifier>,
        output_gate: Arc<dyn Classifier>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let context = ContextBuilder::new(db.clone());
        Self {
            db,
            input_gate,
            output_gate,
            generator,
            context,
            locks: ConversationLocks::default(),
            gate_output: true,
        }
    }

    /// Enable or disable the output gate (enabled by default).
    pub fn with_output_gate(mut self, enabled: bool) -> Self {
        self.gate_output = enabled;
        self
    }

    /// Process one message end to end and produce the reply.
    pub async fn process(&self, message: IncomingMessage) -> Result<Reply, OrchestratorError> {
        let conversation_id = database::conversation_id(&message.user_id, message.is_group);
        let _guard = self.locks.acquire(&conversation_id).await;

        debug!(
            "Processing message from {} (conversation {})",
            message.user_name, conversation_id
        );

        // Input gate. A classifier failure is treated as unsafe.
        let input_safe = match self.input_gate.classify(&message.message).await {
            Ok(safe) => safe,
            Err(e) => {
                warn!("Input gate failed, treating message as unsafe: {}", e);
                false
            }
        };

        if !input_safe {
            info!("Input blocked for conversation {}", conversation_id);
            return Ok(Reply {
                response: INPUT_BLOCKED_MESSAGE.to_string(),
                timestamp: Utc::now().to_rfc3339(),
            });
        }

        // Context build. A read failure degrades to an empty-history context.
        let context = match self
            .context
            .build(&conversation_id, message.is_group, message.is_mentioned)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(
                    "Context build failed for {}, continuing without history: {}",
                    conversation_id, e
                );
                crate::context::render(&[], message.is_group, message.is_mentioned)
            }
        };

        let result = self
            .generator
            .generate(GenerationRequest {
                user_message: message.message.clone(),
                user_name: message.user_name.clone(),
                context,
                is_group: message.is_group,
                is_mentioned: message.is_mentioned,
            })
            .await?;

        if !result.tool_trace.is_empty() {
            debug!(
                "Generation used {} tool call(s): {:?}",
                result.tool_trace.len(),
                result.tool_trace
            );
        }

        let mut response = result.response;

        // Output gate. Unsafe or unverifiable responses are withheld; the
        // withholding notice is what gets persisted and returned.
        if self.gate_output {
            let output_safe = match self.output_gate.classify(&response).await {
                Ok(safe) => safe,
                Err(e) => {
                    warn!("Output gate failed, withholding response: {}", e);
                    false
                }
            };

            if !output_safe {
                info!("Output withheld for conversation {}", conversation_id);
                response = OUTPUT_WITHHELD_MESSAGE.to_string();
            }
        }

        let timestamp = Utc::now().to_rfc3339();

        // A write failure loses this exchange from future context but must
        // not lose the response already produced.
        if let Err(e) = exchange::append(
            self.db.pool(),
            &conversation_id,
            &message.message,
            &response,
            &timestamp,
        )
        .await
        {
            warn!(
                "Failed to persist exchange for {} (history gap): {}",
                conversation_id, e
            );
        }

        Ok(Reply {
            response,
            timestamp,
        })
    }

    /// Delete all history for a user (private and group threads).
    pub async fn clear_history(&self, user_id: &str) -> Result<u64, OrchestratorError> {
        Ok(exchange::clear_user(self.db.pool(), user_id).await?)
    }

    /// Aggregate history counters; "active" means an exchange within the
    /// last hour.
    pub async fn stats(&self) -> Result<HistoryStats, OrchestratorError> {
        let cutoff = (Utc::now() - Duration::hours(1)).to_rfc3339();
        Ok(exchange::stats(self.db.pool(), &cutoff).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{async_trait, CoreError, GenerationResult};
    use std::sync::Mutex;

    /// Classifier returning a fixed verdict or error.
    struct FixedClassifier {
        verdict: Option<bool>,
    }

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<bool, CoreError> {
            self.verdict
                .ok_or_else(|| CoreError::Network("gate unreachable".to_string()))
        }
    }

    fn gate(verdict: Option<bool>) -> Arc<dyn Classifier> {
        Arc::new(FixedClassifier { verdict })
    }

    /// Generator echoing a fixed response and recording received requests.
    struct RecordingGenerator {
        response: String,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl RecordingGenerator {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: response.to_string(),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Generator for RecordingGenerator {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResult, CoreError> {
            self.requests.lock().unwrap().push(request);
            Ok(GenerationResult::text(self.response.clone()))
        }

        fn name(&self) -> &str {
            "RecordingGenerator"
        }
    }

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn orchestrator(
        db: &Database,
        input: Option<bool>,
        output: Option<bool>,
        generator: Arc<RecordingGenerator>,
    ) -> Orchestrator {
        Orchestrator::new(db.clone(), gate(input), gate(output), generator)
    }

    #[tokio::test]
    async fn test_private_message_persisted_under_user_id() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("hi Alice");
        let orchestrator = orchestrator(&db, Some(true), Some(true), generator.clone());

        let reply = orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await
            .unwrap();

        assert_eq!(reply.response, "hi Alice");

        let stored = exchange::recent(db.pool(), "u1", 5).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_message, "hello");
        assert_eq!(stored[0].bot_response, "hi Alice");
        assert_eq!(stored[0].timestamp, reply.timestamp);
    }

    #[tokio::test]
    async fn test_group_message_uses_group_conversation() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("ok");
        let orchestrator = orchestrator(&db, Some(true), Some(true), generator.clone());

        orchestrator
            .process(IncomingMessage::group("u2", "Bob", "hello group", true))
            .await
            .unwrap();

        assert!(exchange::recent(db.pool(), "u2", 5).await.unwrap().is_empty());
        let stored = exchange::recent(db.pool(), "u2_group", 5).await.unwrap();
        assert_eq!(stored.len(), 1);

        let requests = generator.requests.lock().unwrap();
        assert!(requests[0]
            .context
            .contains("[GROUP - BOT MENTIONED] Respond concisely."));
    }

    #[tokio::test]
    async fn test_first_message_sees_new_conversation_marker() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("ok");
        let orchestrator = orchestrator(&db, Some(true), Some(true), generator.clone());

        orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await
            .unwrap();

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].context, "New conversation");
    }

    #[tokio::test]
    async fn test_context_includes_prior_exchanges() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("ok");
        let orchestrator = orchestrator(&db, Some(true), Some(true), generator.clone());

        orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "first"))
            .await
            .unwrap();
        orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "second"))
            .await
            .unwrap();

        let requests = generator.requests.lock().unwrap();
        let context = &requests[1].context;
        assert!(context.contains("User: first"));
        assert!(context.contains("Bot: ok"));
    }

    #[tokio::test]
    async fn test_blocked_input_writes_nothing() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("never");
        let orchestrator = orchestrator(&db, Some(false), Some(true), generator.clone());

        let reply = orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "bad message"))
            .await
            .unwrap();

        assert_eq!(reply.response, INPUT_BLOCKED_MESSAGE);
        // No generation, no persistence
        assert!(generator.requests.lock().unwrap().is_empty());
        assert!(exchange::recent(db.pool(), "u1", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_input_gate_error_fails_closed() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("never");
        let orchestrator = orchestrator(&db, None, Some(true), generator.clone());

        let reply = orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await
            .unwrap();

        assert_eq!(reply.response, INPUT_BLOCKED_MESSAGE);
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsafe_output_withheld_and_persisted() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("something unsafe");
        let orchestrator = orchestrator(&db, Some(true), Some(false), generator.clone());

        let reply = orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await
            .unwrap();

        assert_eq!(reply.response, OUTPUT_WITHHELD_MESSAGE);
        let stored = exchange::recent(db.pool(), "u1", 5).await.unwrap();
        assert_eq!(stored[0].bot_response, OUTPUT_WITHHELD_MESSAGE);
    }

    #[tokio::test]
    async fn test_output_gate_can_be_disabled() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("raw response");
        let orchestrator =
            orchestrator(&db, Some(true), Some(false), generator.clone()).with_output_gate(false);

        let reply = orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await
            .unwrap();

        assert_eq!(reply.response, "raw response");
    }

    #[tokio::test]
    async fn test_clear_history_removes_both_threads() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("ok");
        let orchestrator = orchestrator(&db, Some(true), Some(true), generator.clone());

        orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "private"))
            .await
            .unwrap();
        orchestrator
            .process(IncomingMessage::group("u1", "Alice", "group", false))
            .await
            .unwrap();

        assert_eq!(orchestrator.clear_history("u1").await.unwrap(), 2);
        assert_eq!(orchestrator.clear_history("u1").await.unwrap(), 0);
        assert!(exchange::recent(db.pool(), "u1", 5).await.unwrap().is_empty());
        assert!(exchange::recent(db.pool(), "u1_group", 5)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_stats_counts_conversations() {
        let db = test_db().await;
        let generator = RecordingGenerator::new("ok");
        let orchestrator = orchestrator(&db, Some(true), Some(true), generator.clone());

        orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await
            .unwrap();
        orchestrator
            .process(IncomingMessage::group("u2", "Bob", "hello", false))
            .await
            .unwrap();

        let stats = orchestrator.stats().await.unwrap();
        assert_eq!(stats.total_conversations, 2);
        assert_eq!(stats.total_exchanges, 2);
        assert_eq!(stats.active_conversations, 2);
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        struct FailingGenerator;

        #[async_trait]
        impl Generator for FailingGenerator {
            async fn generate(
                &self,
                _request: GenerationRequest,
            ) -> Result<GenerationResult, CoreError> {
                Err(CoreError::Backend("model unavailable".to_string()))
            }

            fn name(&self) -> &str {
                "FailingGenerator"
            }
        }

        let db = test_db().await;
        let orchestrator = Orchestrator::new(
            db.clone(),
            gate(Some(true)),
            gate(Some(true)),
            Arc::new(FailingGenerator),
        );

        let result = orchestrator
            .process(IncomingMessage::direct("u1", "Alice", "hello"))
            .await;

        assert!(matches!(result, Err(OrchestratorError::Generation(_))));
        // The failed exchange must not be persisted.
        assert!(exchange::recent(db.pool(), "u1", 5).await.unwrap().is_empty());
    }
}
