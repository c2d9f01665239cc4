//! Tool-augmented response generation.

use std::sync::Arc;

use chat_core::{
    async_trait, CoreError, GenerationRequest, GenerationResult, Generator, ToolInvocation,
    ToolSet,
};
use tracing::{debug, info, warn};

use crate::api_types::{ChatCompletionRequest, ChatMessage, ToolDefinition};
use crate::client::MistralClient;
use crate::config::MistralConfig;

const SYSTEM_PROMPT: &str = "You are a helpful conversational assistant. Use the \
conversation context to stay coherent across turns. When the user asks about \
current events or facts you are unsure of, use the available tools before \
answering. Answer in the user's language.";

const FALLBACK_RESPONSE: &str = "I apologize, but I couldn't generate a response.";

/// A generator backed by the Mistral chat completions API.
///
/// Runs a bounded agentic loop: while the model requests tool calls, each
/// call is dispatched to the registered tool set and the formatted result is
/// fed back as a tool message. When the round budget runs out, a final
/// request is made with tool calling disabled.
pub struct MistralGenerator {
    client: MistralClient,
    tools: Arc<ToolSet>,
    max_tool_rounds: usize,
}

impl MistralGenerator {
    pub fn new(config: MistralConfig, tools: Arc<ToolSet>) -> Result<Self, CoreError> {
        let max_tool_rounds = config.max_tool_rounds;
        let client = MistralClient::new(config)?;

        info!(
            "MistralGenerator initialized with model: {}, tools: {}",
            client.config().model,
            tools.len()
        );

        Ok(Self {
            client,
            tools,
            max_tool_rounds,
        })
    }

    /// Expose the registered tools as function definitions, or `None` when
    /// the tool set is empty.
    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.tools.is_empty() {
            return None;
        }

        Some(
            self.tools
                .list_tools()
                .iter()
                .map(|tool| {
                    ToolDefinition::function(tool.name(), tool.description(), tool.parameters())
                })
                .collect(),
        )
    }

    fn completion_request(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
        tool_choice: Option<String>,
    ) -> ChatCompletionRequest {
        let config = self.client.config();
        ChatCompletionRequest {
            model: config.model.clone(),
            messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            tools,
            tool_choice,
        }
    }
}

/// Render the request fields into the user turn sent to the model.
fn render_request(request: &GenerationRequest) -> String {
    format!(
        "Context:\n{}\n\nUser name: {}\nGroup conversation: {}\nBot mentioned: {}\n\nMessage: {}",
        request.context,
        request.user_name,
        request.is_group,
        request.is_mentioned,
        request.user_message
    )
}

/// Extract the `query` argument from a tool call's JSON arguments.
fn parse_query_argument(arguments: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(arguments).ok()?;
    value
        .get("query")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Generator for MistralGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, CoreError> {
        let mut messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(render_request(&request)),
        ];
        let tool_definitions = self.tool_definitions();
        let mut tool_trace = Vec::new();

        for round in 0..self.max_tool_rounds {
            let completion = self
                .client
                .chat_completion(self.completion_request(
                    messages.clone(),
                    tool_definitions.clone(),
                    None,
                ))
                .await?;

            let Some(choice) = completion.choices.into_iter().next() else {
                warn!("Empty choices in completion, using fallback");
                return Ok(GenerationResult {
                    response: FALLBACK_RESPONSE.to_string(),
                    tool_trace,
                });
            };

            let tool_calls = choice.message.tool_calls.unwrap_or_default();
            if tool_calls.is_empty() {
                let response = choice
                    .message
                    .content
                    .unwrap_or_else(|| FALLBACK_RESPONSE.to_string());
                return Ok(GenerationResult {
                    response,
                    tool_trace,
                });
            }

            debug!(
                "Round {}: model requested {} tool call(s)",
                round + 1,
                tool_calls.len()
            );

            messages.push(ChatMessage::assistant(
                choice.message.content,
                Some(tool_calls.clone()),
            ));

            for call in tool_calls {
                let name = call.function.name.clone();
                let query = parse_query_argument(&call.function.arguments).unwrap_or_default();

                // Unknown tools and degraded lookups feed text back to the
                // model instead of failing the generation.
                let (result, success) = match self.tools.lookup(&name, &query).await {
                    Some(text) => (text, true),
                    None => {
                        warn!("Model requested unknown tool: {}", name);
                        (format!("Unknown tool: {}", name), false)
                    }
                };

                tool_trace.push(ToolInvocation {
                    tool: name,
                    query,
                    success,
                });
                messages.push(ChatMessage::tool(call.id, result));
            }
        }

        // Round budget exhausted: force a final answer without tools.
        debug!("Tool round budget exhausted, requesting final answer");
        let completion = self
            .client
            .chat_completion(self.completion_request(
                messages,
                tool_definitions,
                Some("none".to_string()),
            ))
            .await?;

        let response = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| FALLBACK_RESPONSE.to_string());

        Ok(GenerationResult {
            response,
            tool_trace,
        })
    }

    fn name(&self) -> &str {
        "MistralGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            user_message: "What's new in Rust?".to_string(),
            user_name: "Alice".to_string(),
            context: "New conversation".to_string(),
            is_group: true,
            is_mentioned: false,
        }
    }

    #[test]
    fn test_render_request_stringifies_flags() {
        let rendered = render_request(&sample_request());
        assert!(rendered.contains("Context:\nNew conversation"));
        assert!(rendered.contains("User name: Alice"));
        assert!(rendered.contains("Group conversation: true"));
        assert!(rendered.contains("Bot mentioned: false"));
        assert!(rendered.contains("Message: What's new in Rust?"));
    }

    #[test]
    fn test_parse_query_argument() {
        assert_eq!(
            parse_query_argument(r#"{"query": "rust releases"}"#).as_deref(),
            Some("rust releases")
        );
        assert!(parse_query_argument(r#"{"other": 1}"#).is_none());
        assert!(parse_query_argument("not json").is_none());
    }

    #[test]
    fn test_tool_definitions_empty_set() {
        let generator = MistralGenerator::new(
            MistralConfig::builder().api_key("test-key").build(),
            Arc::new(ToolSet::new()),
        )
        .unwrap();
        assert!(generator.tool_definitions().is_none());
    }

    #[test]
    fn test_generator_name() {
        let generator = MistralGenerator::new(
            MistralConfig::builder().api_key("test-key").build(),
            Arc::new(ToolSet::new()),
        )
        .unwrap();
        assert_eq!(generator.name(), "MistralGenerator");
    }
}
