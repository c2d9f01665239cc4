//! HTTP client for the Mistral chat completions API.

use std::time::Duration;

use chat_core::CoreError;
use reqwest::Client;
use tracing::debug;

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::MistralConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Thin client around the chat completions endpoint. Shared by the generator
/// and the safety classifier.
#[derive(Debug, Clone)]
pub struct MistralClient {
    client: Client,
    config: MistralConfig,
}

impl MistralClient {
    pub fn new(config: MistralConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                CoreError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    /// Make a chat completion request.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CoreError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        debug!("Sending request to Mistral API: model={}", request.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(CoreError::Backend(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(CoreError::Backend(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Backend(format!("Failed to parse response: {}", e)))?;

        debug!("Received response from Mistral API: id={}", completion.id);

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(completion)
    }
}
