//! Configuration for the Mistral backend.

use chat_core::CoreError;
use std::env;

/// Configuration shared by the generator and the safety classifier.
#[derive(Debug, Clone)]
pub struct MistralConfig {
    /// Mistral API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for a response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 1.0).
    pub temperature: Option<f32>,

    /// Maximum number of tool-call rounds per generation.
    pub max_tool_rounds: usize,
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.mistral.ai".to_string(),
            api_key: String::new(),
            model: "mistral-small-latest".to_string(),
            max_tokens: Some(20000),
            temperature: Some(0.7),
            max_tool_rounds: 4,
        }
    }
}

impl MistralConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `MISTRAL_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `MISTRAL_API_URL` - API URL (default: https://api.mistral.ai)
    /// - `MISTRAL_MODEL` - Model name (default: mistral-small-latest)
    /// - `MISTRAL_MAX_TOKENS` - Max tokens (default: 20000)
    /// - `MISTRAL_TEMPERATURE` - Temperature (default: 0.7)
    /// - `MISTRAL_MAX_TOOL_ROUNDS` - Max tool-call rounds (default: 4)
    pub fn from_env() -> Result<Self, CoreError> {
        let api_key = env::var("MISTRAL_API_KEY")
            .map_err(|_| CoreError::Configuration("MISTRAL_API_KEY not set".to_string()))?;

        let api_url =
            env::var("MISTRAL_API_URL").unwrap_or_else(|_| "https://api.mistral.ai".to_string());

        let model =
            env::var("MISTRAL_MODEL").unwrap_or_else(|_| "mistral-small-latest".to_string());

        let max_tokens = env::var("MISTRAL_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(20000));

        let temperature = env::var("MISTRAL_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let max_tool_rounds = env::var("MISTRAL_MAX_TOOL_ROUNDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            max_tool_rounds,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> MistralConfigBuilder {
        MistralConfigBuilder::default()
    }
}

/// Builder for MistralConfig.
#[derive(Debug, Default)]
pub struct MistralConfigBuilder {
    config: MistralConfig,
}

impl MistralConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the maximum tool-call rounds.
    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.config.max_tool_rounds = rounds;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MistralConfig {
        self.config
    }
}
