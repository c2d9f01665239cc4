//! Generation request and result types.

use serde::{Deserialize, Serialize};

/// Everything a [`crate::Generator`] needs to produce a response.
///
/// The conversation context arrives pre-rendered as text; the generator does
/// not talk to the history store itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The user's message text.
    pub user_message: String,
    /// Display name of the sender.
    pub user_name: String,
    /// Rendered conversation context (recent history, headers, directives).
    pub context: String,
    /// Whether this is a group conversation.
    pub is_group: bool,
    /// Whether the bot was mentioned.
    pub is_mentioned: bool,
}

/// The outcome of a generation, including which tools were consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The final response text.
    pub response: String,
    /// Tools invoked during generation, in order. Diagnostics only.
    pub tool_trace: Vec<ToolInvocation>,
}

impl GenerationResult {
    /// A plain text result with no tool usage.
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            tool_trace: Vec::new(),
        }
    }
}

/// Record of a single tool call made while generating a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name as registered in the tool set.
    pub tool: String,
    /// The query the model passed to the tool.
    pub query: String,
    /// Whether the tool was known and dispatched.
    pub success: bool,
}
