//! Lookup tool trait and registry.
//!
//! Tools are the generator's window to the outside world. They are
//! deliberately infallible at this boundary: a tool that cannot complete a
//! lookup returns explanatory text rather than an error, so a flaky upstream
//! never aborts a generation in progress.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

/// An external lookup capability exposed to the generator as a function tool.
#[async_trait]
pub trait LookupTool: Send + Sync {
    /// Tool name as presented to the model (e.g. "web_search").
    fn name(&self) -> &str;

    /// Human-readable description the model uses to decide when to call it.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters(&self) -> serde_json::Value;

    /// Run the lookup. Degraded lookups return placeholder text, never panic.
    async fn lookup(&self, query: &str) -> String;
}

/// Registry of lookup tools, preserving registration order.
#[derive(Default)]
pub struct ToolSet {
    tools: IndexMap<String, Arc<dyn LookupTool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name. Re-registering replaces.
    pub fn register(&mut self, tool: Arc<dyn LookupTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a registered tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn LookupTool>> {
        self.tools.get(name)
    }

    /// All registered tools, in registration order.
    pub fn list_tools(&self) -> Vec<&Arc<dyn LookupTool>> {
        self.tools.values().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a query to a tool by name. `None` means the tool is unknown;
    /// the caller decides what to tell the model.
    pub async fn lookup(&self, name: &str, query: &str) -> Option<String> {
        let tool = self.tools.get(name)?;
        Some(tool.lookup(query).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTool {
        name: String,
        reply: String,
    }

    #[async_trait]
    impl LookupTool for FixedTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "a fixed tool"
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn lookup(&self, _query: &str) -> String {
            self.reply.clone()
        }
    }

    fn fixed(name: &str, reply: &str) -> Arc<dyn LookupTool> {
        Arc::new(FixedTool {
            name: name.to_string(),
            reply: reply.to_string(),
        })
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let mut set = ToolSet::new();
        set.register(fixed("echo", "pong"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.lookup("echo", "ping").await.as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_none() {
        let set = ToolSet::new();
        assert!(set.lookup("missing", "q").await.is_none());
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut set = ToolSet::new();
        set.register(fixed("b", ""));
        set.register(fixed("a", ""));
        let names: Vec<&str> = set.list_tools().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
