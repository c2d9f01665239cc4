//! Lookup tools exposed to the response generator.
//!
//! Two capabilities are provided:
//!
//! - [`WebSearch`] - DuckDuckGo HTML search plus per-page metadata extraction
//! - [`Wikipedia`] - MediaWiki search with intro extracts
//!
//! Tools implement [`chat_core::LookupTool`] and are infallible at that
//! boundary: a failed lookup produces explanatory text, never an error, so a
//! flaky upstream cannot abort a generation in progress.

pub mod error;
pub mod tools;

pub use error::LookupError;
pub use tools::{WebSearch, Wikipedia};

use std::sync::Arc;

use chat_core::ToolSet;

/// Build the standard tool set: web search and Wikipedia lookup.
pub fn default_toolset() -> Result<ToolSet, LookupError> {
    let mut set = ToolSet::new();
    set.register(Arc::new(WebSearch::new()?));
    set.register(Arc::new(Wikipedia::new()?));
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toolset_contents() {
        let set = default_toolset().unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.get("web_search").is_some());
        assert!(set.get("wikipedia").is_some());
    }
}
