//! Encyclopedia lookup via the MediaWiki API.
//!
//! Runs a full-text search, then fetches an intro extract, canonical URL,
//! and last revision timestamp for each matching title. A per-title failure
//! degrades to an error line; the search itself failing degrades to an
//! unavailability notice at the `lookup` boundary.

use std::time::Duration;

use async_trait::async_trait;
use chat_core::LookupTool;
use serde::Deserialize;
use serde_json::Value;

use crate::error::LookupError;

const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const SEARCH_LIMIT: &str = "5";
const EXTRACT_MAX_CHARS: usize = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Wikipedia lookup tool.
pub struct Wikipedia {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    title: String,
}

/// Details fetched for a single article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ArticleInfo {
    extract: Option<String>,
    url: Option<String>,
    last_modified: Option<String>,
}

impl Wikipedia {
    pub fn new() -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Point the tool at a different MediaWiki instance.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let response: SearchResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", SEARCH_LIMIT),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|entry| entry.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_article(&self, title: &str) -> Result<ArticleInfo, LookupError> {
        let body: Value = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts|info|revisions"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("rvprop", "timestamp"),
                ("titles", title),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_article(&body))
    }

    async fn run(&self, query: &str) -> Result<String, LookupError> {
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            return Ok(format!("No Wikipedia results found for \"{}\".", query));
        }

        let mut blocks = Vec::with_capacity(titles.len());
        for title in titles {
            match self.fetch_article(&title).await {
                Ok(info) => blocks.push(format_article(&title, &info)),
                Err(e) => {
                    tracing::debug!("Article fetch failed for \"{}\": {}", title, e);
                    blocks.push(format!("- Wikipedia: {}\n  Lookup failed.", title));
                }
            }
        }

        Ok(blocks.join("\n\n"))
    }
}

#[async_trait]
impl LookupTool for Wikipedia {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up encyclopedic information on Wikipedia. Returns matching \
         articles with an intro extract, URL, and last modification date."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The topic to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn lookup(&self, query: &str) -> String {
        tracing::debug!("Wikipedia lookup: {}", query);
        match self.run(query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Wikipedia lookup failed for \"{}\": {}", query, e);
                format!(
                    "Wikipedia lookup is currently unavailable (query: \"{}\").",
                    query
                )
            }
        }
    }
}

/// Pull extract, URL, and last revision timestamp out of a `query.pages`
/// response. The pages object is keyed by page id; exactly one entry is
/// expected since we query one title at a time.
fn parse_article(body: &Value) -> ArticleInfo {
    let Some(page) = body
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
    else {
        return ArticleInfo::default();
    };

    let extract = page
        .get("extract")
        .and_then(Value::as_str)
        .map(|text| truncate_chars(text.replace('\n', " ").trim(), EXTRACT_MAX_CHARS));

    let url = page
        .get("fullurl")
        .and_then(Value::as_str)
        .map(str::to_string);

    let last_modified = page
        .get("revisions")
        .and_then(Value::as_array)
        .and_then(|revs| revs.first())
        .and_then(|rev| rev.get("timestamp"))
        .and_then(Value::as_str)
        .map(str::to_string);

    ArticleInfo {
        extract,
        url,
        last_modified,
    }
}

/// Truncate on a character boundary, appending `...` when shortened.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

fn format_article(title: &str, info: &ArticleInfo) -> String {
    let mut block = format!("- Wikipedia: {}", title);
    if let Some(url) = &info.url {
        block.push_str(&format!("\n  URL: {}", url));
    }
    if let Some(extract) = &info.extract {
        block.push_str(&format!("\n  Extract: {}", extract));
    }
    if let Some(last_modified) = &info.last_modified {
        block.push_str(&format!("\n  Last modified: {}", last_modified));
    }
    block
}
