//! Web search via the DuckDuckGo HTML endpoint.
//!
//! Results are scraped from the HTML result page, then each target page is
//! fetched to extract its title, meta description, and publication date.
//! Per-page failures degrade that entry to bare metadata; a failure of the
//! search itself degrades to an unavailability notice.
//!
//! `scraper::Html` is not `Send`, so all HTML parsing happens in synchronous
//! helpers that are never held across an await point.

use std::time::Duration;

use async_trait::async_trait;
use chat_core::LookupTool;
use scraper::{Html, Selector};
use url::Url;

use crate::error::LookupError;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const DEFAULT_RESULT_COUNT: usize = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; chat-orchestrator/0.1)";

/// DuckDuckGo-backed web search tool.
pub struct WebSearch {
    client: reqwest::Client,
    result_count: usize,
}

/// A single search hit: title and resolved target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchHit {
    title: String,
    url: String,
}

/// Metadata extracted from a result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PageMeta {
    title: String,
    description: Option<String>,
    published: Option<String>,
}

impl WebSearch {
    pub fn new() -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            result_count: DEFAULT_RESULT_COUNT,
        })
    }

    /// Override the number of results fetched per query.
    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = count;
        self
    }

    async fn search(&self, query: &str) -> Result<String, LookupError> {
        let html = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let hits = parse_results(&html, self.result_count);
        if hits.is_empty() {
            return Ok(format!("No web results found for \"{}\".", query));
        }

        let mut blocks = Vec::with_capacity(hits.len());
        for hit in hits {
            let meta = self.fetch_page_meta(&hit.url).await;
            blocks.push(format_hit(&hit, &meta));
        }

        Ok(blocks.join("\n\n"))
    }

    /// Fetch a result page and extract its metadata. Any failure degrades to
    /// empty metadata for that entry.
    async fn fetch_page_meta(&self, url: &str) -> PageMeta {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Page fetch failed for {}: {}", url, e);
                return PageMeta::default();
            }
        };

        match response.text().await {
            Ok(body) => parse_page_meta(&body),
            Err(e) => {
                tracing::debug!("Page body read failed for {}: {}", url, e);
                PageMeta::default()
            }
        }
    }
}

#[async_trait]
impl LookupTool for WebSearch {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns the top results with \
         title, URL, description, and publication date when available."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn lookup(&self, query: &str) -> String {
        tracing::debug!("Web search: {}", query);
        match self.search(query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Web search failed for \"{}\": {}", query, e);
                format!("Web search is currently unavailable (query: \"{}\").", query)
            }
        }
    }
}

/// Extract the first `limit` result anchors from a DuckDuckGo HTML page.
fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let title = anchor.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                return None;
            }
            Some(SearchHit {
                title,
                url: resolve_result_url(href),
            })
        })
        .take(limit)
        .collect()
}

/// Result hrefs are usually redirect links of the form
/// `//duckduckgo.com/l/?uddg=<encoded target>`. Decode the target when
/// present; otherwise return the href as-is.
fn resolve_result_url(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    if let Ok(parsed) = Url::parse(&absolute) {
        if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }

    absolute
}

/// Extract title, meta description, and publication date from a page.
fn parse_page_meta(html: &str) -> PageMeta {
    let document = Html::parse_document(html);

    let title = select_text(&document, "title").unwrap_or_default();
    let description = select_content(&document, r#"meta[name="description"]"#);
    let published = select_content(&document, r#"meta[property="article:published_time"]"#)
        .or_else(|| select_content(&document, r#"meta[name="date"]"#));

    PageMeta {
        title,
        description,
        published,
    }
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn select_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let content = element.value().attr("content")?.trim().to_string();
    (!content.is_empty()).then_some(content)
}

/// Render one result block. The page's own title wins over the anchor text
/// when the fetch succeeded.
fn format_hit(hit: &SearchHit, meta: &PageMeta) -> String {
    let title = if meta.title.is_empty() {
        &hit.title
    } else {
        &meta.title
    };

    let mut block = format!("- {}\n  URL: {}", title, hit.url);
    if let Some(description) = &meta.description {
        block.push_str(&format!("\n  Description: {}", description));
    }
    if let Some(published) = &meta.published {
        block.push_str(&format!("\n  Published: {}", published));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <div class="result">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Ffirst&amp;rut=abc">First Result</a>
        </div>
        <div class="result">
            <a class="result__a" href="https://example.org/second">Second Result</a>
        </div>
        <div class="result">
            <a class="result__a" href="https://example.net/third">Third Result</a>
        </div>
        <div class="result">
            <a class="result__a" href="https://example.net/fourth">Fourth Result</a>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_limit_and_order() {
        let hits = parse_results(RESULTS_PAGE, 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "First Result");
        assert_eq!(hits[2].title, "Third Result");
    }

    #[test]
    fn test_redirect_url_decoded() {
        let hits = parse_results(RESULTS_PAGE, 1);
        assert_eq!(hits[0].url, "https://example.com/first");
    }

    #[test]
    fn test_direct_url_passed_through() {
        let hits = parse_results(RESULTS_PAGE, 2);
        assert_eq!(hits[1].url, "https://example.org/second");
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body></body></html>", 3).is_empty());
    }

    #[test]
    fn test_parse_page_meta_full() {
        let html = r#"
            <html><head>
            <title>Page Title</title>
            <meta name="description" content="A description.">
            <meta property="article:published_time" content="2026-02-01T09:00:00Z">
            </head><body></body></html>
        "#;
        let meta = parse_page_meta(html);
        assert_eq!(meta.title, "Page Title");
        assert_eq!(meta.description.as_deref(), Some("A description."));
        assert_eq!(meta.published.as_deref(), Some("2026-02-01T09:00:00Z"));
    }

    #[test]
    fn test_parse_page_meta_date_fallback() {
        let html = r#"<html><head><meta name="date" content="2026-02-01"></head></html>"#;
        let meta = parse_page_meta(html);
        assert_eq!(meta.published.as_deref(), Some("2026-02-01"));
    }

    #[test]
    fn test_parse_page_meta_empty() {
        let meta = parse_page_meta("<html><body>no head</body></html>");
        assert!(meta.title.is_empty());
        assert!(meta.description.is_none());
        assert!(meta.published.is_none());
    }

    #[test]
    fn test_format_hit_prefers_page_title() {
        let hit = SearchHit {
            title: "Anchor Text".to_string(),
            url: "https://example.com".to_string(),
        };
        let meta = PageMeta {
            title: "Real Title".to_string(),
            description: Some("Desc.".to_string()),
            published: None,
        };
        let block = format_hit(&hit, &meta);
        assert_eq!(
            block,
            "- Real Title\n  URL: https://example.com\n  Description: Desc."
        );
    }

    #[test]
    fn test_format_hit_degraded_meta() {
        let hit = SearchHit {
            title: "Anchor Text".to_string(),
            url: "https://example.com".to_string(),
        };
        let block = format_hit(&hit, &PageMeta::default());
        assert_eq!(block, "- Anchor Text\n  URL: https://example.com");
    }

    #[tokio::test]
    #[ignore = "hits the live DuckDuckGo endpoint"]
    async fn test_live_search() {
        let tool = WebSearch::new().unwrap();
        let result = tool.lookup("rust programming language").await;
        assert!(result.contains("URL:"));
    }
}
