use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One raw article from the evidence search, before stance classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub published_date: Option<String>,
    pub content: String,
}

/// The web-search seam. An empty result list means "no evidence found" and
/// must never abort a stage; callers fall back instead.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>>;
}

// ---------------------------------------------------------------------------
// Tavily adapter
// ---------------------------------------------------------------------------

/// Snippets are capped before they reach the engine prompt.
const MAX_SNIPPET_CHARS: usize = 600;

pub struct TavilySearch {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest {
    api_key: String,
    query: String,
    max_results: u32,
    include_answer: bool,
    search_depth: String,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
}

impl TavilySearch {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self { api_key, client }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchResult>> {
        let request = TavilySearchRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            max_results,
            include_answer: true,
            search_depth: "advanced".to_string(),
        };

        let resp: TavilySearchResponse = self
            .client
            .post("https://api.tavily.com/search")
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        let mut results = Vec::new();

        // The aggregated direct answer, when present, leads the list.
        if let Some(answer) = resp.answer.filter(|a| !a.is_empty()) {
            results.push(SearchResult {
                title: format!("Direct Answer: {}", truncate_chars(query, 80)),
                url: "https://tavily.com/direct-answer".to_string(),
                publisher: "Tavily Search (aggregated answer)".to_string(),
                published_date: None,
                content: answer,
            });
        }

        for r in resp.results {
            let publisher = r
                .source
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| extract_domain(&r.url));
            results.push(SearchResult {
                title: r.title,
                publisher,
                published_date: r.published_date,
                content: truncate_chars(&r.content, MAX_SNIPPET_CHARS).to_string(),
                url: r.url,
            });
        }

        info!(query = truncate_chars(query, 60), results = results.len(), "evidence search");
        Ok(results)
    }
}

/// Used when no search API key is configured; the evidence stage then runs
/// on its fallback article pool.
pub struct DisabledSearch;

impl DisabledSearch {
    pub fn new() -> Self {
        warn!("TAVILY_API_KEY not set, evidence will come from the fallback pool");
        Self
    }
}

#[async_trait]
impl SearchProvider for DisabledSearch {
    async fn search(&self, _query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

/// Extract the host from a URL for publisher attribution.
fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
