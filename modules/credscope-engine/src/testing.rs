// Test mocks for the collaborator seams.
//
// ScriptedEngine (ReasoningEngine): marker-keyed canned JSON responses
// with failure injection and call counting.
// StaticSearch / EmptySearch / FailingSearch (SearchProvider): fixed
// search outcomes.
//
// These enable deterministic pipeline tests: no network, no API keys.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use reason_client::{EngineError, EngineResponse, ReasoningEngine, TokenUsage};

use crate::search::{SearchProvider, SearchResult};

// ---------------------------------------------------------------------------
// ScriptedEngine
// ---------------------------------------------------------------------------

/// Returns the canned response whose marker appears in the prompt (system or
/// user message). Unmatched prompts fail, like an unregistered mock URL.
/// Builder pattern: `.on()`, `.fail_times()`, `.always_failing()`.
pub struct ScriptedEngine {
    responses: Vec<(String, String)>,
    failures: Mutex<Vec<(String, u32)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            failures: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `json` whenever the prompt contains `marker`.
    pub fn on(mut self, marker: &str, json: impl Into<String>) -> Self {
        self.responses.push((marker.to_string(), json.into()));
        self
    }

    /// Fail the next `times` calls whose prompt contains `marker`, then fall
    /// through to any `.on()` response.
    pub fn fail_times(self, marker: &str, times: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((marker.to_string(), times));
        self
    }

    /// Every call whose prompt contains `marker` fails.
    pub fn always_failing(self, marker: &str) -> Self {
        self.fail_times(marker, u32::MAX)
    }

    /// How many calls matched `marker` (including failed ones).
    pub fn call_count(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|prompt| prompt.contains(marker))
            .count()
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        _temperature: f32,
        _max_output_tokens: u32,
    ) -> Result<EngineResponse, EngineError> {
        let haystack = format!("{system_prompt}\n{user_message}");
        self.calls.lock().unwrap().push(haystack.clone());

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(entry) = failures
                .iter_mut()
                .find(|(marker, left)| *left > 0 && haystack.contains(marker.as_str()))
            {
                entry.1 = entry.1.saturating_sub(1);
                return Err(EngineError::Api {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: format!("ScriptedEngine: injected failure for '{}'", entry.0),
                });
            }
        }

        let matched = self
            .responses
            .iter()
            .find(|(marker, _)| haystack.contains(marker.as_str()));

        match matched {
            Some((_, json)) => Ok(EngineResponse {
                content: json.clone(),
                model: "scripted".to_string(),
                usage: TokenUsage::default(),
            }),
            None => {
                let head: String = haystack.chars().take(80).collect();
                Err(EngineError::Api {
                    status: reqwest::StatusCode::NOT_FOUND,
                    body: format!(
                        "ScriptedEngine: no response registered for prompt starting '{head}'"
                    ),
                })
            }
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// Search mocks
// ---------------------------------------------------------------------------

/// Always returns the same fixed result list, recording queries.
pub struct StaticSearch {
    results: Vec<SearchResult>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.clone())
    }
}

/// Returns no results, driving callers onto their fallback path.
pub struct EmptySearch;

#[async_trait]
impl SearchProvider for EmptySearch {
    async fn search(&self, _query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

/// Always errors, as a down search backend would.
pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str, _max_results: u32) -> Result<Vec<SearchResult>> {
        anyhow::bail!("FailingSearch: backend unavailable")
    }
}

/// A plausible article for seeding StaticSearch.
pub fn article(title: &str, url: &str, publisher: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
        publisher: publisher.to_string(),
        published_date: Some("2025-05-01".to_string()),
        content: format!("{title}. Details follow."),
    }
}
