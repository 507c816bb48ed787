pub mod claude;
pub mod util;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use util::strip_code_fences;

// =============================================================================
// Errors
// =============================================================================

/// Failures from a reasoning-engine call.
///
/// Transport and API errors are recoverable (callers retry them);
/// a malformed response is a validation failure for that call.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("engine returned no text content")]
    EmptyContent,

    #[error("engine response is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

// =============================================================================
// Response
// =============================================================================

/// What a completed engine call yields: the raw text (expected to be a JSON
/// object, possibly fenced), the model that produced it, and token usage.
#[derive(Debug, Clone)]
pub struct EngineResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl EngineResponse {
    /// Parse the content as a JSON value, stripping markdown fences first.
    pub fn parse_json(&self) -> Result<serde_json::Value, EngineError> {
        let text = strip_code_fences(&self.content);
        Ok(serde_json::from_str(text)?)
    }
}

// =============================================================================
// ReasoningEngine trait
// =============================================================================

/// The reasoning-engine seam: given a system prompt and a user message,
/// return a structured JSON assessment. Implementations are expected to have
/// non-trivial latency and a nonzero failure rate; callers own retry policy.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<EngineResponse, EngineError>;

    /// Name used in logs and stored run records.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content: &str) -> EngineResponse {
        EngineResponse {
            content: content.to_string(),
            model: "test-model".to_string(),
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn parse_json_handles_fenced_content() {
        let value = response("```json\n{\"verdict\": \"True\"}\n```")
            .parse_json()
            .unwrap();
        assert_eq!(value["verdict"], "True");
    }

    #[test]
    fn parse_json_handles_bare_object() {
        let value = response("{\"score\": 42}").parse_json().unwrap();
        assert_eq!(value["score"], 42);
    }

    #[test]
    fn parse_json_rejects_prose() {
        let err = response("I cannot answer that.").parse_json().unwrap_err();
        assert!(matches!(err, EngineError::MalformedJson(_)));
    }
}
