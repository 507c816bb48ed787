mod client;
pub(crate) mod types;

use async_trait::async_trait;

use client::ClaudeClient;
use types::{ChatRequest, WireMessage};

use crate::{EngineError, EngineResponse, ReasoningEngine, TokenUsage};

/// Every prompt sent through this engine expects a JSON object back.
const JSON_ONLY_SUFFIX: &str = "\n\nAlways respond with valid JSON only.";

// =============================================================================
// Claude-backed engine
// =============================================================================

#[derive(Clone)]
pub struct ClaudeEngine {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl ClaudeEngine {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> ClaudeClient {
        let client = ClaudeClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }
}

#[async_trait]
impl ReasoningEngine for ClaudeEngine {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<EngineResponse, EngineError> {
        let request = ChatRequest::new(&self.model)
            .system(format!("{system_prompt}{JSON_ONLY_SUFFIX}"))
            .message(WireMessage::user(user_message))
            .temperature(temperature)
            .max_tokens(max_output_tokens);

        let response = self.client().chat(&request).await?;
        let content = response.text().ok_or(EngineError::EmptyContent)?;

        Ok(EngineResponse {
            content,
            model: response.model,
            usage: response.usage.unwrap_or(TokenUsage::default()),
        })
    }

    fn provider_name(&self) -> &str {
        "claude"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_new() {
        let engine = ClaudeEngine::new("sk-ant-test", "claude-haiku-4-5-20251001");
        assert_eq!(engine.model(), "claude-haiku-4-5-20251001");
        assert_eq!(engine.provider_name(), "claude");
    }

    #[test]
    fn test_engine_with_base_url() {
        let engine = ClaudeEngine::new("sk-ant-test", "claude-haiku-4-5-20251001")
            .with_base_url("https://custom.api.com");
        assert_eq!(engine.base_url, Some("https://custom.api.com".to_string()));
    }
}
