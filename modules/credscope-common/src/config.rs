use std::env;

/// Default reasoning-engine model when ENGINE_MODEL is unset.
pub const DEFAULT_ENGINE_MODEL: &str = "claude-haiku-4-5-20251001";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Reasoning engine
    pub anthropic_api_key: String,
    pub engine_model: String,

    // Evidence search; empty key means the mock fallback pool is used
    pub tavily_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            engine_model: env::var("ENGINE_MODEL")
                .unwrap_or_else(|_| DEFAULT_ENGINE_MODEL.to_string()),
            tavily_api_key: env::var("TAVILY_API_KEY").unwrap_or_default(),
        }
    }

    pub fn search_enabled(&self) -> bool {
        !self.tavily_api_key.is_empty()
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
