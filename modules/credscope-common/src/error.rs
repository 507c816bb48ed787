use thiserror::Error;

use reason_client::EngineError;

#[derive(Error, Debug)]
pub enum CredScopeError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
