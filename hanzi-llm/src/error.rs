use crate::retry::RateLimited;
use hanzi_core::Error as CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Response does not match schema: {0}")]
    Schema(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    AuthenticationFailed,
}

impl RateLimited for LLMError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, LLMError::RateLimit)
    }
}

impl From<LLMError> for CoreError {
    fn from(err: LLMError) -> Self {
        CoreError::Insight(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;
