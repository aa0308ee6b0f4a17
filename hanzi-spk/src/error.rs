//! Error types for hanzi-spk

use crate::decoder::DecodeError;
use hanzi_core::Error as CoreError;
use hanzi_llm::RateLimited;
use thiserror::Error;

/// Speech synthesis and playback errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Synthesizer error: {0}")]
    Synthesizer(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RateLimited for SpeechError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, SpeechError::RateLimit)
    }
}

impl From<SpeechError> for CoreError {
    fn from(err: SpeechError) -> Self {
        CoreError::Speech(err.to_string())
    }
}
