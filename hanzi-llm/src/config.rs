use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_INSIGHT_MODEL: &str = "gemini-2.5-flash";

/// Insight generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Generative model used for structured insight requests
    pub model: String,

    /// API base URL (without trailing slash)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Backoff for rate-limited requests
    pub retry: RetryPolicy,

    /// Sampling temperature for the structured request
    pub temperature: f32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_INSIGHT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
            temperature: 0.2,
        }
    }
}

impl InsightConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("Insight model cannot be empty".to_string());
        }

        if self.model.len() > 256 || self.model.chars().any(|c| c.is_control()) {
            return Err("Insight model name is invalid".to_string());
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err("Insight base URL must be an http(s) URL".to_string());
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err("Insight timeout must be between 1 and 300 seconds".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 2.0".to_string());
        }

        self.retry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_config_default() {
        let config = InsightConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_insight_config_rejects_bad_url() {
        let mut config = InsightConfig::default();
        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_insight_config_rejects_zero_timeout() {
        let mut config = InsightConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
