pub mod config;
pub mod error;
pub mod retry;
pub mod cache;
pub mod providers;
pub mod insights;

#[cfg(test)]
mod retry_tests;

pub use config::InsightConfig;
pub use error::{LLMError, Result};
pub use retry::{retry_with_backoff, retry_with_sleep, RateLimited, RetryPolicy};
pub use cache::InsightCache;
pub use providers::{GeminiProvider, InsightProvider};
pub use insights::InsightService;
