//! Call-with-backoff for remote operations that can be rate limited

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Errors that can signal a rate limit (HTTP 429 or equivalent).
/// Only those failures are retried.
pub trait RateLimited {
    fn is_rate_limited(&self) -> bool;
}

/// Retry budget and initial backoff delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// First backoff delay in milliseconds; doubles after every retry
    pub initial_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay_ms: initial_delay.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Validate retry configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("Max retries too large (max 10)".to_string());
        }

        if self.initial_delay_ms > 60_000 {
            return Err("Initial delay too large (max 60000 ms)".to_string());
        }

        Ok(())
    }
}

/// Run `op`, retrying rate-limited failures with geometric backoff.
///
/// At most `max_retries + 1` attempts are made. Any failure that is not a
/// rate limit is returned immediately and unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, op: F) -> Result<T, E>
where
    E: RateLimited + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with_sleep(policy, op, tokio::time::sleep).await
}

/// Same as [`retry_with_backoff`] with an injectable sleep function.
pub async fn retry_with_sleep<T, E, F, Fut, S, SFut>(
    policy: RetryPolicy,
    mut op: F,
    mut sleep: S,
) -> Result<T, E>
where
    E: RateLimited + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut delay = policy.initial_delay();
    let mut retries_left = policy.max_retries;
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Request succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_rate_limited() && retries_left > 0 => {
                warn!(
                    "Rate limited (attempt {}), retrying in {}ms ({} retries left)",
                    attempt,
                    delay.as_millis(),
                    retries_left
                );
                sleep(delay).await;
                delay = delay.checked_mul(2).unwrap_or(Duration::MAX);
                retries_left -= 1;
                attempt += 1;
            }
            Err(e) => {
                if e.is_rate_limited() {
                    warn!("Rate limited after {} attempts, giving up: {}", attempt, e);
                }
                return Err(e);
            }
        }
    }
}
