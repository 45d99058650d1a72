//! Fixed-delay retry for calls to the ResumeCraft server.
//!
//! Every failure is treated alike: there is no backoff, no jitter and no
//! retryable/non-retryable split. A request that already reached the server
//! and came back with a non-success status is simply tried again.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. 0 is treated as 1.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Runs `op` until it succeeds or the attempts run out, sleeping
/// `policy.delay` between attempts. Returns the last failure.
pub async fn fetch_with_retry<T, E, F, Fut>(mut op: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %err,
                    "retrying after failure"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
