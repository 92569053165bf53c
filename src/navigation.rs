use std::time::Duration;

use tracing::{info, warn};

use crate::browser::PageHandle;
use crate::error::{BrowserError, NavigationError};

/// When a freshly navigated page counts as loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCondition {
    /// Load finished and no new network requests for a short quiet window.
    NetworkIdle,
    /// The HTML was parsed; scripts may still be hydrating the page.
    DomContentLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Pause after the given failed attempt (1-based): doubles from
    /// `initial_backoff`, never above `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }
}

/// Loads `url`, retrying with exponential backoff. Each attempt is bounded by
/// `timeout`; the last failure is returned once attempts run out.
pub async fn navigate(
    page: &dyn PageHandle,
    url: &str,
    ready: ReadyCondition,
    timeout: Duration,
    policy: &RetryPolicy,
) -> Result<(), NavigationError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        info!(url, attempt, "navigating");
        let outcome = match tokio::time::timeout(timeout, page.goto(url, ready)).await {
            Ok(result) => result,
            Err(_) => Err(BrowserError::Timeout {
                operation: "navigation",
                after: timeout,
            }),
        };

        match outcome {
            Ok(()) => return Ok(()),
            Err(source) if attempt >= max_attempts => {
                return Err(NavigationError {
                    url: url.to_string(),
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                let backoff = policy.backoff_for(attempt);
                warn!(url, attempt, ?backoff, "navigation failed: {e}");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
