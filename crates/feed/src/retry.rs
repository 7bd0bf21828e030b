//! Fixed-interval retry for persistence

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use common::Result;

/// Retry policy: `max_retries` further attempts after the first, with a
/// fixed sleep between attempts. Total attempts = `max_retries + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn fixed(interval: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            interval,
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO, 0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `op` until it succeeds or attempts are exhausted.
    ///
    /// `op` receives the 1-based attempt number. Returns the final result
    /// together with the number of attempts made. Every failure is retried;
    /// no sleep follows the last attempt.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> (Result<T>, u32)
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return (Ok(value), attempt),
                Err(err) if attempt < max_attempts => {
                    warn!(
                        op = label,
                        attempt,
                        max_attempts,
                        retryable = err.is_retryable(),
                        error = %err,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(self.interval).await;
                    attempt += 1;
                }
                Err(err) => return (Err(err), attempt),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(1), 3)
    }
}
