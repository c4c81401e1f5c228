use anyhow::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How often and how far apart a failed request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry attempts after the first run
    pub retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Runs once, never retries.
    pub fn none() -> Self {
        RetryPolicy {
            retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Runs `operation` until it succeeds or the retries are used up.
    ///
    /// Returns the error of the last attempt.
    pub async fn run<F, Fut, T, E>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut attempt = 1;
        loop {
            match operation().await.map_err(Error::from) {
                Ok(val) => return Ok(val),
                Err(err) if attempt > self.retries => {
                    warn!(what, attempts = attempt, "Giving up: {}", err);
                    return Err(err);
                }
                Err(err) => {
                    debug!(
                        "{}: attempt {}/{} failed: {}. Retrying...",
                        what, attempt, self.retries, err
                    );
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
