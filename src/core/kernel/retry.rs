use crate::core::errors::ExchangeError;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

/// Retry schedule for transient failures
///
/// Each configured delay buys one more attempt, so `[0, 2, 5]` allows four
/// attempts in total. Only errors for which [`ExchangeError::is_transient`]
/// holds are retried; everything else is returned on first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_secs(delays: &[u64]) -> Self {
        Self::new(delays.iter().copied().map(Duration::from_secs).collect())
    }

    /// A single attempt, no retries
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn max_attempts(&self) -> u32 {
        self.delays.len() as u32 + 1
    }

    /// Run `operation` until it succeeds, fails terminally, or the delay
    /// sequence runs out. Running out yields
    /// [`ExchangeError::RetriesExhausted`] wrapping the last failure.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, ExchangeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExchangeError>>,
    {
        let mut attempts = 0u32;
        let schedule = self.delays.iter().copied().inspect(|delay| {
            info!("-- delaying for {:?}", delay);
        });

        let result = RetryIf::spawn(
            schedule,
            || {
                attempts += 1;
                debug!(attempt = attempts, "attempting request");
                operation()
            },
            |err: &ExchangeError| {
                debug!(error = %err, transient = err.is_transient(), "request attempt failed");
                err.is_transient()
            },
        )
        .await;

        match result {
            Err(err) if err.is_transient() => {
                warn!(attempts, error = %err, "retries exhausted");
                Err(ExchangeError::RetriesExhausted {
                    attempts,
                    source: Box::new(err),
                })
            }
            other => other,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_secs(&crate::core::config::DEFAULT_RETRY_DELAYS_SECS)
    }
}
