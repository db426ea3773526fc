use crate::core::errors::ExchangeError;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Strictly increasing nonce source for signed requests
///
/// The counter lives behind an async mutex. Callers that must keep requests
/// in nonce order on the wire hold a [`NonceGuard`] from the moment the nonce
/// is issued until the request has been handed to the transport.
#[derive(Debug)]
pub struct NonceSequencer {
    current: Mutex<u64>,
}

impl NonceSequencer {
    pub fn new(start: u64) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Seed from the wall clock, in whole seconds since the epoch.
    pub fn from_clock() -> Self {
        Self::new(Utc::now().timestamp().max(0) as u64)
    }

    /// Take the sequencing lock.
    pub async fn lock(&self) -> NonceGuard<'_> {
        NonceGuard {
            current: self.current.lock().await,
        }
    }

    pub async fn next(&self) -> Result<u64, ExchangeError> {
        self.lock().await.next()
    }

    /// Raise the counter to at least `minimum`.
    pub async fn force_to(&self, minimum: u64) {
        self.lock().await.force_to(minimum);
    }

    /// Last value handed out (or the starting value)
    pub async fn current(&self) -> u64 {
        *self.current.lock().await
    }
}

impl Default for NonceSequencer {
    fn default() -> Self {
        Self::from_clock()
    }
}

/// Exclusive access to the nonce counter
///
/// Nobody else can issue a nonce while this guard is alive.
pub struct NonceGuard<'a> {
    current: MutexGuard<'a, u64>,
}

impl NonceGuard<'_> {
    /// Issue the next nonce. Fails once the counter has reached `u64::MAX`
    /// rather than wrapping around.
    pub fn next(&mut self) -> Result<u64, ExchangeError> {
        let next = self
            .current
            .checked_add(1)
            .ok_or(ExchangeError::NonceExhausted {
                current: *self.current,
            })?;
        *self.current = next;
        Ok(next)
    }

    pub fn force_to(&mut self, minimum: u64) {
        if minimum > *self.current {
            debug!(from = *self.current, to = minimum, "resynchronising nonce");
            *self.current = minimum;
        }
    }

    pub fn current(&self) -> u64 {
        *self.current
    }
}
