use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Fixed-window call quota
///
/// Holds up to `capacity` permits. Every tick of the window clock resets the
/// pool to full capacity, no matter how many were left, and wakes every
/// waiting caller; at most `capacity` of them get through per window.
///
/// The window clock is spawned on the first [`acquire`](Self::acquire) so an
/// idle client holds no timer. Share one gate between clients with an `Arc`
/// to make them respect a single quota.
pub struct RateGate {
    state: Arc<GateState>,
    period: Duration,
    ticker: OnceLock<JoinHandle<()>>,
}

struct GateState {
    capacity: u32,
    available: AtomicU32,
    refilled: Notify,
}

impl GateState {
    fn try_take(&self) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    fn refill(&self) {
        self.available.store(self.capacity, Ordering::Release);
        self.refilled.notify_waiters();
    }
}

impl RateGate {
    pub fn new(capacity: NonZeroU32, period: Duration) -> Self {
        let capacity = capacity.get();
        Self {
            state: Arc::new(GateState {
                capacity,
                available: AtomicU32::new(capacity),
                refilled: Notify::new(),
            }),
            period,
            ticker: OnceLock::new(),
        }
    }

    /// `capacity` calls per one-second window
    pub fn per_second(capacity: NonZeroU32) -> Self {
        Self::new(capacity, Duration::from_secs(1))
    }

    pub fn capacity(&self) -> u32 {
        self.state.capacity
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Permits left in the current window
    pub fn available(&self) -> u32 {
        self.state.available.load(Ordering::Acquire)
    }

    pub fn is_started(&self) -> bool {
        self.ticker.get().is_some()
    }

    /// Wait for a permit and consume it.
    pub async fn acquire(&self) {
        self.start();

        loop {
            // Register interest before checking so a refill between the
            // check and the await is not missed.
            let refilled = self.state.refilled.notified();
            if self.state.try_take() {
                trace!(available = self.available(), "rate permit acquired");
                return;
            }
            debug!(capacity = self.state.capacity, "rate quota exhausted, waiting for next window");
            refilled.await;
        }
    }

    /// Take a permit only if one is free right now.
    ///
    /// Must be called from within a Tokio runtime, like `acquire`.
    pub fn try_acquire(&self) -> bool {
        self.start();
        self.state.try_take()
    }

    fn start(&self) {
        self.ticker.get_or_init(|| {
            let state = Arc::clone(&self.state);
            let period = self.period;
            let first_tick = Instant::now() + period;
            debug!(?period, capacity = state.capacity, "starting rate window clock");
            tokio::spawn(async move {
                let mut ticks = interval_at(first_tick, period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticks.tick().await;
                    state.refill();
                }
            })
        });
    }
}

impl Drop for RateGate {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get() {
            ticker.abort();
        }
    }
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("capacity", &self.state.capacity)
            .field("available", &self.available())
            .field("period", &self.period)
            .field("started", &self.is_started())
            .finish()
    }
}
