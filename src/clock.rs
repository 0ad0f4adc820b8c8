//! Time source used by the poll loop
//!
//! The loop never calls `chrono` or `tokio::time` directly. It goes through a
//! [`Clock`], so tests can drive many iterations with [`ManualClock`] without
//! waiting for real time to pass.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Wall clock plus the one suspension point of the poll loop
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in seconds
    fn now(&self) -> i64;

    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real time: `chrono` for the timestamp, `tokio` for sleeping
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when slept on or advanced by hand
///
/// Every sleep returns immediately, moves the clock forward by the requested
/// duration and is recorded for later inspection.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock frozen at `start` (Unix seconds)
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Move the clock forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        self.now
            .fetch_add(duration.as_secs() as i64, Ordering::SeqCst);
    }

    /// Durations passed to [`Clock::sleep`] so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|sleeps| sleeps.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
