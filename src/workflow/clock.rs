//! Monotonic time sources for the workflow simulation.
//!
//! The controller and reveal animation never read wall-clock time directly;
//! they ask a [`Clock`] for the time elapsed since its origin. This lets tests
//! drive every timer deterministically with [`ManualClock`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Trait abstracting the time source for testability
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Real clock backed by `tokio::time::Instant`.
///
/// Under `#[tokio::test(start_paused = true)]` this follows tokio's virtual
/// time, so async drivers can be tested without real delays.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for tests.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += by;
    }

    /// Move time forward by a number of milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
