//! Clock sources
//!
//! Two clock domains are kept apart on purpose: the monotonic `Instant`
//! domain used for in-memory elapsed-time accounting, and the wall-clock
//! epoch domain used for anything written to storage. Only the persistence
//! bridge converts between them.

use std::{
    sync::Mutex,
    time::{Duration, Instant},
};
use chrono::Utc;

/// Source of time for the timer engine and the persistence bridge
pub trait Clock: Send + Sync {
    /// Monotonic instant, strictly non-decreasing within one process lifetime
    fn now(&self) -> Instant;

    /// Wall-clock time in milliseconds since the Unix epoch
    fn wall_ms(&self) -> i64;
}

/// Real clock backed by `Instant::now()` and `chrono::Utc::now()`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock; both domains advance together through [`ManualClock::advance`]
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin_ms: i64,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant and the given wall time
    pub fn new(wall_origin_ms: i64) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin_ms,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move both clock domains forward
    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    fn offset(&self) -> Duration {
        self.offset.lock().map(|o| *o).unwrap_or_default()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }

    fn wall_ms(&self) -> i64 {
        self.wall_origin_ms + self.offset().as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_both_domains_together() {
        let clock = ManualClock::new(1_700_000_000_000);
        let before = clock.now();

        clock.advance_ms(1_500);

        assert_eq!(clock.now() - before, Duration::from_millis(1_500));
        assert_eq!(clock.wall_ms(), 1_700_000_001_500);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(clock.wall_ms() > 0);
    }
}
