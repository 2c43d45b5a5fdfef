//! Timer state structure and the timer engine operating on it

use std::time::{Duration, Instant};

/// Default countdown length: 30 minutes
pub const DEFAULT_TARGET_MS: u64 = 30 * 60 * 1000;

/// Floor enforced on every adjustment: 1 minute
pub const MIN_TARGET_MS: u64 = 60 * 1000;

/// Step used by the +5 / -5 minute controls
pub const ADJUST_STEP_MS: i64 = 5 * 60 * 1000;

/// Raw timer state. `start_instant` is `Some` exactly when `running` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub target_duration_ms: u64,
    pub accumulated_ms: u64,
    pub running: bool,
    pub start_instant: Option<Instant>,
}

impl TimerState {
    /// Create a paused timer with the default target
    pub fn new() -> Self {
        Self {
            target_duration_ms: DEFAULT_TARGET_MS,
            accumulated_ms: 0,
            running: false,
            start_instant: None,
        }
    }

    /// Create a paused timer with banked time
    pub fn paused(target_duration_ms: u64, accumulated_ms: u64) -> Self {
        Self {
            target_duration_ms: target_duration_ms.max(MIN_TARGET_MS),
            accumulated_ms,
            running: false,
            start_instant: None,
        }
    }

    /// Create a running timer that started counting at `start`
    pub fn running(target_duration_ms: u64, accumulated_ms: u64, start: Instant) -> Self {
        Self {
            target_duration_ms: target_duration_ms.max(MIN_TARGET_MS),
            accumulated_ms,
            running: true,
            start_instant: Some(start),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the timer state machine. Every operation takes the current monotonic
/// instant explicitly so a caller samples the clock exactly once.
#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    state: TimerState,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: TimerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn target_duration_ms(&self) -> u64 {
        self.state.target_duration_ms
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Begin counting. Returns false when already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state.running {
            return false;
        }
        self.state.running = true;
        self.state.start_instant = Some(now);
        true
    }

    /// Bank elapsed time and stop counting. Returns false when not running.
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.accumulated_ms = self.elapsed(now);
        self.state.running = false;
        self.state.start_instant = None;
        true
    }

    /// Shift the target by `delta_ms`, saturating at the one-minute floor
    pub fn adjust(&mut self, delta_ms: i64) {
        let target = self.state.target_duration_ms as i128 + delta_ms as i128;
        self.state.target_duration_ms = target.clamp(MIN_TARGET_MS as i128, u64::MAX as i128) as u64;
    }

    pub fn reset(&mut self) {
        self.state = TimerState::new();
    }

    /// Total time spent running, in milliseconds
    pub fn elapsed(&self, now: Instant) -> u64 {
        match (self.state.running, self.state.start_instant) {
            (true, Some(start)) => {
                let running_ms = now.saturating_duration_since(start).as_millis() as u64;
                self.state.accumulated_ms.saturating_add(running_ms)
            }
            _ => self.state.accumulated_ms,
        }
    }

    pub fn ratio(&self, now: Instant) -> f64 {
        self.elapsed(now) as f64 / self.state.target_duration_ms as f64
    }

    /// Fold the whole milliseconds of the running span into
    /// `accumulated_ms` and move the span start forward by exactly that
    /// much, so the sub-millisecond remainder keeps counting. Elapsed time is
    /// unchanged by this call.
    pub(crate) fn rebase(&mut self, now: Instant) {
        let Some(start) = self.state.start_instant.filter(|_| self.state.running) else {
            return;
        };
        let banked_ms = now.saturating_duration_since(start).as_millis() as u64;
        self.state.accumulated_ms = self.state.accumulated_ms.saturating_add(banked_ms);
        self.state.start_instant = Some(start + Duration::from_millis(banked_ms));
    }
}
