//! Persisted snapshot record and the hydrate/persist bridge
//!
//! In memory the running span is measured against the monotonic clock. The
//! stored `startInstant` is a wall-clock epoch value instead, because the
//! process that reads it back has a different monotonic origin. Every
//! persist folds the running span into `accumulatedMs` and restarts it at
//! the persist instant in both domains.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{clock::Clock, error::WidgetError};
use super::{
    mode_state::{DisplayMode, ModeController, SurfaceKind},
    timer_state::{TimerEngine, TimerState, DEFAULT_TARGET_MS},
};

/// Key the widget stores its snapshot under
pub const STORAGE_KEY: &str = "meetingTimerStateV1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSnapshot {
    #[serde(alias = "timeSetMs")]
    pub target_duration_ms: u64,
    #[serde(deserialize_with = "lenient_millis")]
    pub accumulated_ms: u64,
    pub running: bool,
    /// Wall-clock epoch milliseconds at the last persist while running
    #[serde(alias = "startTimestamp", deserialize_with = "lenient_epoch_ms")]
    pub start_instant: Option<i64>,
    pub mode: DisplayMode,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            target_duration_ms: DEFAULT_TARGET_MS,
            accumulated_ms: 0,
            running: false,
            start_instant: None,
            mode: DisplayMode::Normal,
        }
    }
}

/// Banked milliseconds; anything that is not a non-negative number reads as 0
fn lenient_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    })
}

/// Start instant; anything but an integer reads as absent so the
/// `running` invariant check can recover the rest of the record
fn lenient_epoch_ms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_i64())
}

impl PersistedSnapshot {
    /// Check the `running <=> startInstant` invariant
    pub fn validate(&self) -> Result<(), WidgetError> {
        match (self.running, self.start_instant) {
            (true, None) => Err(WidgetError::CorruptSnapshot(
                "running without a start instant".to_string(),
            )),
            (true, Some(start)) if start < 0 => Err(WidgetError::CorruptSnapshot(format!(
                "negative start instant {start}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Rebuild in-memory state from a stored snapshot, or defaults when absent.
/// Never starts ticking; callers check `is_running()` on the result.
pub fn hydrate(
    snapshot: Option<PersistedSnapshot>,
    surface: SurfaceKind,
    clock: &dyn Clock,
) -> (TimerEngine, ModeController) {
    let Some(snapshot) = snapshot else {
        debug!("No stored snapshot, starting from defaults");
        return (TimerEngine::new(), ModeController::new(surface, DisplayMode::Normal));
    };

    let modes = ModeController::new(surface, snapshot.mode);
    let target = snapshot.target_duration_ms;

    if let Err(e) = snapshot.validate() {
        warn!("Recovering from {}, restoring as paused", e);
        let state = TimerState::paused(target, snapshot.accumulated_ms);
        return (TimerEngine::from_state(state), modes);
    }

    let state = match (snapshot.running, snapshot.start_instant) {
        (true, Some(stored_start)) => {
            // Time that passed while no process was counting
            let gap_ms = clock.wall_ms().saturating_sub(stored_start).max(0) as u64;
            debug!("Resuming running timer, {}ms passed since last persist", gap_ms);
            TimerState::running(
                target,
                snapshot.accumulated_ms.saturating_add(gap_ms),
                clock.now(),
            )
        }
        _ => TimerState::paused(target, snapshot.accumulated_ms),
    };

    (TimerEngine::from_state(state), modes)
}

/// Capture the current state as a snapshot, re-basing a running timer to
/// the persist instant. Elapsed time is observed, never paused.
pub fn persist(
    engine: &mut TimerEngine,
    modes: &ModeController,
    clock: &dyn Clock,
) -> PersistedSnapshot {
    let now = clock.now();
    let wall_now = clock.wall_ms();

    engine.rebase(now);
    let state = engine.state();

    PersistedSnapshot {
        target_duration_ms: state.target_duration_ms,
        accumulated_ms: state.accumulated_ms,
        running: state.running,
        start_instant: state.running.then_some(wall_now),
        mode: modes.mode(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::state::timer_state::MIN_TARGET_MS;

    const WALL: i64 = 1_700_000_000_000;

    fn popup() -> SurfaceKind {
        SurfaceKind::Popup
    }

    #[test]
    fn absent_snapshot_hydrates_defaults() {
        let clock = ManualClock::new(WALL);
        let (engine, modes) = hydrate(None, popup(), &clock);
        assert_eq!(engine.state(), &TimerState::new());
        assert_eq!(modes.mode(), DisplayMode::Normal);
    }

    #[test]
    fn persist_then_hydrate_keeps_elapsed_while_running() {
        let clock = ManualClock::new(WALL);
        let mut engine = TimerEngine::new();
        let modes = ModeController::new(popup(), DisplayMode::Compact);

        engine.start(clock.now());
        clock.advance_ms(12_345);
        let before = engine.elapsed(clock.now());

        let snapshot = persist(&mut engine, &modes, &clock);
        assert!(engine.is_running());
        assert_eq!(snapshot.accumulated_ms, 12_345);
        assert_eq!(snapshot.start_instant, Some(WALL + 12_345));

        let (restored, restored_modes) = hydrate(Some(snapshot), popup(), &clock);
        assert!(restored.is_running());
        assert_eq!(restored.elapsed(clock.now()), before);
        assert_eq!(restored_modes.mode(), DisplayMode::Compact);
    }

    #[test]
    fn persist_then_hydrate_keeps_elapsed_while_paused() {
        let clock = ManualClock::new(WALL);
        let mut engine = TimerEngine::new();
        let modes = ModeController::default();

        engine.start(clock.now());
        clock.advance_ms(5_000);
        engine.pause(clock.now());

        let snapshot = persist(&mut engine, &modes, &clock);
        assert_eq!(snapshot.start_instant, None);

        clock.advance_ms(60_000);
        let (restored, _) = hydrate(Some(snapshot), popup(), &clock);
        assert!(!restored.is_running());
        assert_eq!(restored.elapsed(clock.now()), 5_000);
    }

    #[test]
    fn wall_time_between_processes_counts_as_running() {
        let clock = ManualClock::new(WALL);
        let mut engine = TimerEngine::new();
        engine.start(clock.now());
        clock.advance_ms(1_000);
        let snapshot = persist(&mut engine, &ModeController::default(), &clock);

        // a fresh process starts ten seconds later
        let later = ManualClock::new(WALL + 11_000);
        let (restored, _) = hydrate(Some(snapshot), popup(), &later);
        assert_eq!(restored.elapsed(later.now()), 11_000);
    }

    #[test]
    fn running_without_start_is_forced_paused() {
        let clock = ManualClock::new(WALL);
        let snapshot = PersistedSnapshot {
            accumulated_ms: 7_000,
            running: true,
            start_instant: None,
            ..PersistedSnapshot::default()
        };
        assert!(matches!(snapshot.validate(), Err(WidgetError::CorruptSnapshot(_))));

        let (engine, _) = hydrate(Some(snapshot), popup(), &clock);
        assert!(!engine.is_running());
        assert_eq!(engine.state().start_instant, None);
        assert_eq!(engine.elapsed(clock.now()), 7_000);
    }

    #[test]
    fn stale_start_from_the_future_adds_no_time() {
        let clock = ManualClock::new(WALL);
        let snapshot = PersistedSnapshot {
            accumulated_ms: 3_000,
            running: true,
            start_instant: Some(WALL + 50_000),
            ..PersistedSnapshot::default()
        };
        let (engine, _) = hydrate(Some(snapshot), popup(), &clock);
        assert!(engine.is_running());
        assert_eq!(engine.elapsed(clock.now()), 3_000);
    }

    #[test]
    fn target_below_floor_is_clamped() {
        let clock = ManualClock::new(WALL);
        let snapshot = PersistedSnapshot {
            target_duration_ms: 10,
            ..PersistedSnapshot::default()
        };
        let (engine, _) = hydrate(Some(snapshot), popup(), &clock);
        assert_eq!(engine.target_duration_ms(), MIN_TARGET_MS);
    }

    #[test]
    fn snapshot_json_uses_camel_case_and_reads_legacy_fields() {
        let snapshot = PersistedSnapshot {
            running: true,
            start_instant: Some(WALL),
            ..PersistedSnapshot::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["targetDurationMs"], 1_800_000);
        assert_eq!(json["startInstant"], WALL);
        assert_eq!(json["mode"], "normal");

        let legacy: PersistedSnapshot = serde_json::from_str(
            r#"{"timeSetMs":600000,"accumulatedMs":1000,"running":true,"startTimestamp":5,"mode":"small"}"#,
        )
        .unwrap();
        assert_eq!(legacy.target_duration_ms, 600_000);
        assert_eq!(legacy.start_instant, Some(5));
        assert_eq!(legacy.mode, DisplayMode::Compact);

        let partial: PersistedSnapshot = serde_json::from_str(r#"{"running":false}"#).unwrap();
        assert_eq!(partial, PersistedSnapshot::default());
    }

    #[test]
    fn mistyped_start_keeps_the_rest_of_the_record() {
        let snapshot: PersistedSnapshot = serde_json::from_str(
            r#"{"timeSetMs":600000,"accumulatedMs":5000,"running":true,"startTimestamp":"oops","mode":"small"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.start_instant, None);
        assert!(snapshot.running);

        let clock = ManualClock::new(WALL);
        let (engine, modes) = hydrate(Some(snapshot), popup(), &clock);
        assert!(!engine.is_running());
        assert_eq!(engine.elapsed(clock.now()), 5_000);
        assert_eq!(engine.target_duration_ms(), 600_000);
        assert_eq!(modes.mode(), DisplayMode::Compact);
    }

    #[test]
    fn mistyped_banked_time_reads_as_zero() {
        let snapshot: PersistedSnapshot = serde_json::from_str(
            r#"{"accumulatedMs":"lots","running":false,"startInstant":null,"mode":"compact"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.accumulated_ms, 0);
        assert_eq!(snapshot.mode, DisplayMode::Compact);

        let fractional: PersistedSnapshot =
            serde_json::from_str(r#"{"accumulatedMs":1234.7}"#).unwrap();
        assert_eq!(fractional.accumulated_ms, 1_234);
    }
}
