//! Display frame rendering: MM:SS formatting and threshold visual state

use serde::{Deserialize, Serialize};

pub const RUNNING_ICON: &str = "⏸️";
pub const PAUSED_ICON: &str = "▶️";

/// Border state of the timer card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    #[default]
    Normal,
    Warning,
    Alert,
}

impl VisualState {
    /// Classify elapsed time against the target. Integer comparison keeps
    /// the 90% and 100% boundaries exact.
    pub fn classify(elapsed_ms: u64, target_ms: u64) -> Self {
        let elapsed = elapsed_ms as u128;
        let target = target_ms as u128;
        if elapsed >= target {
            VisualState::Alert
        } else if elapsed * 10 >= target * 9 {
            VisualState::Warning
        } else {
            VisualState::Normal
        }
    }
}

/// What the display sink receives on every tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub formatted_time_set: String,
    pub formatted_elapsed: String,
    pub running_icon: String,
    pub toggle_title: String,
    pub visual_state: VisualState,
}

impl DisplayFrame {
    pub fn render(elapsed_ms: u64, target_ms: u64, running: bool) -> Self {
        Self {
            formatted_time_set: format_duration(target_ms),
            formatted_elapsed: format_duration(elapsed_ms),
            running_icon: if running { RUNNING_ICON } else { PAUSED_ICON }.to_string(),
            toggle_title: if running { "Pause timer" } else { "Start timer" }.to_string(),
            visual_state: VisualState::classify(elapsed_ms, target_ms),
        }
    }
}

/// Format milliseconds as `MM:SS`; minutes are not capped at 59
pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(999), "00:00");
        assert_eq!(format_duration(61_000), "01:01");
        assert_eq!(format_duration(1_800_000), "30:00");
        assert_eq!(format_duration(1_820_000), "30:20");
        assert_eq!(format_duration(6_000_000), "100:00");
    }

    #[test]
    fn thresholds_switch_exactly_at_90_and_100_percent() {
        let target = 1_800_000;
        assert_eq!(VisualState::classify(1_619_999, target), VisualState::Normal);
        assert_eq!(VisualState::classify(1_620_000, target), VisualState::Warning);
        assert_eq!(VisualState::classify(1_799_999, target), VisualState::Warning);
        assert_eq!(VisualState::classify(1_800_000, target), VisualState::Alert);

        // awkward target where 90% is not a whole millisecond
        assert_eq!(VisualState::classify(54_000, 60_001), VisualState::Normal);
        assert_eq!(VisualState::classify(54_001, 60_001), VisualState::Warning);
    }

    #[test]
    fn no_state_is_skipped_while_elapsed_grows() {
        let target = 60_000;
        let mut seen = Vec::new();
        for elapsed in (0..=70_000).step_by(200) {
            let state = VisualState::classify(elapsed, target);
            if seen.last() != Some(&state) {
                seen.push(state);
            }
        }
        assert_eq!(seen, vec![VisualState::Normal, VisualState::Warning, VisualState::Alert]);
    }

    #[test]
    fn frame_reflects_running_flag() {
        let frame = DisplayFrame::render(1_620_000, 1_800_000, false);
        assert_eq!(frame.formatted_time_set, "30:00");
        assert_eq!(frame.formatted_elapsed, "27:00");
        assert_eq!(frame.running_icon, PAUSED_ICON);
        assert_eq!(frame.visual_state, VisualState::Warning);

        let frame = DisplayFrame::render(0, 1_800_000, true);
        assert_eq!(frame.running_icon, RUNNING_ICON);
        assert_eq!(frame.toggle_title, "Pause timer");
    }
}
