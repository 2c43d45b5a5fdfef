//! User intents and outbound surface events

use serde::{Deserialize, Serialize};

use super::mode_state::{DisplayMode, WindowSize};

/// Discrete user intents the widget reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Intent {
    /// Play/pause button
    StartPause,
    Start,
    Pause,
    /// Shift the target by a signed number of milliseconds
    AdjustTime(i64),
    SetMode(DisplayMode),
    Reset,
    /// Any interaction with the timer card itself
    SurfaceTap,
    /// Launcher activation: bring the existing window forward, or open a
    /// new one at the current mode's size
    Open,
    /// Raise the existing window
    Focus,
    /// The surface is being torn down
    Close,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::StartPause => "start-pause",
            Intent::Start => "start",
            Intent::Pause => "pause",
            Intent::AdjustTime(_) => "adjust-time",
            Intent::SetMode(_) => "set-mode",
            Intent::Reset => "reset",
            Intent::SurfaceTap => "surface-tap",
            Intent::Open => "open",
            Intent::Focus => "focus",
            Intent::Close => "close",
        }
    }
}

/// Fire-and-forget notifications for the host window and any companion
/// process tracking the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceEvent {
    ModeChanged { mode: DisplayMode, size: WindowSize },
    Open { mode: DisplayMode, size: WindowSize },
    Focus,
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_decode_from_tagged_json() {
        let intent: Intent = serde_json::from_str(r#"{"type":"adjust-time","value":-300000}"#).unwrap();
        assert_eq!(intent, Intent::AdjustTime(-300_000));

        let intent: Intent = serde_json::from_str(r#"{"type":"set-mode","value":"compact"}"#).unwrap();
        assert_eq!(intent, Intent::SetMode(DisplayMode::Compact));

        let intent: Intent = serde_json::from_str(r#"{"type":"start-pause"}"#).unwrap();
        assert_eq!(intent.name(), "start-pause");
    }

    #[test]
    fn mode_event_carries_mode_field() {
        let event = SurfaceEvent::ModeChanged {
            mode: DisplayMode::Compact,
            size: WindowSize::new(260, 170),
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["type"], "mode-changed");
        assert_eq!(json["mode"], "compact");
        assert_eq!(json["size"]["width"], 260);
    }

    #[test]
    fn window_requests_are_tagged() {
        let intent: Intent = serde_json::from_str(r#"{"type":"open"}"#).unwrap();
        assert_eq!(intent, Intent::Open);
        assert_eq!(Intent::Focus.name(), "focus");

        let json = serde_json::to_value(SurfaceEvent::Open {
            mode: DisplayMode::Normal,
            size: WindowSize::new(340, 240),
        })
        .unwrap();
        assert_eq!(json["type"], "open");
        assert_eq!(json["size"]["height"], 240);
        assert_eq!(serde_json::to_value(SurfaceEvent::Focus).unwrap()["type"], "focus");
    }
}
