//! State management module
//!
//! This module contains the timer state machine, the display mode
//! controller, the persistence bridge and the widget that owns them.

pub mod app_state;
pub mod intent;
pub mod mode_state;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use app_state::{TimerStatus, WidgetState};
pub use intent::{Intent, SurfaceEvent};
pub use mode_state::{DisplayMode, ModeChange, ModeController, SurfaceKind, WindowSize};
pub use snapshot::{hydrate, persist, PersistedSnapshot, STORAGE_KEY};
pub use timer_state::{TimerEngine, TimerState, ADJUST_STEP_MS, DEFAULT_TARGET_MS, MIN_TARGET_MS};
