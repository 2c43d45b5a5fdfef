//! Display mode structure and the mode controller

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The two presentation states of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    #[serde(alias = "medium")]
    Normal,
    #[serde(alias = "small")]
    Compact,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Normal => "normal",
            DisplayMode::Compact => "compact",
        }
    }
}

/// Which kind of host surface the widget lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Extension popup window
    #[default]
    Popup,
    /// Same-page Picture-in-Picture overlay
    Pip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SurfaceKind {
    /// Static mode -> size mapping for this surface
    pub fn size_for(&self, mode: DisplayMode) -> WindowSize {
        match (self, mode) {
            (SurfaceKind::Popup, DisplayMode::Normal) => WindowSize::new(360, 280),
            (SurfaceKind::Popup, DisplayMode::Compact) => WindowSize::new(260, 170),
            (SurfaceKind::Pip, DisplayMode::Normal) => WindowSize::new(340, 240),
            (SurfaceKind::Pip, DisplayMode::Compact) => WindowSize::new(260, 150),
        }
    }
}

/// A mode transition that the host window and any companion must hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub mode: DisplayMode,
    pub size: WindowSize,
}

/// Owns the current display mode. Free two-state toggle; transition policy
/// lives with the callers.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: DisplayMode,
    surface: SurfaceKind,
}

impl ModeController {
    pub fn new(surface: SurfaceKind, mode: DisplayMode) -> Self {
        Self { mode, surface }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn surface(&self) -> SurfaceKind {
        self.surface
    }

    pub fn desired_size(&self) -> WindowSize {
        self.surface.size_for(self.mode)
    }

    /// Switch mode. Returns `None` when the mode is unchanged.
    pub fn set_mode(&mut self, mode: DisplayMode) -> Option<ModeChange> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        Some(ModeChange {
            mode,
            size: self.desired_size(),
        })
    }
}
