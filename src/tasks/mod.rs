//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP control
//! surface: the display refresh cadence and the host window sync.

pub mod presentation_loop;
pub mod window_sync;

// Re-export main types
pub use presentation_loop::{PresentationLoop, TICK_INTERVAL};
pub use window_sync::window_sync_task;
