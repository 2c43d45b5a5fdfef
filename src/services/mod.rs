//! External collaborator module
//!
//! This module contains the capability interfaces the timer core calls out
//! to: snapshot storage and the host window manager.

pub mod host_window;
pub mod storage;

// Re-export main types
pub use host_window::*;
pub use storage::*;
