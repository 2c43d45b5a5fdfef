//! Meeting Timer - a floating meeting timer widget core
//!
//! This library provides the timer state machine, drift-free elapsed time
//! accounting, display mode negotiation with a host window, and snapshot
//! persistence that survives reloads and restarts.

pub mod api;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use display::{DisplayFrame, VisualState};
pub use error::WidgetError;
pub use state::{Intent, WidgetState};
pub use utils::signals::shutdown_signal;
