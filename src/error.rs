//! Error taxonomy for the timer widget
//!
//! Storage, host window and snapshot failures are all recoverable: callers
//! log them and fall back to a safe default. Only a poisoned state lock is
//! ever returned out of an intent dispatch.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The storage collaborator is absent or a read/write failed.
    StorageUnavailable(String),

    /// A resize/focus/close request could not be delivered to the host
    /// window (window closed, platform unsupported).
    HostAdapterUnavailable(String),

    /// A stored record violated the `running <=> startInstant` invariant
    /// or could not be decoded.
    CorruptSnapshot(String),

    /// A state mutex was poisoned by a panicking holder.
    StatePoisoned(&'static str),
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::StorageUnavailable(e) => write!(f, "storage unavailable: {e}"),
            WidgetError::HostAdapterUnavailable(e) => write!(f, "host window unavailable: {e}"),
            WidgetError::CorruptSnapshot(e) => write!(f, "corrupt snapshot: {e}"),
            WidgetError::StatePoisoned(what) => write!(f, "failed to lock {what} state"),
        }
    }
}

impl std::error::Error for WidgetError {}
