//! Presentation loop background task
//!
//! Ticks at a fixed display cadence. The cadence only drives re-rendering;
//! elapsed time is always recomputed from clock instants.

use std::{sync::Mutex, time::Duration};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Display refresh cadence
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Cancellable periodic re-render trigger
#[derive(Debug, Default)]
pub struct PresentationLoop {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PresentationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke `on_tick` every [`TICK_INTERVAL`]. Returns false when already
    /// ticking or when no tokio runtime is available.
    pub fn start_ticking<F>(&self, mut on_tick: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        let mut handle = match self.handle.lock() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to lock presentation loop: {}", e);
                return false;
            }
        };

        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime available, presentation loop not started");
                return false;
            }
        };

        *handle = Some(runtime.spawn(async move {
            let mut ticker = interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_tick();
            }
        }));

        debug!("Presentation loop started");
        true
    }

    /// Cancel the cadence. Safe to call repeatedly; returns false when the
    /// loop was not running.
    pub fn stop_ticking(&self) -> bool {
        let taken = match self.handle.lock() {
            Ok(mut handle) => handle.take(),
            Err(e) => {
                warn!("Failed to lock presentation loop: {}", e);
                return false;
            }
        };

        match taken {
            Some(handle) => {
                handle.abort();
                debug!("Presentation loop stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for PresentationLoop {
    fn drop(&mut self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(handle) = handle.take() {
                handle.abort();
            }
        }
    }
}
