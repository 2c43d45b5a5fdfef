//! Window sync background task
//!
//! Plays the companion role for the host window: listens to surface events
//! and applies the requested geometry. Host failures never reach the timer.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{services::HostWindow, state::SurfaceEvent};

/// Drive `host` from surface events until the channel shuts down. A closed
/// window stays reachable through a later open request.
pub async fn window_sync_task(
    mut events: broadcast::Receiver<SurfaceEvent>,
    host: Arc<dyn HostWindow>,
) {
    info!("Starting window sync task");

    loop {
        match events.recv().await {
            Ok(SurfaceEvent::ModeChanged { mode, size }) => {
                debug!("Resizing window for {} mode", mode.as_str());
                if let Err(e) = host.resize(size) {
                    warn!("Resize request dropped: {}", e);
                }
            }
            Ok(SurfaceEvent::Open { mode, size }) => {
                // an existing window only needs raising
                if let Err(e) = host.focus() {
                    debug!("No window to focus ({}), opening in {} mode", e, mode.as_str());
                    if let Err(e) = host.open(size) {
                        warn!("Open request dropped: {}", e);
                    }
                }
            }
            Ok(SurfaceEvent::Focus) => {
                if let Err(e) = host.focus() {
                    warn!("Focus request dropped: {}", e);
                }
            }
            Ok(SurfaceEvent::Close) => {
                if let Err(e) = host.close() {
                    warn!("Close request dropped: {}", e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Window sync lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Surface event channel closed");
                break;
            }
        }
    }

    info!("Window sync task finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::HeadlessWindow,
        state::{DisplayMode, SurfaceKind, WindowSize},
    };

    #[tokio::test]
    async fn applies_mode_sizes_then_closes() {
        let host = Arc::new(HeadlessWindow::new(WindowSize::new(360, 280)));
        let (tx, rx) = broadcast::channel(16);
        let task = tokio::spawn(window_sync_task(rx, host.clone()));

        tx.send(SurfaceEvent::ModeChanged {
            mode: DisplayMode::Compact,
            size: SurfaceKind::Pip.size_for(DisplayMode::Compact),
        })
        .unwrap();
        tx.send(SurfaceEvent::Close).unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(!host.is_open());
    }

    #[tokio::test]
    async fn open_reopens_a_closed_window_at_mode_size() {
        let host = Arc::new(HeadlessWindow::new(WindowSize::new(360, 280)));
        let (tx, rx) = broadcast::channel(16);
        let task = tokio::spawn(window_sync_task(rx, host.clone()));

        let compact = SurfaceKind::Popup.size_for(DisplayMode::Compact);
        tx.send(SurfaceEvent::Close).unwrap();
        tx.send(SurfaceEvent::Focus).unwrap();
        tx.send(SurfaceEvent::Open {
            mode: DisplayMode::Compact,
            size: compact,
        })
        .unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(host.is_open());
        assert!(host.is_focused());
        assert_eq!(host.current_size().unwrap(), compact);
    }

    #[tokio::test]
    async fn open_on_a_live_window_only_focuses() {
        let host = Arc::new(HeadlessWindow::new(WindowSize::new(360, 280)));
        let (tx, rx) = broadcast::channel(16);
        let task = tokio::spawn(window_sync_task(rx, host.clone()));

        tx.send(SurfaceEvent::Open {
            mode: DisplayMode::Compact,
            size: WindowSize::new(260, 170),
        })
        .unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(host.is_focused());
        assert_eq!(host.current_size().unwrap(), WindowSize::new(360, 280));
    }

    #[tokio::test]
    async fn resize_failure_does_not_stop_the_task() {
        let host = Arc::new(HeadlessWindow::new(WindowSize::new(360, 280)));
        host.close().unwrap();

        let (tx, rx) = broadcast::channel(16);
        let task = tokio::spawn(window_sync_task(rx, host.clone()));

        tx.send(SurfaceEvent::ModeChanged {
            mode: DisplayMode::Normal,
            size: WindowSize::new(360, 280),
        })
        .unwrap();
        drop(tx);

        task.await.unwrap();
    }
}
