//! Widget state: the per-instance owner of the timer engine and mode
//! controller, and the intent dispatch table driving them

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    display::DisplayFrame,
    error::WidgetError,
    services::{HostWindow, SnapshotStore},
    tasks::PresentationLoop,
};
use super::{
    intent::{Intent, SurfaceEvent},
    mode_state::{DisplayMode, ModeController, SurfaceKind, WindowSize},
    snapshot::{self, PersistedSnapshot, STORAGE_KEY},
    timer_state::TimerEngine,
};

/// Point-in-time view of the widget, sampled from a single clock reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    pub running: bool,
    pub elapsed_ms: u64,
    pub target_duration_ms: u64,
    pub mode: DisplayMode,
    pub display: DisplayFrame,
}

/// Renders one display frame from the engine and pushes it to the sink
#[derive(Clone)]
struct FrameRenderer {
    engine: Arc<Mutex<TimerEngine>>,
    clock: Arc<dyn Clock>,
    sink: Arc<watch::Sender<DisplayFrame>>,
}

impl FrameRenderer {
    fn render(&self) {
        let frame = match self.engine.lock() {
            Ok(engine) => {
                let now = self.clock.now();
                DisplayFrame::render(engine.elapsed(now), engine.target_duration_ms(), engine.is_running())
            }
            Err(e) => {
                warn!("Failed to lock timer state for render: {}", e);
                return;
            }
        };

        if let Err(e) = self.sink.send(frame) {
            debug!("No display sink listening: {}", e);
        }
    }
}

/// One widget instance. Created per window open and never shared across
/// instances; the snapshot store is the only shared resource.
pub struct WidgetState {
    engine: Arc<Mutex<TimerEngine>>,
    modes: Arc<Mutex<ModeController>>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SnapshotStore>,
    host: Arc<dyn HostWindow>,
    presentation: PresentationLoop,
    renderer: FrameRenderer,
    /// Server metadata
    pub start_time: Instant,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Outbound mode-change / close notifications
    pub surface_tx: broadcast::Sender<SurfaceEvent>,
    /// Display sink
    pub display_tx: Arc<watch::Sender<DisplayFrame>>,
    /// Keep the receiver alive to prevent channel closure
    pub _display_rx: watch::Receiver<DisplayFrame>,
}

impl WidgetState {
    /// Build the widget from whatever the store holds. Storage failures
    /// degrade to defaults.
    pub fn hydrate(
        clock: Arc<dyn Clock>,
        store: Arc<dyn SnapshotStore>,
        host: Arc<dyn HostWindow>,
        surface: SurfaceKind,
    ) -> Self {
        let stored = match store.get(STORAGE_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Falling back to defaults: {}", e);
                None
            }
        };

        let (engine, modes) = snapshot::hydrate(stored, surface, clock.as_ref());
        info!(
            "Widget hydrated: running={}, target={}ms, mode={}",
            engine.is_running(),
            engine.target_duration_ms(),
            modes.mode().as_str()
        );

        let initial = DisplayFrame::render(
            engine.elapsed(clock.now()),
            engine.target_duration_ms(),
            engine.is_running(),
        );
        let (display_tx, display_rx) = watch::channel(initial);
        let (surface_tx, _) = broadcast::channel(100);

        let engine = Arc::new(Mutex::new(engine));
        let display_tx = Arc::new(display_tx);
        let renderer = FrameRenderer {
            engine: Arc::clone(&engine),
            clock: Arc::clone(&clock),
            sink: Arc::clone(&display_tx),
        };

        Self {
            engine,
            modes: Arc::new(Mutex::new(modes)),
            clock,
            store,
            host,
            presentation: PresentationLoop::new(),
            renderer,
            start_time: Instant::now(),
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            surface_tx,
            display_tx,
            _display_rx: display_rx,
        }
    }

    /// Bring a freshly hydrated widget to life: announce the current mode
    /// and resume ticking when the restored timer is running
    pub fn resume(&self) -> Result<TimerStatus, WidgetError> {
        let change = {
            let modes = self.lock_modes()?;
            SurfaceEvent::ModeChanged {
                mode: modes.mode(),
                size: modes.desired_size(),
            }
        };
        self.notify(change);
        self.sync_ticking()?;
        self.renderer.render();
        self.status()
    }

    /// Apply one intent, then persist, re-render and notify as needed
    pub fn dispatch(&self, intent: Intent) -> Result<TimerStatus, WidgetError> {
        debug!("Dispatching intent: {:?}", intent);

        let (mutated, mode_change, window_request) = {
            let mut engine = self.lock_engine()?;
            // sampled under the lock so intents apply in clock order
            let now = self.clock.now();
            match intent {
                Intent::StartPause => {
                    if engine.is_running() {
                        (engine.pause(now), None, None)
                    } else {
                        (engine.start(now), None, None)
                    }
                }
                Intent::Start => (engine.start(now), None, None),
                Intent::Pause => (engine.pause(now), None, None),
                Intent::AdjustTime(delta_ms) => {
                    engine.adjust(delta_ms);
                    (true, None, None)
                }
                Intent::Reset => {
                    engine.reset();
                    (true, None, None)
                }
                Intent::SetMode(mode) => {
                    let change = self.lock_modes()?.set_mode(mode);
                    (change.is_some(), change, None)
                }
                Intent::SurfaceTap => {
                    // compact expands on any tap; normal ignores taps
                    let mut modes = self.lock_modes()?;
                    let change = match modes.mode() {
                        DisplayMode::Compact => modes.set_mode(DisplayMode::Normal),
                        DisplayMode::Normal => None,
                    };
                    (change.is_some(), change, None)
                }
                Intent::Open => {
                    let modes = self.lock_modes()?;
                    let request = SurfaceEvent::Open {
                        mode: modes.mode(),
                        size: modes.desired_size(),
                    };
                    (false, None, Some(request))
                }
                Intent::Focus => (false, None, Some(SurfaceEvent::Focus)),
                Intent::Close => (true, None, Some(SurfaceEvent::Close)),
            }
        };

        if let Some(change) = mode_change {
            info!(
                "Mode changed to {} ({}x{})",
                change.mode.as_str(),
                change.size.width,
                change.size.height
            );
            self.notify(SurfaceEvent::ModeChanged {
                mode: change.mode,
                size: change.size,
            });
        }

        if intent == Intent::Close {
            self.presentation.stop_ticking();
        } else {
            self.sync_ticking()?;
        }

        if let Some(request) = window_request {
            self.notify(request);
        }

        if mutated {
            info!("Intent applied: {}", intent.name());
            self.persist_now()?;
            self.record_action(intent.name());
        }

        self.renderer.render();
        self.status()
    }

    /// Tear the widget down: final persist, stop ticking, emit close
    pub fn teardown(&self) -> Result<TimerStatus, WidgetError> {
        self.dispatch(Intent::Close)
    }

    /// Write the current snapshot. Store failures are logged and absorbed.
    pub fn persist_now(&self) -> Result<PersistedSnapshot, WidgetError> {
        let snapshot = {
            let mut engine = self.lock_engine()?;
            let modes = self.lock_modes()?;
            snapshot::persist(&mut engine, &modes, self.clock.as_ref())
        };

        if let Err(e) = self.store.set(STORAGE_KEY, &snapshot) {
            warn!("Snapshot not persisted: {}", e);
        }
        Ok(snapshot)
    }

    /// Current status from a single clock sample
    pub fn status(&self) -> Result<TimerStatus, WidgetError> {
        let engine = self.lock_engine()?;
        let mode = self.lock_modes()?.mode();
        let now = self.clock.now();
        let elapsed_ms = engine.elapsed(now);
        let target_duration_ms = engine.target_duration_ms();
        let running = engine.is_running();

        Ok(TimerStatus {
            running,
            elapsed_ms,
            target_duration_ms,
            mode,
            display: DisplayFrame::render(elapsed_ms, target_duration_ms, running),
        })
    }

    pub fn mode(&self) -> Result<DisplayMode, WidgetError> {
        Ok(self.lock_modes()?.mode())
    }

    pub fn surface(&self) -> Result<SurfaceKind, WidgetError> {
        Ok(self.lock_modes()?.surface())
    }

    pub fn is_ticking(&self) -> bool {
        self.presentation.is_ticking()
    }

    pub fn host(&self) -> Arc<dyn HostWindow> {
        Arc::clone(&self.host)
    }

    /// Best-effort window size; `None` once the window is gone
    pub fn window_size(&self) -> Option<WindowSize> {
        match self.host.current_size() {
            Ok(size) => Some(size),
            Err(e) => {
                debug!("Window size unavailable: {}", e);
                None
            }
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.surface_tx.subscribe()
    }

    pub fn subscribe_display(&self) -> watch::Receiver<DisplayFrame> {
        self.display_tx.subscribe()
    }

    /// Calculate service uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn sync_ticking(&self) -> Result<(), WidgetError> {
        if self.lock_engine()?.is_running() {
            let renderer = self.renderer.clone();
            self.presentation.start_ticking(move || renderer.render());
        } else {
            self.presentation.stop_ticking();
        }
        Ok(())
    }

    fn notify(&self, event: SurfaceEvent) {
        if let Err(e) = self.surface_tx.send(event) {
            debug!("Surface event dropped, no listeners: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, TimerEngine>, WidgetError> {
        self.engine.lock().map_err(|_| WidgetError::StatePoisoned("timer"))
    }

    fn lock_modes(&self) -> Result<MutexGuard<'_, ModeController>, WidgetError> {
        self.modes.lock().map_err(|_| WidgetError::StatePoisoned("mode"))
    }
}
