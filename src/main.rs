//! Meeting Timer - a floating meeting timer widget
//!
//! This is the main entry point for the meeting-timer daemon.

use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};

use meeting_timer::{
    api::{create_router, ApiState},
    clock::SystemClock,
    config::Config,
    services::{HeadlessWindow, JsonFileStore, MemoryStore, SnapshotStore},
    state::{WidgetState, DisplayMode},
    tasks::window_sync_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("meeting_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting meeting-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, surface={:?}, state_file={}",
          config.host, config.port, config.surface, config.state_file.display());

    let store: Arc<dyn SnapshotStore> = if config.memory_store {
        info!("Using in-memory snapshot store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(&config.state_file))
    };
    let host = Arc::new(HeadlessWindow::new(config.surface.size_for(DisplayMode::Normal)));

    // Create widget state from the last persisted snapshot
    let widget = Arc::new(WidgetState::hydrate(
        Arc::new(SystemClock),
        store,
        host.clone(),
        config.surface,
    ));

    // Start the window sync task before announcing the restored mode
    let mut sync = tokio::spawn(window_sync_task(widget.subscribe_events(), host));

    let status = widget.resume()?;
    info!("Timer restored: {} / {} ({})",
          status.display.formatted_elapsed,
          status.display.formatted_time_set,
          if status.running { "running" } else { "paused" });

    let app = create_router(Arc::new(ApiState {
        widget: Arc::clone(&widget),
        port: config.port,
        host: config.host.clone(),
    }));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control surface running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/toggle   - Start or pause");
    info!("  POST /timer/adjust   - Shift target by delta_ms");
    info!("  POST /timer/add-five - Add five minutes");
    info!("  POST /timer/sub-five - Remove five minutes");
    info!("  POST /timer/reset    - Reset to defaults");
    info!("  POST /mode           - Switch normal/compact");
    info!("  POST /surface/tap    - Tap the timer card");
    info!("  POST /open           - Focus or reopen the window");
    info!("  POST /focus          - Focus the window");
    info!("  POST /close          - Close the widget");
    info!("  GET  /status         - Current status");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Final persist and close signal
    widget.teardown()?;
    // dropping the last sender lets the sync task drain the close and exit
    drop(widget);
    match tokio::time::timeout(Duration::from_secs(2), &mut sync).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Window sync task ended abnormally: {}", e),
        Err(_) => {
            warn!("Window sync task still running, aborting");
            sync.abort();
        }
    }

    info!("Meeting timer shutdown complete");
    Ok(())
}
