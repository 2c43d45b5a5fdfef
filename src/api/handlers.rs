//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::{Intent, ADJUST_STEP_MS};
use super::{
    responses::{AdjustRequest, ApiResponse, HealthResponse, ModeRequest, StatusResponse},
    ApiState,
};

/// Dispatch one intent and wrap the resulting status
fn run_intent(state: &ApiState, intent: Intent, message: &str) -> Result<Json<ApiResponse>, StatusCode> {
    match state.widget.dispatch(intent) {
        Ok(timer) => {
            info!("{} endpoint called", intent.name());
            Ok(Json(ApiResponse::new(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to apply {}: {}", intent.name(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/toggle - Play/pause button
pub async fn toggle_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::StartPause, "Timer toggled")
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::Start, "Timer started")
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::Pause, "Timer paused")
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::Reset, "Timer reset")
}

/// Handle POST /timer/adjust - Shift the target by an arbitrary delta
pub async fn adjust_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::AdjustTime(request.delta_ms), "Target adjusted")
}

/// Handle POST /timer/add-five
pub async fn add_five_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::AdjustTime(ADJUST_STEP_MS), "Added five minutes")
}

/// Handle POST /timer/sub-five
pub async fn sub_five_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::AdjustTime(-ADJUST_STEP_MS), "Removed five minutes")
}

/// Handle POST /mode
pub async fn mode_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let message = format!("Mode set to {}", request.mode.as_str());
    run_intent(&state, Intent::SetMode(request.mode), &message)
}

/// Handle POST /surface/tap - Interaction with the timer card
pub async fn tap_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::SurfaceTap, "Surface tapped")
}

/// Handle POST /intent - Raw intent dispatch
pub async fn intent_handler(
    State(state): State<Arc<ApiState>>,
    Json(intent): Json<Intent>,
) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, intent, "Intent applied")
}

/// Handle POST /open - Launcher activation
pub async fn open_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::Open, "Window open requested")
}

/// Handle POST /focus - Raise the window
pub async fn focus_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::Focus, "Window focus requested")
}

/// Handle POST /close - Teardown intent
pub async fn close_handler(State(state): State<Arc<ApiState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_intent(&state, Intent::Close, "Widget closed")
}

/// Handle GET /status - Return current widget status
pub async fn status_handler(State(state): State<Arc<ApiState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let widget = &state.widget;

    let timer = widget.status().map_err(|e| {
        error!("Failed to get timer status: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let surface = widget.surface().map_err(|e| {
        error!("Failed to get surface: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let (last_action, last_action_time) = widget.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        surface,
        window_size: widget.window_size(),
        ticking: widget.is_ticking(),
        uptime: widget.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
