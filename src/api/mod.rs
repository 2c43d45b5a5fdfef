//! HTTP API module
//!
//! This module contains the local control surface: one endpoint per user
//! intent plus status and health.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::WidgetState;
use handlers::*;

/// Shared handler state
pub struct ApiState {
    pub widget: Arc<WidgetState>,
    pub port: u16,
    pub host: String,
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/adjust", post(adjust_handler))
        .route("/timer/add-five", post(add_five_handler))
        .route("/timer/sub-five", post(sub_five_handler))
        .route("/mode", post(mode_handler))
        .route("/surface/tap", post(tap_handler))
        .route("/intent", post(intent_handler))
        .route("/open", post(open_handler))
        .route("/focus", post(focus_handler))
        .route("/close", post(close_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
