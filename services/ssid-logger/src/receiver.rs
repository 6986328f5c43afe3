//! Reference receiver: logs every SSID event it is sent

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::event::format_timestamp;

/// Receiver application state
#[derive(Clone)]
pub struct ReceiverState {
    started_at: Arc<Instant>,
}

impl Default for ReceiverState {
    fn default() -> Self {
        Self {
            started_at: Arc::new(Instant::now()),
        }
    }
}

/// Build the receiver axum router
pub fn build_router() -> Router {
    Router::new()
        .route("/log", post(log_handler))
        .route("/health", get(health_handler))
        .with_state(ReceiverState::default())
}

async fn log_handler(Json(body): Json<Value>) -> impl IntoResponse {
    let pretty = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    tracing::info!("SSID change received:\n{}", pretty);

    Json(json!({
        "status": "success",
        "timestamp": format_timestamp(Utc::now()),
    }))
}

async fn health_handler(State(state): State<ReceiverState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}
