//! GET /health — completion-endpoint reachability.

use std::sync::Arc;

use axum::{Json, extract::State};

use ai_llm_service::health_service::HealthStatus;

use crate::core::app_state::AppState;

/// Handler: GET /health
///
/// Always returns 200 with a status body; `ok: false` signals an unhealthy
/// completion endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.health.check(&state.completion_cfg).await)
}
