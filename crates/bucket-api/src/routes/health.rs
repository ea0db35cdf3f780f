//! Health check endpoint

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - API version, network and whether the protocol object is readable
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let check = state.client().check_protocol_object().await;
    if let Err(e) = &check {
        tracing::warn!(error = %e, "Health check: protocol object unavailable");
    }
    Json(HealthResponse::new(state.network(), check))
}
