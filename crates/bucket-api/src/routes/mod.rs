//! Route table

pub mod bucket;
pub mod health;

use axum::{http::StatusCode, http::Uri, routing::get, Json, Router};

use crate::dto::ApiError;
use crate::AppState;

/// `/health` at the root, protocol views under `/bucket`, JSON 404 for the rest
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/bucket", bucket::router())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("not_found", format!("No route for {}", uri.path()))),
    )
}
