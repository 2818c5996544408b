//! Health HTTP Routes

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::errors::ApiResult;
use super::item_routes::ItemsState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub items: usize,
    pub open_sessions: usize,
}

/// Health check route at `/health`
pub fn health_routes(state: Arc<ItemsState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<ItemsState>>) -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        items: state.store.item_count()?,
        open_sessions: state.store.open_sessions(),
    }))
}
