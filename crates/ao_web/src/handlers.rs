use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OptimizeParams {
    pub article_id: Option<u64>,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub async fn optimize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OptimizeParams>,
) -> impl IntoResponse {
    match state.orchestrator.run_one(params.article_id).await {
        Ok(result) => (StatusCode::OK, Json(json!(result))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": e.to_string()})),
        ),
    }
}

pub async fn optimize_batch(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.run_batch(None).await {
        Ok(results) => (StatusCode::OK, Json(json!(results))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": e.to_string()})),
        ),
    }
}
