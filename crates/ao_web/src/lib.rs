use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use ao_core::Result;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/optimize", get(handlers::optimize))
        .route("/api/optimize/batch", get(handlers::optimize_batch))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("🌍 Optimizer API listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::AppState;
    pub use ao_core::{OptimizationResult, Result};
}
