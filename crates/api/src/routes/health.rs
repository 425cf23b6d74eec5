use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the output directory is unusable.
    pub status: &'static str,
    pub version: &'static str,
    pub output_dir_ready: bool,
    /// RFC 3339 server time.
    pub timestamp: String,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let output_dir_ready = tokio::fs::metadata(state.store().root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    Json(HealthResponse {
        status: if output_dir_ready { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        output_dir_ready,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
