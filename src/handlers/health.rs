use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// GET /health - 200 when the store answers a ping, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let timestamp = Utc::now();
    let version = env!("CARGO_PKG_VERSION");

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthReport {
                status: "healthy",
                database: "connected",
                timestamp,
                version,
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport {
                    status: "unhealthy",
                    database: "disconnected",
                    timestamp,
                    version,
                }),
            )
        }
    }
}
