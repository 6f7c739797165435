use axum::{extract::State, Json};
use chrono::Utc;
use tracing::warn;

use billing_shared::constants::SERVICE_NAME;

use crate::dto::{HealthResponse, StatsResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let total_events = match state.repo.get_stats().await {
        Ok(stats) => stats.usage_events,
        Err(e) => {
            warn!("Failed to read stats for health check: {}", e);
            0
        }
    };

    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        total_events,
    })
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state
        .repo
        .get_stats()
        .await
        .map_err(|e| {
            warn!("Failed to get stats: {}", e);
            ApiError::InternalError("Failed to get stats".to_string())
        })?;

    Ok(Json(StatsResponse {
        total_events: stats.usage_events,
        tenants: stats.tenants,
        cameras: stats.cameras,
        devices: stats.devices,
    }))
}
