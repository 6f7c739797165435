//! Endpoints called by edge devices

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use billing_core::services::{HeartbeatAck, LicenseResult, NewUsageEvent, UsageBatchResult};

use crate::dto::{
    EntitlementCheckRequest, EntitlementCheckResponse, HeartbeatRequest, LicenseValidationRequest,
    UsageBatchRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/v1/licenses/validate
pub async fn validate_license(
    State(state): State<AppState>,
    payload: Result<Json<LicenseValidationRequest>, JsonRejection>,
) -> ApiResult<Json<LicenseResult>> {
    let Json(req) = payload?;
    let result = state
        .licenses
        .resolve_license(&req.tenant_id, &req.camera_id, &req.device_id)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/entitlements/check
pub async fn check_entitlement(
    State(state): State<AppState>,
    payload: Result<Json<EntitlementCheckRequest>, JsonRejection>,
) -> ApiResult<Json<EntitlementCheckResponse>> {
    let Json(req) = payload?;
    let result = state
        .entitlements
        .check_entitlement(&req.tenant_id, &req.feature_category, &req.feature_name)
        .await?;
    Ok(Json(result.into()))
}

/// POST /api/v1/usage/batch
pub async fn report_usage(
    State(state): State<AppState>,
    payload: Result<Json<UsageBatchRequest>, JsonRejection>,
) -> ApiResult<Json<UsageBatchResult>> {
    let Json(req) = payload?;
    let events = req.events.into_iter().map(NewUsageEvent::from).collect();
    Ok(Json(state.usage.report_batch(events).await))
}

/// POST /api/v1/heartbeat
pub async fn heartbeat(
    State(state): State<AppState>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> ApiResult<Json<HeartbeatAck>> {
    let Json(req) = payload?;
    Ok(Json(state.devices.heartbeat(req.into()).await?))
}
