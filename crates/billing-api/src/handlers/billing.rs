// ============================================================================
// Billing API - Dashboard Handlers
// File: crates/billing-api/src/handlers/billing.rs
// ============================================================================
//! License, subscription, pricing and usage views for the dashboard

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use tracing::info;

use billing_core::services::{RevocationResult, SubscriptionSummary, UsageReport};

use crate::dto::{
    parse_timestamp, AvailablePacksResponse, CameraValidationRequest, CameraValidationResponse,
    EnabledPacksResponse, LicenseStatusResponse, PricingConfigResponse, UsageQuery,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/v1/billing/license/{tenant_id}
pub async fn license_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<LicenseStatusResponse>> {
    let status = state.licenses.license_status(&tenant_id).await?;
    Ok(Json(status.into()))
}

/// POST /api/v1/billing/license/{tenant_id}/revoke
pub async fn revoke_license(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<RevocationResult>> {
    Ok(Json(state.revocations.revoke_license(&tenant_id).await?))
}

/// GET /api/v1/billing/subscription/{tenant_id}
pub async fn subscription(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<SubscriptionSummary>> {
    Ok(Json(state.subscriptions.summary(&tenant_id).await?))
}

/// GET /api/v1/billing/growth-packs/{tenant_id}
pub async fn enabled_growth_packs(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<EnabledPacksResponse>> {
    info!(tenant_id = %tenant_id, "Growth packs request");
    let enabled_packs = state.subscriptions.enabled_growth_packs(&tenant_id).await?;
    Ok(Json(EnabledPacksResponse { enabled_packs }))
}

/// GET /api/v1/billing/growth-packs/available
pub async fn available_growth_packs(State(state): State<AppState>) -> Json<AvailablePacksResponse> {
    Json(AvailablePacksResponse {
        packs: state.catalog.packs().to_vec(),
    })
}

/// GET /api/v1/billing/pricing
pub async fn pricing_config(State(state): State<AppState>) -> Json<PricingConfigResponse> {
    Json(state.pricing.config().into())
}

/// GET /api/v1/billing/usage/{tenant_id}?start=&end=
///
/// Unparseable bounds fall back to the default window.
pub async fn usage_summary(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(query): Query<UsageQuery>,
) -> ApiResult<Json<UsageReport>> {
    let start = query.start.as_deref().and_then(parse_timestamp);
    let end = query.end.as_deref().and_then(parse_timestamp);
    Ok(Json(state.usage.summary(&tenant_id, start, end).await?))
}

/// POST /api/v1/billing/validate
pub async fn validate_camera(
    State(state): State<AppState>,
    payload: Result<Json<CameraValidationRequest>, JsonRejection>,
) -> ApiResult<Json<CameraValidationResponse>> {
    let Json(req) = payload?;
    info!(camera_id = %req.camera_id, tenant_id = %req.tenant_id, "Camera validation");

    let result = state
        .licenses
        .resolve_license(&req.tenant_id, &req.camera_id, "")
        .await?;

    Ok(Json(CameraValidationResponse {
        is_valid: result.is_valid,
        license_mode: result.license_mode,
        valid_until: result.valid_until,
        enabled_growth_packs: result.enabled_growth_packs,
    }))
}
