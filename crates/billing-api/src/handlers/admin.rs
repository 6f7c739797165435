// ============================================================================
// Billing API - Admin Handlers
// File: crates/billing-api/src/handlers/admin.rs
// ============================================================================

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use billing_core::domain::{FeatureEntitlement, Subscription, Tenant};

use crate::dto::{
    CreateSubscriptionRequest, CreateTenantRequest, EnabledPacksResponse,
    EntitlementOverrideRequest, ManageGrowthPacksRequest, UpdateSubscriptionRequest,
    UpdateTenantRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/v1/admin/tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenantRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tenant>)> {
    let Json(req) = payload?;
    let tenant = state.admin.create_tenant(req.into()).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// GET /api/v1/admin/tenants/{id}
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Json<Tenant>> {
    Ok(Json(state.admin.get_tenant(&tenant_id).await?))
}

/// PUT /api/v1/admin/tenants/{id}
pub async fn update_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<UpdateTenantRequest>, JsonRejection>,
) -> ApiResult<Json<Tenant>> {
    let Json(req) = payload?;
    Ok(Json(state.admin.update_tenant(&tenant_id, req.into()).await?))
}

/// POST /api/v1/admin/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Subscription>)> {
    let Json(req) = payload?;
    let sub = state.admin.create_subscription(req.into()).await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

/// PUT /api/v1/admin/subscriptions/{tenant_id}
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<UpdateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<Json<Subscription>> {
    let Json(req) = payload?;
    Ok(Json(
        state.admin.update_subscription(&tenant_id, req.into()).await?,
    ))
}

/// PUT /api/v1/admin/subscriptions/{tenant_id}/growth-packs
pub async fn manage_growth_packs(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<ManageGrowthPacksRequest>, JsonRejection>,
) -> ApiResult<Json<EnabledPacksResponse>> {
    let Json(req) = payload?;
    let enabled_packs = state
        .admin
        .manage_growth_packs(&tenant_id, &req.enable, &req.disable)
        .await?;
    Ok(Json(EnabledPacksResponse { enabled_packs }))
}

/// PUT /api/v1/admin/entitlements
pub async fn save_entitlement(
    State(state): State<AppState>,
    payload: Result<Json<EntitlementOverrideRequest>, JsonRejection>,
) -> ApiResult<Json<FeatureEntitlement>> {
    let Json(req) = payload?;
    Ok(Json(state.admin.save_entitlement(req.into()).await?))
}
