// ============================================================================
// Billing API - Request/Response DTOs
// File: crates/billing-api/src/dto.rs
// ============================================================================
//! Wire shapes used by edge devices and the dashboard.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use billing_core::catalog::GrowthPackInfo;
use billing_core::domain::{CameraLicense, LicenseMode};
use billing_core::services::{
    EntitlementOverride, EntitlementResult, Heartbeat, LicenseStatus, NewSubscription, NewTenant,
    NewUsageEvent, PricingBreakdown, PricingConfig, SubscriptionUpdate, TenantUpdate,
};

// ----------------------------------------------------------------------------
// Device endpoints
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LicenseValidationRequest {
    #[serde(default)]
    pub camera_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub device_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CameraValidationRequest {
    #[serde(default)]
    pub camera_id: String,
    #[serde(default)]
    pub tenant_id: String,
}

#[derive(Debug, Serialize)]
pub struct CameraValidationResponse {
    pub is_valid: bool,
    pub license_mode: LicenseMode,
    pub valid_until: DateTime<Utc>,
    pub enabled_growth_packs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntitlementCheckRequest {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub feature_category: String,
    #[serde(default)]
    pub feature_name: String,
}

#[derive(Debug, Serialize)]
pub struct EntitlementCheckResponse {
    pub is_enabled: bool,
    /// -1 means unlimited.
    pub quota_remaining: i32,
    pub valid_until: DateTime<Utc>,
}

impl From<EntitlementResult> for EntitlementCheckResponse {
    fn from(result: EntitlementResult) -> Self {
        Self {
            is_enabled: result.is_enabled,
            quota_remaining: result.quota_remaining.as_wire(),
            valid_until: result.valid_until,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsageEventDto {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "flexible_time")]
    pub event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl From<UsageEventDto> for NewUsageEvent {
    fn from(dto: UsageEventDto) -> Self {
        Self {
            tenant_id: dto.tenant_id,
            event_type: dto.event_type,
            resource_id: dto.resource_id,
            quantity: dto.quantity,
            unit: dto.unit,
            event_time: dto.event_time,
            metadata: dto.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsageBatchRequest {
    #[serde(default)]
    pub events: Vec<UsageEventDto>,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub active_camera_ids: Vec<String>,
    #[serde(default)]
    pub management_tier: Option<String>,
}

impl From<HeartbeatRequest> for Heartbeat {
    fn from(req: HeartbeatRequest) -> Self {
        Self {
            device_id: req.device_id,
            tenant_id: req.tenant_id,
            active_camera_ids: req.active_camera_ids,
            management_tier: req.management_tier,
        }
    }
}

// ----------------------------------------------------------------------------
// Dashboard endpoints
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CameraView {
    pub camera_id: String,
    pub tenant_id: String,
    pub mode: LicenseMode,
    pub is_valid: bool,
    pub enabled_growth_packs: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<CameraLicense> for CameraView {
    fn from(camera: CameraLicense) -> Self {
        Self {
            camera_id: camera.camera_id,
            tenant_id: camera.tenant_id,
            mode: camera.license_mode,
            is_valid: camera.is_valid,
            enabled_growth_packs: camera.enabled_growth_packs,
            created_at: camera.created_at,
            valid_until: camera.valid_until,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LicenseStatusResponse {
    pub license_mode: LicenseMode,
    pub is_valid: bool,
    pub active_cameras: i64,
    pub cameras_allowed: i32,
    pub days_remaining: Option<i64>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_started_at: Option<DateTime<Utc>>,
    pub enabled_growth_packs: Vec<String>,
    pub cameras: Vec<CameraView>,
    pub pricing: Option<PricingBreakdown>,
    pub license_key: String,
    pub can_revoke: bool,
    pub trial_max_cameras: i32,
}

impl From<LicenseStatus> for LicenseStatusResponse {
    fn from(status: LicenseStatus) -> Self {
        Self {
            license_mode: status.license_mode,
            is_valid: status.is_valid,
            active_cameras: status.active_cameras,
            cameras_allowed: status.cameras_allowed,
            days_remaining: status.days_remaining,
            valid_until: status.valid_until,
            trial_started_at: status.trial_started_at,
            enabled_growth_packs: status.enabled_growth_packs,
            cameras: status.cameras.into_iter().map(CameraView::from).collect(),
            pricing: status.pricing,
            license_key: status.license_key,
            can_revoke: status.can_revoke,
            trial_max_cameras: status.trial_max_cameras,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnabledPacksResponse {
    pub enabled_packs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailablePacksResponse {
    pub packs: Vec<GrowthPackInfo>,
}

#[derive(Debug, Serialize)]
pub struct BaseLicensePrice {
    pub per_camera_monthly: f64,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PackPrice {
    pub pack_id: String,
    pub pack_name: String,
    pub category: String,
    pub price_monthly: f64,
    pub description: String,
}

impl From<&GrowthPackInfo> for PackPrice {
    fn from(pack: &GrowthPackInfo) -> Self {
        Self {
            pack_id: pack.pack_id.clone(),
            pack_name: pack.pack_name.clone(),
            category: pack.category.clone(),
            price_monthly: pack.price_monthly,
            description: pack.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PricingConfigResponse {
    pub base_license: BaseLicensePrice,
    pub growth_packs: Vec<PackPrice>,
    pub currency: String,
}

impl From<PricingConfig<'_>> for PricingConfigResponse {
    fn from(config: PricingConfig<'_>) -> Self {
        Self {
            base_license: BaseLicensePrice {
                per_camera_monthly: config.per_camera_monthly,
                description: "Base license per camera per month",
            },
            growth_packs: config.growth_packs.iter().map(PackPrice::from).collect(),
            currency: config.currency.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

// ----------------------------------------------------------------------------
// Admin endpoints
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub api_key: Option<String>,
}

impl From<CreateTenantRequest> for NewTenant {
    fn from(req: CreateTenantRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            api_key: req.api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl From<UpdateTenantRequest> for TenantUpdate {
    fn from(req: UpdateTenantRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub plan: String,
    pub cameras_licensed: Option<i32>,
    pub billing_cycle: Option<String>,
}

impl From<CreateSubscriptionRequest> for NewSubscription {
    fn from(req: CreateSubscriptionRequest) -> Self {
        Self {
            tenant_id: req.tenant_id,
            plan: req.plan,
            cameras_licensed: req.cameras_licensed,
            billing_cycle: req.billing_cycle,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub plan: Option<String>,
    pub status: Option<String>,
    pub cameras_licensed: Option<i32>,
    pub billing_cycle: Option<String>,
}

impl From<UpdateSubscriptionRequest> for SubscriptionUpdate {
    fn from(req: UpdateSubscriptionRequest) -> Self {
        Self {
            plan: req.plan,
            status: req.status,
            cameras_licensed: req.cameras_licensed,
            billing_cycle: req.billing_cycle,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ManageGrowthPacksRequest {
    #[serde(default)]
    pub enable: Vec<String>,
    #[serde(default)]
    pub disable: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntitlementOverrideRequest {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub feature_category: String,
    #[serde(default)]
    pub feature_name: String,
    #[serde(default)]
    pub is_enabled: bool,
    pub quota_limit: Option<i32>,
    pub quota_used: Option<i32>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<EntitlementOverrideRequest> for EntitlementOverride {
    fn from(req: EntitlementOverrideRequest) -> Self {
        Self {
            tenant_id: req.tenant_id,
            feature_category: req.feature_category,
            feature_name: req.feature_name,
            is_enabled: req.is_enabled,
            quota_limit: req.quota_limit,
            quota_used: req.quota_used,
            valid_until: req.valid_until,
        }
    }
}

// ----------------------------------------------------------------------------
// Health
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub total_events: i64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_events: i64,
    pub tenants: i64,
    pub cameras: i64,
    pub devices: i64,
}

// ----------------------------------------------------------------------------
// Time parsing
// ----------------------------------------------------------------------------

const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses RFC 3339, Unix seconds or `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Lenient `event_time`: anything unparseable becomes `None` and is stamped on receipt.
fn flexible_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        serde_json::Value::String(s) => parse_timestamp(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event_time(json: &str) -> Option<DateTime<Utc>> {
        serde_json::from_str::<UsageEventDto>(json).unwrap().event_time
    }

    #[test]
    fn test_event_time_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(event_time(r#"{"event_time": 1709294400}"#), Some(expected));
        assert_eq!(event_time(r#"{"event_time": "1709294400"}"#), Some(expected));
        assert_eq!(event_time(r#"{"event_time": "2024-03-01T12:00:00Z"}"#), Some(expected));
        assert_eq!(event_time(r#"{"event_time": "2024-03-01 12:00:00"}"#), Some(expected));
    }

    #[test]
    fn test_missing_or_garbage_event_time() {
        assert_eq!(event_time(r#"{}"#), None);
        assert_eq!(event_time(r#"{"event_time": null}"#), None);
        assert_eq!(event_time(r#"{"event_time": "yesterday"}"#), None);
    }

    #[test]
    fn test_usage_event_defaults() {
        let dto: UsageEventDto =
            serde_json::from_str(r#"{"tenant_id": "t1", "event_type": "api_call"}"#).unwrap();
        let event = NewUsageEvent::from(dto);
        assert_eq!(event.quantity, 0.0);
        assert!(event.metadata.is_null());
    }
}
