// ============================================================================
// Billing Infrastructure - PostgreSQL Row Types
// File: crates/billing-infrastructure/src/database/postgres/rows.rs
// ============================================================================

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use billing_core::domain::{
    BillingCycle, CameraLicense, DeviceStatus, EdgeDevice, FeatureEntitlement,
    GrowthPackAssignment, LicenseMode, ManagementTier, Plan, Subscription, SubscriptionStatus,
    Tenant, TenantStatus,
};

#[derive(Debug, FromRow)]
pub(crate) struct TenantRow {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            email: row.email,
            api_key: row.api_key,
            status: TenantStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SubscriptionRow {
    pub id: String,
    pub tenant_id: String,
    pub plan: String,
    pub status: String,
    pub cameras_licensed: i32,
    pub trial_start_date: Option<DateTime<Utc>>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub billing_cycle: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            tenant_id: row.tenant_id,
            plan: Plan::from_str(&row.plan).unwrap_or_default(),
            status: SubscriptionStatus::from_str(&row.status).unwrap_or_default(),
            cameras_licensed: row.cameras_licensed,
            trial_start_date: row.trial_start_date,
            trial_end_date: row.trial_end_date,
            subscription_start_date: row.subscription_start_date,
            subscription_end_date: row.subscription_end_date,
            billing_cycle: BillingCycle::from_str(&row.billing_cycle).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct GrowthPackRow {
    pub id: String,
    pub tenant_id: String,
    pub subscription_id: Option<String>,
    pub pack_name: String,
    pub is_enabled: bool,
    pub enabled_at: DateTime<Utc>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub price_monthly: Option<f64>,
}

impl From<GrowthPackRow> for GrowthPackAssignment {
    fn from(row: GrowthPackRow) -> Self {
        GrowthPackAssignment {
            id: row.id,
            tenant_id: row.tenant_id,
            subscription_id: row.subscription_id,
            pack_name: row.pack_name,
            is_enabled: row.is_enabled,
            enabled_at: row.enabled_at,
            disabled_at: row.disabled_at,
            price_monthly: row.price_monthly,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CameraLicenseRow {
    pub id: String,
    pub camera_id: String,
    pub tenant_id: String,
    pub device_id: Option<String>,
    pub license_mode: String,
    pub is_valid: bool,
    pub valid_until: Option<DateTime<Utc>>,
    pub enabled_growth_packs: Json<Vec<String>>,
    pub last_validated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CameraLicenseRow> for CameraLicense {
    fn from(row: CameraLicenseRow) -> Self {
        CameraLicense {
            id: row.id,
            camera_id: row.camera_id,
            tenant_id: row.tenant_id,
            device_id: row.device_id,
            license_mode: LicenseMode::from_str(&row.license_mode)
                .unwrap_or(LicenseMode::Unlicensed),
            is_valid: row.is_valid,
            valid_until: row.valid_until,
            enabled_growth_packs: row.enabled_growth_packs.0,
            last_validated: row.last_validated,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EntitlementRow {
    pub id: String,
    pub tenant_id: String,
    pub feature_category: String,
    pub feature_name: String,
    pub is_enabled: bool,
    pub quota_limit: i32,
    pub quota_used: i32,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EntitlementRow> for FeatureEntitlement {
    fn from(row: EntitlementRow) -> Self {
        FeatureEntitlement {
            id: row.id,
            tenant_id: row.tenant_id,
            feature_category: row.feature_category,
            feature_name: row.feature_name,
            is_enabled: row.is_enabled,
            quota_limit: row.quota_limit,
            quota_used: row.quota_used,
            valid_until: row.valid_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EdgeDeviceRow {
    pub id: String,
    pub device_id: String,
    pub tenant_id: String,
    pub name: Option<String>,
    pub status: String,
    pub management_tier: String,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub active_camera_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EdgeDeviceRow> for EdgeDevice {
    fn from(row: EdgeDeviceRow) -> Self {
        EdgeDevice {
            id: row.id,
            device_id: row.device_id,
            tenant_id: row.tenant_id,
            name: row.name,
            status: DeviceStatus::from_str(&row.status).unwrap_or_default(),
            management_tier: ManagementTier::from_str(&row.management_tier).unwrap_or_default(),
            last_heartbeat: row.last_heartbeat,
            active_camera_count: row.active_camera_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
