//! Billing storage port

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CameraLicense, EdgeDevice, FeatureEntitlement, GrowthPackAssignment, StoreStats,
    Subscription, Tenant, UsageEvent, UsageSummary,
};
use crate::error::DomainError;

/// Persistence operations used by the billing services.
///
/// Lookups return `Ok(None)` when the record does not exist; `Err` is reserved
/// for storage failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingRepository: Send + Sync {
    // Tenants
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, DomainError>;
    async fn get_tenant_by_api_key(&self, api_key: &str) -> Result<Option<Tenant>, DomainError>;
    /// Fails with `TenantAlreadyExists` when the id is taken.
    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant, DomainError>;
    async fn update_tenant(&self, tenant: &Tenant) -> Result<Tenant, DomainError>;

    // Subscriptions
    async fn get_subscription(&self, tenant_id: &str) -> Result<Option<Subscription>, DomainError>;
    /// At most one subscription per tenant; a second insert fails with
    /// `SubscriptionAlreadyExists`.
    async fn create_subscription(&self, sub: &Subscription) -> Result<Subscription, DomainError>;
    async fn update_subscription(&self, sub: &Subscription) -> Result<Subscription, DomainError>;

    // Growth packs
    async fn get_enabled_growth_packs(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<GrowthPackAssignment>, DomainError>;
    /// Upsert on (tenant_id, pack_name), re-enabling a disabled row.
    async fn enable_growth_pack(&self, pack: &GrowthPackAssignment) -> Result<(), DomainError>;
    async fn disable_growth_pack(&self, tenant_id: &str, pack_name: &str)
        -> Result<(), DomainError>;

    // Cameras
    async fn get_camera_license(
        &self,
        camera_id: &str,
        tenant_id: &str,
    ) -> Result<Option<CameraLicense>, DomainError>;
    /// Upsert on (tenant_id, camera_id), keeping `id` and `created_at` of an existing row.
    async fn save_camera_license(&self, license: &CameraLicense) -> Result<(), DomainError>;
    async fn get_cameras_by_tenant(&self, tenant_id: &str)
        -> Result<Vec<CameraLicense>, DomainError>;
    async fn count_cameras_by_tenant(&self, tenant_id: &str) -> Result<i64, DomainError>;

    // Entitlements
    async fn get_entitlement(
        &self,
        tenant_id: &str,
        feature_category: &str,
        feature_name: &str,
    ) -> Result<Option<FeatureEntitlement>, DomainError>;
    async fn save_entitlement(&self, entitlement: &FeatureEntitlement) -> Result<(), DomainError>;

    // Usage
    async fn save_usage_events(&self, events: &[UsageEvent]) -> Result<(), DomainError>;
    /// Summed quantity per event type for events with `start <= event_time <= end`.
    async fn get_usage_summary(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<UsageSummary, DomainError>;

    // Devices
    async fn save_edge_device(&self, device: &EdgeDevice) -> Result<(), DomainError>;
    async fn get_edge_device(&self, device_id: &str) -> Result<Option<EdgeDevice>, DomainError>;

    async fn get_stats(&self) -> Result<StoreStats, DomainError>;
}
