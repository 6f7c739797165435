// ============================================================================
// Billing Infrastructure - In-Memory Billing Repository
// File: crates/billing-infrastructure/src/memory.rs
// ============================================================================
//! Process-local store used when no database is configured or reachable.
//!
//! Uniqueness and upsert rules mirror the PostgreSQL schema so both stores
//! behave the same behind the `BillingRepository` port.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use billing_core::domain::{
    CameraLicense, EdgeDevice, FeatureEntitlement, GrowthPackAssignment, StoreStats,
    Subscription, Tenant, UsageEvent, UsageSummary,
};
use billing_core::error::DomainError;
use billing_core::repositories::BillingRepository;

type PackKey = (String, String);
type CameraKey = (String, String);
type EntitlementKey = (String, String, String);

#[derive(Default)]
struct MemoryState {
    tenants: HashMap<String, Tenant>,
    subscriptions: HashMap<String, Subscription>,
    growth_packs: BTreeMap<PackKey, GrowthPackAssignment>,
    cameras: BTreeMap<CameraKey, CameraLicense>,
    entitlements: HashMap<EntitlementKey, FeatureEntitlement>,
    devices: HashMap<String, EdgeDevice>,
    usage_events: Vec<UsageEvent>,
}

impl MemoryState {
    fn api_key_taken(&self, api_key: Option<&str>, except_id: &str) -> bool {
        let Some(key) = api_key else {
            return false;
        };
        self.tenants
            .values()
            .any(|t| t.id != except_id && t.api_key.as_deref() == Some(key))
    }
}

#[derive(Default)]
pub struct MemoryBillingRepository {
    state: RwLock<MemoryState>,
}

impl MemoryBillingRepository {
    pub fn new() -> Self {
        info!("Initializing in-memory billing store");
        Self::default()
    }
}

#[async_trait]
impl BillingRepository for MemoryBillingRepository {
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, DomainError> {
        Ok(self.state.read().tenants.get(tenant_id).cloned())
    }

    async fn get_tenant_by_api_key(&self, api_key: &str) -> Result<Option<Tenant>, DomainError> {
        Ok(self
            .state
            .read()
            .tenants
            .values()
            .find(|t| t.api_key.as_deref() == Some(api_key))
            .cloned())
    }

    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut state = self.state.write();
        if state.tenants.contains_key(&tenant.id)
            || state.api_key_taken(tenant.api_key.as_deref(), &tenant.id)
        {
            return Err(DomainError::TenantAlreadyExists(tenant.id.clone()));
        }
        state.tenants.insert(tenant.id.clone(), tenant.clone());
        debug!(tenant_id = %tenant.id, "Tenant stored");
        Ok(tenant.clone())
    }

    async fn update_tenant(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut state = self.state.write();
        if state.api_key_taken(tenant.api_key.as_deref(), &tenant.id) {
            return Err(DomainError::TenantAlreadyExists(tenant.id.clone()));
        }
        let existing = state
            .tenants
            .get_mut(&tenant.id)
            .ok_or_else(|| DomainError::TenantNotFound(tenant.id.clone()))?;
        let created_at = existing.created_at;
        *existing = Tenant {
            created_at,
            ..tenant.clone()
        };
        Ok(existing.clone())
    }

    async fn get_subscription(&self, tenant_id: &str) -> Result<Option<Subscription>, DomainError> {
        Ok(self.state.read().subscriptions.get(tenant_id).cloned())
    }

    async fn create_subscription(&self, sub: &Subscription) -> Result<Subscription, DomainError> {
        let mut state = self.state.write();
        if state.subscriptions.contains_key(&sub.tenant_id) {
            return Err(DomainError::SubscriptionAlreadyExists(sub.tenant_id.clone()));
        }
        state.subscriptions.insert(sub.tenant_id.clone(), sub.clone());
        Ok(sub.clone())
    }

    async fn update_subscription(&self, sub: &Subscription) -> Result<Subscription, DomainError> {
        let mut state = self.state.write();
        let existing = state
            .subscriptions
            .values_mut()
            .find(|s| s.id == sub.id)
            .ok_or_else(|| DomainError::SubscriptionNotFound(sub.tenant_id.clone()))?;
        *existing = Subscription {
            id: existing.id.clone(),
            tenant_id: existing.tenant_id.clone(),
            created_at: existing.created_at,
            ..sub.clone()
        };
        Ok(existing.clone())
    }

    async fn get_enabled_growth_packs(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<GrowthPackAssignment>, DomainError> {
        let mut packs: Vec<GrowthPackAssignment> = self
            .state
            .read()
            .growth_packs
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.is_enabled)
            .cloned()
            .collect();
        packs.sort_by(|a, b| {
            a.enabled_at
                .cmp(&b.enabled_at)
                .then_with(|| a.pack_name.cmp(&b.pack_name))
        });
        Ok(packs)
    }

    async fn enable_growth_pack(&self, pack: &GrowthPackAssignment) -> Result<(), DomainError> {
        let key = (pack.tenant_id.clone(), pack.pack_name.clone());
        let mut state = self.state.write();
        let stored = match state.growth_packs.get(&key) {
            Some(existing) => GrowthPackAssignment {
                id: existing.id.clone(),
                is_enabled: true,
                disabled_at: None,
                ..pack.clone()
            },
            None => GrowthPackAssignment {
                is_enabled: true,
                disabled_at: None,
                ..pack.clone()
            },
        };
        state.growth_packs.insert(key, stored);
        Ok(())
    }

    async fn disable_growth_pack(
        &self,
        tenant_id: &str,
        pack_name: &str,
    ) -> Result<(), DomainError> {
        let key = (tenant_id.to_string(), pack_name.to_string());
        if let Some(pack) = self.state.write().growth_packs.get_mut(&key) {
            if pack.is_enabled {
                pack.is_enabled = false;
                pack.disabled_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn get_camera_license(
        &self,
        camera_id: &str,
        tenant_id: &str,
    ) -> Result<Option<CameraLicense>, DomainError> {
        let key = (tenant_id.to_string(), camera_id.to_string());
        Ok(self.state.read().cameras.get(&key).cloned())
    }

    async fn save_camera_license(&self, license: &CameraLicense) -> Result<(), DomainError> {
        let key = (license.tenant_id.clone(), license.camera_id.clone());
        let mut state = self.state.write();
        let stored = match state.cameras.get(&key) {
            Some(existing) => CameraLicense {
                id: existing.id.clone(),
                device_id: license.device_id.clone().or_else(|| existing.device_id.clone()),
                created_at: existing.created_at,
                ..license.clone()
            },
            None => license.clone(),
        };
        state.cameras.insert(key, stored);
        Ok(())
    }

    async fn get_cameras_by_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<CameraLicense>, DomainError> {
        let mut cameras: Vec<CameraLicense> = self
            .state
            .read()
            .cameras
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect();
        cameras.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.camera_id.cmp(&b.camera_id))
        });
        Ok(cameras)
    }

    async fn count_cameras_by_tenant(&self, tenant_id: &str) -> Result<i64, DomainError> {
        let count = self
            .state
            .read()
            .cameras
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .count();
        Ok(count as i64)
    }

    async fn get_entitlement(
        &self,
        tenant_id: &str,
        feature_category: &str,
        feature_name: &str,
    ) -> Result<Option<FeatureEntitlement>, DomainError> {
        let key = (
            tenant_id.to_string(),
            feature_category.to_string(),
            feature_name.to_string(),
        );
        Ok(self.state.read().entitlements.get(&key).cloned())
    }

    async fn save_entitlement(&self, entitlement: &FeatureEntitlement) -> Result<(), DomainError> {
        let key = (
            entitlement.tenant_id.clone(),
            entitlement.feature_category.clone(),
            entitlement.feature_name.clone(),
        );
        let mut state = self.state.write();
        let stored = match state.entitlements.get(&key) {
            Some(existing) => FeatureEntitlement {
                id: existing.id.clone(),
                created_at: existing.created_at,
                ..entitlement.clone()
            },
            None => entitlement.clone(),
        };
        state.entitlements.insert(key, stored);
        Ok(())
    }

    async fn save_usage_events(&self, events: &[UsageEvent]) -> Result<(), DomainError> {
        self.state.write().usage_events.extend_from_slice(events);
        Ok(())
    }

    async fn get_usage_summary(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<UsageSummary, DomainError> {
        let state = self.state.read();
        let mut summary = UsageSummary::new();
        for event in state
            .usage_events
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.event_time >= start && e.event_time <= end)
        {
            *summary.entry(event.event_type.clone()).or_insert(0.0) += event.quantity;
        }
        Ok(summary)
    }

    async fn save_edge_device(&self, device: &EdgeDevice) -> Result<(), DomainError> {
        let mut state = self.state.write();
        let stored = match state.devices.get(&device.device_id) {
            Some(existing) => EdgeDevice {
                id: existing.id.clone(),
                name: device.name.clone().or_else(|| existing.name.clone()),
                created_at: existing.created_at,
                ..device.clone()
            },
            None => device.clone(),
        };
        state.devices.insert(device.device_id.clone(), stored);
        Ok(())
    }

    async fn get_edge_device(&self, device_id: &str) -> Result<Option<EdgeDevice>, DomainError> {
        Ok(self.state.read().devices.get(device_id).cloned())
    }

    async fn get_stats(&self) -> Result<StoreStats, DomainError> {
        let state = self.state.read();
        Ok(StoreStats {
            tenants: state.tenants.len() as i64,
            usage_events: state.usage_events.len() as i64,
            cameras: state.cameras.len() as i64,
            devices: state.devices.len() as i64,
        })
    }
}
