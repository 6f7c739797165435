// ============================================================================
// Billing Core - Device Service
// File: crates/billing-core/src/services/device_service.rs
// ============================================================================

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use billing_shared::config::LicensingSettings;
use billing_shared::new_id;

use crate::domain::{DeviceStatus, EdgeDevice, ManagementTier};
use crate::error::DomainError;
use crate::repositories::BillingRepository;

#[derive(Debug, Clone, Default)]
pub struct Heartbeat {
    pub device_id: String,
    pub tenant_id: String,
    pub active_camera_ids: Vec<String>,
    pub management_tier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartbeatAck {
    pub status: String,
    pub next_heartbeat_in_seconds: u64,
}

pub struct DeviceService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
    heartbeat_interval_secs: u64,
}

impl<R: BillingRepository + ?Sized> DeviceService<R> {
    pub fn new(repo: Arc<R>, policy: &LicensingSettings) -> Self {
        Self {
            repo,
            heartbeat_interval_secs: policy.heartbeat_interval_secs,
        }
    }

    /// Records a device heartbeat. Storage failures are logged and the device
    /// is still told when to report next.
    pub async fn heartbeat(&self, beat: Heartbeat) -> Result<HeartbeatAck, DomainError> {
        if beat.device_id.trim().is_empty() {
            return Err(DomainError::ValidationError("device_id is required".to_string()));
        }
        info!(
            device_id = %beat.device_id,
            tenant_id = %beat.tenant_id,
            cameras = beat.active_camera_ids.len(),
            tier = beat.management_tier.as_deref().unwrap_or(""),
            "Heartbeat"
        );

        let now = Utc::now();
        let management_tier = match beat.management_tier.as_deref().map(str::trim) {
            None | Some("") => ManagementTier::default(),
            Some(raw) => ManagementTier::from_str(raw).unwrap_or_else(|| {
                warn!(device_id = %beat.device_id, tier = raw, "Unknown management tier, using basic");
                ManagementTier::default()
            }),
        };

        let existing = self
            .repo
            .get_edge_device(&beat.device_id)
            .await
            .unwrap_or_else(|e| {
                warn!(device_id = %beat.device_id, "Failed to load device: {}", e);
                None
            });

        let device = EdgeDevice {
            id: existing.as_ref().map(|d| d.id.clone()).unwrap_or_else(new_id),
            device_id: beat.device_id.clone(),
            tenant_id: beat.tenant_id,
            name: existing.as_ref().and_then(|d| d.name.clone()),
            status: DeviceStatus::Active,
            management_tier,
            last_heartbeat: Some(now),
            active_camera_count: i32::try_from(beat.active_camera_ids.len()).unwrap_or(i32::MAX),
            created_at: existing.as_ref().map(|d| d.created_at).unwrap_or(now),
            updated_at: now,
        };

        if let Err(e) = self.repo.save_edge_device(&device).await {
            warn!(device_id = %beat.device_id, "Failed to save device: {}", e);
        }

        Ok(HeartbeatAck {
            status: "ok".to_string(),
            next_heartbeat_in_seconds: self.heartbeat_interval_secs,
        })
    }
}
