// ============================================================================
// Billing Core - Edge Device
// File: crates/billing-core/src/domain/edge_device.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Active,
    Offline,
    Suspended,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Suspended => "suspended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(DeviceStatus::Active),
            "offline" => Some(DeviceStatus::Offline),
            "suspended" => Some(DeviceStatus::Suspended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManagementTier {
    #[default]
    Basic,
    Managed,
}

impl ManagementTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagementTier::Basic => "basic",
            ManagementTier::Managed => "managed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Some(ManagementTier::Basic),
            "managed" => Some(ManagementTier::Managed),
            _ => None,
        }
    }
}

/// Edge device, keyed by `device_id`. Upserted on each heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDevice {
    pub id: String,
    pub device_id: String,
    pub tenant_id: String,
    pub name: Option<String>,
    pub status: DeviceStatus,
    pub management_tier: ManagementTier,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub active_camera_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
