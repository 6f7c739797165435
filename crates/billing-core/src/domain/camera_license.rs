// ============================================================================
// Billing Core - Camera License Snapshot
// File: crates/billing-core/src/domain/camera_license.rs
// Description: Cached per-camera validation result
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billing_shared::new_id;

use super::subscription::Plan;

/// Mode a license resolves to when a device asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseMode {
    Trial,
    Base,
    Enterprise,
    Expired,
    Unlicensed,
}

impl LicenseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseMode::Trial => "trial",
            LicenseMode::Base => "base",
            LicenseMode::Enterprise => "enterprise",
            LicenseMode::Expired => "expired",
            LicenseMode::Unlicensed => "unlicensed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trial" => Some(LicenseMode::Trial),
            "base" => Some(LicenseMode::Base),
            "enterprise" => Some(LicenseMode::Enterprise),
            "expired" => Some(LicenseMode::Expired),
            "unlicensed" => Some(LicenseMode::Unlicensed),
            _ => None,
        }
    }
}

impl From<Plan> for LicenseMode {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Trial => LicenseMode::Trial,
            Plan::Base => LicenseMode::Base,
            Plan::Enterprise => LicenseMode::Enterprise,
        }
    }
}

/// Camera license entity, keyed by (tenant_id, camera_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraLicense {
    pub id: String,
    pub camera_id: String,
    pub tenant_id: String,
    pub device_id: Option<String>,
    pub license_mode: LicenseMode,
    pub is_valid: bool,
    pub valid_until: Option<DateTime<Utc>>,
    pub enabled_growth_packs: Vec<String>,
    pub last_validated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CameraLicense {
    /// Snapshot of a validation taken at `now`.
    ///
    /// Stores keep the `id` and `created_at` of an existing row when upserting.
    #[allow(clippy::too_many_arguments)]
    pub fn snapshot(
        tenant_id: &str,
        camera_id: &str,
        device_id: Option<&str>,
        license_mode: LicenseMode,
        is_valid: bool,
        valid_until: DateTime<Utc>,
        enabled_growth_packs: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            camera_id: camera_id.to_string(),
            tenant_id: tenant_id.to_string(),
            device_id: device_id.filter(|d| !d.is_empty()).map(str::to_string),
            license_mode,
            is_valid,
            valid_until: Some(valid_until),
            enabled_growth_packs,
            last_validated: now,
            created_at: now,
            updated_at: now,
        }
    }
}
