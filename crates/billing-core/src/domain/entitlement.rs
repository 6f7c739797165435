// ============================================================================
// Billing Core - Feature Entitlement
// File: crates/billing-core/src/domain/entitlement.rs
// Description: Per-feature overrides with quota tracking
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billing_shared::constants::UNLIMITED_QUOTA;
use billing_shared::new_id;

/// Remaining quota for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Unlimited,
    Limited(i32),
}

impl Quota {
    /// Wire representation, `-1` meaning unlimited.
    pub fn as_wire(&self) -> i32 {
        match self {
            Quota::Unlimited => UNLIMITED_QUOTA,
            Quota::Limited(n) => *n,
        }
    }
}

/// Entitlement override, keyed by (tenant_id, feature_category, feature_name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntitlement {
    pub id: String,
    pub tenant_id: String,
    pub feature_category: String,
    pub feature_name: String,
    pub is_enabled: bool,
    /// `-1` (or any non-positive value) means unlimited.
    pub quota_limit: i32,
    pub quota_used: i32,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeatureEntitlement {
    pub fn new(
        tenant_id: &str,
        feature_category: &str,
        feature_name: &str,
        is_enabled: bool,
        quota_limit: i32,
        valid_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            feature_category: feature_category.to_string(),
            feature_name: feature_name.to_string(),
            is_enabled,
            quota_limit,
            quota_used: 0,
            valid_until,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn quota_remaining(&self) -> Quota {
        if self.quota_limit > 0 {
            Quota::Limited((self.quota_limit - self.quota_used).max(0))
        } else {
            Quota::Unlimited
        }
    }
}
