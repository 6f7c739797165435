// ============================================================================
// Billing Core - Growth Pack Assignment
// File: crates/billing-core/src/domain/growth_pack.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billing_shared::new_id;

/// Add-on pack assigned to a tenant, keyed by (tenant_id, pack_name).
/// Disabling flips the flag and stamps `disabled_at`; rows are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPackAssignment {
    pub id: String,
    pub tenant_id: String,
    pub subscription_id: Option<String>,
    pub pack_name: String,
    pub is_enabled: bool,
    pub enabled_at: DateTime<Utc>,
    pub disabled_at: Option<DateTime<Utc>>,
    /// Custom monthly price; the catalog price applies when absent.
    pub price_monthly: Option<f64>,
}

impl GrowthPackAssignment {
    pub fn enabled(
        tenant_id: &str,
        pack_name: &str,
        price_monthly: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            subscription_id: None,
            pack_name: pack_name.to_string(),
            is_enabled: true,
            enabled_at: now,
            disabled_at: None,
            price_monthly,
        }
    }

    /// Custom price when it is set and positive.
    pub fn custom_price(&self) -> Option<f64> {
        self.price_monthly.filter(|p| *p > 0.0)
    }
}

/// Unique pack names of the enabled assignments, in first-seen order.
pub fn enabled_pack_names(packs: &[GrowthPackAssignment]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(packs.len());
    for pack in packs.iter().filter(|p| p.is_enabled) {
        if !names.iter().any(|n| n == &pack.pack_name) {
            names.push(pack.pack_name.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_pack_names_dedupes() {
        let now = Utc::now();
        let mut disabled = GrowthPackAssignment::enabled("t", "Retail", None, now);
        disabled.is_enabled = false;
        let packs = vec![
            GrowthPackAssignment::enabled("t", "Retail", None, now),
            GrowthPackAssignment::enabled("t", "Intelligence", None, now),
            GrowthPackAssignment::enabled("t", "Retail", Some(10.0), now),
            disabled,
        ];

        assert_eq!(enabled_pack_names(&packs), vec!["Retail", "Intelligence"]);
    }

    #[test]
    fn test_zero_price_is_not_custom() {
        let pack = GrowthPackAssignment::enabled("t", "Retail", Some(0.0), Utc::now());
        assert!(pack.custom_price().is_none());
    }
}
