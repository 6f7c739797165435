// ============================================================================
// Billing Core - Pricing Calculator
// File: crates/billing-core/src/services/pricing_service.rs
// ============================================================================
//! Monthly cost breakdown from camera count and enabled growth packs

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use billing_shared::config::LicensingSettings;

use crate::catalog::{Catalog, GrowthPackInfo};
use crate::domain::GrowthPackAssignment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingBreakdown {
    pub base_cost: f64,
    pub camera_count: i64,
    pub per_camera_rate: f64,
    /// Pack name -> monthly cost.
    pub growth_packs: BTreeMap<String, f64>,
    pub growth_pack_cost: f64,
    pub total_monthly: f64,
    pub currency: String,
}

/// Published price list.
#[derive(Debug, Clone, Serialize)]
pub struct PricingConfig<'a> {
    pub per_camera_monthly: f64,
    pub currency: &'a str,
    pub growth_packs: &'a [GrowthPackInfo],
}

#[derive(Debug, Clone)]
pub struct PricingCalculator {
    catalog: Arc<Catalog>,
    per_camera_rate: f64,
    currency: String,
}

impl PricingCalculator {
    pub fn new(catalog: Arc<Catalog>, policy: &LicensingSettings) -> Self {
        Self {
            catalog,
            per_camera_rate: policy.per_camera_rate,
            currency: policy.currency.clone(),
        }
    }

    pub fn per_camera_rate(&self) -> f64 {
        self.per_camera_rate
    }

    /// Custom price when set and positive, else the catalog price (0 for unknown packs).
    pub fn pack_cost(&self, pack: &GrowthPackAssignment) -> f64 {
        pack.custom_price()
            .unwrap_or_else(|| self.catalog.pack_price(&pack.pack_name))
    }

    pub fn calculate(&self, camera_count: i64, packs: &[GrowthPackAssignment]) -> PricingBreakdown {
        let base_cost = round_cents(camera_count as f64 * self.per_camera_rate);

        let mut growth_packs = BTreeMap::new();
        for pack in packs.iter().filter(|p| p.is_enabled) {
            growth_packs.insert(pack.pack_name.clone(), self.pack_cost(pack));
        }
        let growth_pack_cost = round_cents(growth_packs.values().sum());

        PricingBreakdown {
            base_cost,
            camera_count,
            per_camera_rate: self.per_camera_rate,
            growth_packs,
            growth_pack_cost,
            total_monthly: round_cents(base_cost + growth_pack_cost),
            currency: self.currency.clone(),
        }
    }

    pub fn config(&self) -> PricingConfig<'_> {
        PricingConfig {
            per_camera_monthly: self.per_camera_rate,
            currency: &self.currency,
            growth_packs: self.catalog.packs(),
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn calculator() -> PricingCalculator {
        PricingCalculator::new(Arc::new(Catalog::default()), &LicensingSettings::default())
    }

    #[test]
    fn test_cameras_plus_catalog_pack() {
        let packs = vec![GrowthPackAssignment::enabled("t", "Advanced Analytics", None, Utc::now())];
        let pricing = calculator().calculate(3, &packs);

        assert_eq!(pricing.base_cost, 44.97);
        assert_eq!(pricing.growth_packs.get("Advanced Analytics"), Some(&29.0));
        assert_eq!(pricing.growth_pack_cost, 29.0);
        assert_eq!(pricing.total_monthly, 73.97);
        assert_eq!(pricing.currency, "AUD");
    }

    #[test]
    fn test_custom_price_and_unknown_pack() {
        let now = Utc::now();
        let packs = vec![
            GrowthPackAssignment::enabled("t", "Retail", Some(20.0), now),
            GrowthPackAssignment::enabled("t", "Retail Plus", None, now),
            GrowthPackAssignment::enabled("t", "Intelligence", Some(0.0), now),
        ];
        let pricing = calculator().calculate(0, &packs);

        assert_eq!(pricing.base_cost, 0.0);
        assert_eq!(pricing.growth_packs["Retail"], 20.0);
        assert_eq!(pricing.growth_packs["Retail Plus"], 0.0);
        assert_eq!(pricing.growth_packs["Intelligence"], 599.0);
        assert_eq!(pricing.total_monthly, 619.0);
    }

    #[test]
    fn test_configured_rate() {
        let policy = LicensingSettings {
            per_camera_rate: 60.0,
            ..LicensingSettings::default()
        };
        let calc = PricingCalculator::new(Arc::new(Catalog::default()), &policy);
        assert_eq!(calc.calculate(2, &[]).total_monthly, 120.0);
    }
}
