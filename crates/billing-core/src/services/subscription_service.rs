// ============================================================================
// Billing Core - Subscription Service
// File: crates/billing-core/src/services/subscription_service.rs
// ============================================================================
//! Read-side views of a tenant's subscription and growth packs

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use billing_shared::config::LicensingSettings;

use crate::catalog::Catalog;
use crate::domain::{enabled_pack_names, BillingCycle, Plan, SubscriptionStatus};
use crate::error::DomainError;
use crate::repositories::BillingRepository;
use crate::services::pricing_service::PricingCalculator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackDetail {
    pub pack_name: String,
    pub enabled_at: DateTime<Utc>,
    pub price_monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionSummary {
    pub subscription_id: String,
    pub tenant_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub cameras_licensed: i32,
    pub growth_packs: Vec<PackDetail>,
    pub billing_cycle: BillingCycle,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub total_monthly_cost: f64,
}

pub struct SubscriptionService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
    pricing: PricingCalculator,
}

impl<R: BillingRepository + ?Sized> SubscriptionService<R> {
    pub fn new(repo: Arc<R>, catalog: Arc<Catalog>, policy: &LicensingSettings) -> Self {
        Self {
            repo,
            pricing: PricingCalculator::new(catalog, policy),
        }
    }

    /// Summary of an existing subscription. Unlike the license views this never provisions.
    pub async fn summary(&self, tenant_id: &str) -> Result<SubscriptionSummary, DomainError> {
        info!(tenant_id, "Subscription summary request");
        let now = Utc::now();

        let sub = self
            .repo
            .get_subscription(tenant_id)
            .await
            .map_err(|e| {
                error!(tenant_id, "Failed to get subscription: {}", e);
                DomainError::InternalError("Failed to get subscription".to_string())
            })?
            .ok_or_else(|| DomainError::SubscriptionNotFound(tenant_id.to_string()))?;

        let packs = self
            .repo
            .get_enabled_growth_packs(tenant_id)
            .await
            .unwrap_or_else(|e| {
                warn!(tenant_id, "Failed to get growth packs: {}", e);
                Vec::new()
            });

        let growth_packs = packs
            .iter()
            .filter(|p| p.is_enabled)
            .map(|p| PackDetail {
                pack_name: p.pack_name.clone(),
                enabled_at: p.enabled_at,
                price_monthly: self.pricing.pack_cost(p),
            })
            .collect();

        let next_billing_date = match sub.subscription_end_date {
            Some(end) => Some(end),
            None if sub.plan.is_paid() => now.checked_add_months(Months::new(1)),
            None => None,
        };

        let pricing = self
            .pricing
            .calculate(i64::from(sub.cameras_licensed), &packs);

        Ok(SubscriptionSummary {
            subscription_id: sub.id,
            tenant_id: sub.tenant_id,
            plan: sub.plan,
            status: sub.status,
            cameras_licensed: sub.cameras_licensed,
            growth_packs,
            billing_cycle: sub.billing_cycle,
            next_billing_date,
            total_monthly_cost: pricing.total_monthly,
        })
    }

    pub async fn enabled_growth_packs(&self, tenant_id: &str) -> Result<Vec<String>, DomainError> {
        let packs = self
            .repo
            .get_enabled_growth_packs(tenant_id)
            .await
            .map_err(|e| {
                error!(tenant_id, "Failed to get growth packs: {}", e);
                DomainError::InternalError("Failed to get growth packs".to_string())
            })?;
        Ok(enabled_pack_names(&packs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GrowthPackAssignment, Subscription};
    use crate::repositories::MockBillingRepository;

    fn service(mock: MockBillingRepository) -> SubscriptionService<MockBillingRepository> {
        SubscriptionService::new(
            Arc::new(mock),
            Arc::new(Catalog::default()),
            &LicensingSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_summary_prices_licensed_cameras() {
        let mut sub =
            Subscription::new_paid("tenant-1", Plan::Base, 4, BillingCycle::Annual, Utc::now());
        sub.subscription_end_date = None;

        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(move |_| Ok(Some(sub.clone())));
        mock.expect_get_enabled_growth_packs().returning(|t| {
            Ok(vec![GrowthPackAssignment::enabled(t, "Retail", Some(45.5), Utc::now())])
        });

        let summary = service(mock).summary("tenant-1").await.unwrap();
        assert_eq!(summary.growth_packs.len(), 1);
        assert_eq!(summary.growth_packs[0].price_monthly, 45.5);
        assert_eq!(summary.total_monthly_cost, 105.46);
        assert!(summary.next_billing_date.is_some());
    }

    #[tokio::test]
    async fn test_trial_has_no_billing_date() {
        let sub = Subscription::new_trial("tenant-1", &LicensingSettings::default(), Utc::now());

        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(move |_| Ok(Some(sub.clone())));
        mock.expect_get_enabled_growth_packs().returning(|_| Ok(vec![]));

        let summary = service(mock).summary("tenant-1").await.unwrap();
        assert!(summary.next_billing_date.is_none());
    }

    #[tokio::test]
    async fn test_missing_subscription() {
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription().returning(|_| Ok(None));
        mock.expect_get_tenant().never();
        mock.expect_create_subscription().never();

        let err = service(mock).summary("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::SubscriptionNotFound(_)));
    }
}
