// ============================================================================
// Billing Core - Entitlement Service
// File: crates/billing-core/src/services/entitlement_service.rs
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::domain::{subscription::one_year_from, Quota};
use crate::error::DomainError;
use crate::repositories::BillingRepository;

/// Which rule granted (or denied) a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementSource {
    Base,
    GrowthPack(String),
    Override,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitlementResult {
    pub is_enabled: bool,
    pub quota_remaining: Quota,
    pub valid_until: DateTime<Utc>,
    pub source: EntitlementSource,
}

pub struct EntitlementService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
    catalog: Arc<Catalog>,
}

impl<R: BillingRepository + ?Sized> EntitlementService<R> {
    pub fn new(repo: Arc<R>, catalog: Arc<Catalog>) -> Self {
        Self { repo, catalog }
    }

    /// Resolves a feature in order: base set, enabled growth packs, stored override.
    /// The first rule that grants the feature wins.
    pub async fn check_entitlement(
        &self,
        tenant_id: &str,
        category: &str,
        feature: &str,
    ) -> Result<EntitlementResult, DomainError> {
        info!(tenant_id, category, feature, "Entitlement check");
        let now = Utc::now();

        if self.catalog.is_base_feature(category, feature) {
            debug!(category, feature, "Base feature");
            return Ok(unlimited(EntitlementSource::Base, now));
        }

        match self.repo.get_enabled_growth_packs(tenant_id).await {
            Ok(packs) => {
                if let Some(pack) = packs
                    .iter()
                    .filter(|p| p.is_enabled)
                    .find(|p| self.catalog.pack_grants(&p.pack_name, category, feature))
                {
                    debug!(category, feature, pack = %pack.pack_name, "Enabled via growth pack");
                    return Ok(unlimited(
                        EntitlementSource::GrowthPack(pack.pack_name.clone()),
                        now,
                    ));
                }
            }
            Err(e) => warn!(tenant_id, "Failed to get growth packs: {}", e),
        }

        match self.repo.get_entitlement(tenant_id, category, feature).await {
            Ok(Some(ent)) if ent.is_enabled => {
                return Ok(EntitlementResult {
                    is_enabled: true,
                    quota_remaining: ent.quota_remaining(),
                    valid_until: ent.valid_until.unwrap_or_else(|| one_year_from(now)),
                    source: EntitlementSource::Override,
                });
            }
            Ok(_) => {}
            Err(e) => warn!(tenant_id, category, feature, "Failed to get entitlement: {}", e),
        }

        info!(tenant_id, category, feature, "Feature not enabled");
        Ok(EntitlementResult {
            is_enabled: false,
            quota_remaining: Quota::Limited(0),
            valid_until: now,
            source: EntitlementSource::None,
        })
    }
}

fn unlimited(source: EntitlementSource, now: DateTime<Utc>) -> EntitlementResult {
    EntitlementResult {
        is_enabled: true,
        quota_remaining: Quota::Unlimited,
        valid_until: one_year_from(now),
        source,
    }
}
