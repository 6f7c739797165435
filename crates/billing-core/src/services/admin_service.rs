// ============================================================================
// Billing Core - Admin Service
// File: crates/billing-core/src/services/admin_service.rs
// ============================================================================
//! Administrative management of tenants, subscriptions, packs and overrides

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use validator::Validate;

use billing_shared::config::LicensingSettings;
use billing_shared::constants::DEFAULT_PAID_CAMERAS;
use billing_shared::new_id;
use billing_shared::utils::generate_api_key;

use crate::catalog::Catalog;
use crate::domain::{
    enabled_pack_names, subscription::one_year_from, BillingCycle, FeatureEntitlement,
    GrowthPackAssignment, Plan, Subscription, SubscriptionStatus, Tenant, TenantStatus,
};
use crate::error::DomainError;
use crate::repositories::BillingRepository;

#[derive(Debug, Clone, Default)]
pub struct NewTenant {
    pub name: String,
    pub email: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSubscription {
    pub tenant_id: String,
    pub plan: String,
    pub cameras_licensed: Option<i32>,
    pub billing_cycle: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    pub plan: Option<String>,
    pub status: Option<String>,
    pub cameras_licensed: Option<i32>,
    pub billing_cycle: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EntitlementOverride {
    pub tenant_id: String,
    pub feature_category: String,
    pub feature_name: String,
    pub is_enabled: bool,
    pub quota_limit: Option<i32>,
    pub quota_used: Option<i32>,
    pub valid_until: Option<DateTime<Utc>>,
}

pub struct AdminService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
    catalog: Arc<Catalog>,
    policy: LicensingSettings,
}

impl<R: BillingRepository + ?Sized> AdminService<R> {
    pub fn new(repo: Arc<R>, catalog: Arc<Catalog>, policy: LicensingSettings) -> Self {
        Self {
            repo,
            catalog,
            policy,
        }
    }

    pub async fn create_tenant(&self, input: NewTenant) -> Result<Tenant, DomainError> {
        let api_key = input
            .api_key
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(generate_api_key);
        let tenant = Tenant::new(new_id(), input.name, input.email, Some(api_key))?;

        let created = self.repo.create_tenant(&tenant).await?;
        info!(tenant_id = %created.id, name = %created.name, "Created tenant");
        Ok(created)
    }

    pub async fn get_tenant(&self, tenant_id: &str) -> Result<Tenant, DomainError> {
        self.repo
            .get_tenant(tenant_id)
            .await?
            .ok_or_else(|| DomainError::TenantNotFound(tenant_id.to_string()))
    }

    pub async fn update_tenant(
        &self,
        tenant_id: &str,
        update: TenantUpdate,
    ) -> Result<Tenant, DomainError> {
        let mut tenant = self.get_tenant(tenant_id).await?;

        if let Some(name) = update.name {
            tenant.name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            tenant.email = Some(email.trim().to_lowercase());
        }
        if let Some(status) = update.status {
            tenant.status = TenantStatus::from_str(&status).ok_or_else(|| {
                DomainError::ValidationError(format!("Invalid tenant status: {}", status))
            })?;
        }
        tenant.validate()?;
        tenant.updated_at = Utc::now();

        let updated = self.repo.update_tenant(&tenant).await?;
        info!(tenant_id, status = updated.status.as_str(), "Updated tenant");
        Ok(updated)
    }

    pub async fn create_subscription(
        &self,
        input: NewSubscription,
    ) -> Result<Subscription, DomainError> {
        let tenant_id = input.tenant_id.as_str();
        self.get_tenant(tenant_id).await?;

        let plan = parse_plan(&input.plan)?;
        let billing_cycle = parse_cycle(input.billing_cycle.as_deref())?.unwrap_or_default();
        let cameras = match input.cameras_licensed {
            Some(n) if n < 0 => {
                return Err(DomainError::ValidationError(
                    "cameras_licensed must not be negative".to_string(),
                ))
            }
            Some(n) if n > 0 => Some(n),
            _ => None,
        };

        if self.repo.get_subscription(tenant_id).await?.is_some() {
            return Err(DomainError::SubscriptionAlreadyExists(tenant_id.to_string()));
        }

        let now = Utc::now();
        let mut sub = match plan {
            Plan::Trial => Subscription::new_trial(tenant_id, &self.policy, now),
            paid => Subscription::new_paid(tenant_id, paid, DEFAULT_PAID_CAMERAS, billing_cycle, now),
        };
        sub.billing_cycle = billing_cycle;
        if let Some(n) = cameras {
            sub.cameras_licensed = n;
        }

        let created = self.repo.create_subscription(&sub).await?;
        info!(tenant_id, plan = created.plan.as_str(), "Created subscription");
        Ok(created)
    }

    /// Partial update. Moving to a paid plan without subscription dates starts
    /// a one-year window; trial dates are never touched once set.
    pub async fn update_subscription(
        &self,
        tenant_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<Subscription, DomainError> {
        let mut sub = self
            .repo
            .get_subscription(tenant_id)
            .await?
            .ok_or_else(|| DomainError::SubscriptionNotFound(tenant_id.to_string()))?;
        let now = Utc::now();

        if let Some(plan) = update.plan.as_deref() {
            sub.plan = parse_plan(plan)?;
            if sub.plan.is_paid() && sub.subscription_start_date.is_none() {
                sub.subscription_start_date = Some(now);
                sub.subscription_end_date = Some(one_year_from(now));
            }
            if sub.is_trial() && !sub.has_trial_dates() {
                sub.trial_start_date = Some(now);
                sub.trial_end_date = Some(now + Duration::days(self.policy.trial_duration_days));
            }
        }
        if let Some(status) = update.status.as_deref() {
            sub.status = SubscriptionStatus::from_str(status).ok_or_else(|| {
                DomainError::ValidationError(format!("Invalid subscription status: {}", status))
            })?;
        }
        if let Some(cameras) = update.cameras_licensed {
            if cameras < 0 {
                return Err(DomainError::ValidationError(
                    "cameras_licensed must not be negative".to_string(),
                ));
            }
            sub.cameras_licensed = cameras;
        }
        if let Some(cycle) = parse_cycle(update.billing_cycle.as_deref())? {
            sub.billing_cycle = cycle;
        }
        sub.updated_at = now;

        let updated = self.repo.update_subscription(&sub).await?;
        info!(
            tenant_id,
            plan = updated.plan.as_str(),
            status = updated.status.as_str(),
            "Updated subscription"
        );
        Ok(updated)
    }

    /// Disables then enables the named packs, returning the enabled pack names.
    /// Unknown names are rejected before anything changes.
    pub async fn manage_growth_packs(
        &self,
        tenant_id: &str,
        enable: &[String],
        disable: &[String],
    ) -> Result<Vec<String>, DomainError> {
        info!(tenant_id, ?enable, ?disable, "Managing growth packs");

        if let Some(unknown) = enable
            .iter()
            .chain(disable.iter())
            .find(|name| !self.catalog.is_known_pack(name))
        {
            warn!(tenant_id, pack = %unknown, "Unknown growth pack");
            return Err(DomainError::UnknownGrowthPack(unknown.clone()));
        }

        let subscription_id = match self.repo.get_subscription(tenant_id).await {
            Ok(sub) => sub.map(|s| s.id),
            Err(e) => {
                warn!(tenant_id, "Failed to get subscription for pack assignment: {}", e);
                None
            }
        };

        for name in disable {
            self.repo.disable_growth_pack(tenant_id, name).await?;
        }

        let now = Utc::now();
        for name in enable {
            let mut assignment = GrowthPackAssignment::enabled(
                tenant_id,
                name,
                Some(self.catalog.pack_price(name)),
                now,
            );
            assignment.subscription_id = subscription_id.clone();
            self.repo.enable_growth_pack(&assignment).await?;
        }

        let packs = self.repo.get_enabled_growth_packs(tenant_id).await?;
        Ok(enabled_pack_names(&packs))
    }

    /// Creates or replaces a feature override, keeping the identity of an existing row.
    pub async fn save_entitlement(
        &self,
        input: EntitlementOverride,
    ) -> Result<FeatureEntitlement, DomainError> {
        if input.tenant_id.trim().is_empty()
            || input.feature_category.trim().is_empty()
            || input.feature_name.trim().is_empty()
        {
            return Err(DomainError::ValidationError(
                "tenant_id, feature_category and feature_name are required".to_string(),
            ));
        }

        let now = Utc::now();
        let existing = self
            .repo
            .get_entitlement(&input.tenant_id, &input.feature_category, &input.feature_name)
            .await?;

        let mut entitlement = FeatureEntitlement::new(
            &input.tenant_id,
            &input.feature_category,
            &input.feature_name,
            input.is_enabled,
            input.quota_limit.unwrap_or(billing_shared::constants::UNLIMITED_QUOTA),
            input.valid_until,
            now,
        );
        if let Some(existing) = existing {
            entitlement.id = existing.id;
            entitlement.created_at = existing.created_at;
            entitlement.quota_used = existing.quota_used;
        }
        if let Some(used) = input.quota_used {
            entitlement.quota_used = used.max(0);
        }

        self.repo.save_entitlement(&entitlement).await?;
        info!(
            tenant_id = %entitlement.tenant_id,
            category = %entitlement.feature_category,
            feature = %entitlement.feature_name,
            "Saved entitlement override"
        );
        Ok(entitlement)
    }
}

fn parse_plan(raw: &str) -> Result<Plan, DomainError> {
    Plan::from_str(raw.trim())
        .ok_or_else(|| DomainError::ValidationError(format!("Invalid plan: {}", raw)))
}

fn parse_cycle(raw: Option<&str>) -> Result<Option<BillingCycle>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => BillingCycle::from_str(value)
            .map(Some)
            .ok_or_else(|| DomainError::ValidationError(format!("Invalid billing cycle: {}", value))),
    }
}
