// ============================================================================
// Billing Core - License Service
// File: crates/billing-core/src/services/license_service.rs
// ============================================================================
//! License resolution for devices and the tenant-facing status view.
//!
//! Both entry points share trial auto-provisioning: a tenant without a
//! subscription gets a placeholder tenant record and a fresh trial. When two
//! requests race to provision the same tenant, the store rejects the second
//! insert and the loser re-reads the winning subscription.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use billing_shared::config::LicensingSettings;
use billing_shared::utils::{days_until, mask_license_key};

use crate::catalog::Catalog;
use crate::domain::{
    enabled_pack_names, CameraLicense, GrowthPackAssignment, LicenseMode, Subscription,
    SubscriptionStatus, Tenant,
};
use crate::error::DomainError;
use crate::repositories::BillingRepository;
use crate::services::pricing_service::{PricingBreakdown, PricingCalculator};

/// Result of a device license validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseResult {
    pub is_valid: bool,
    pub license_mode: LicenseMode,
    pub enabled_growth_packs: Vec<String>,
    pub valid_until: DateTime<Utc>,
    pub cameras_allowed: i32,
}

/// Tenant-facing license overview.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseStatus {
    pub license_mode: LicenseMode,
    pub is_valid: bool,
    pub active_cameras: i64,
    pub cameras_allowed: i32,
    pub days_remaining: Option<i64>,
    pub valid_until: Option<DateTime<Utc>>,
    pub trial_started_at: Option<DateTime<Utc>>,
    pub enabled_growth_packs: Vec<String>,
    pub cameras: Vec<CameraLicense>,
    pub pricing: Option<PricingBreakdown>,
    pub license_key: String,
    pub can_revoke: bool,
    pub trial_max_cameras: i32,
}

enum Provisioned {
    /// This request inserted the trial.
    Created(Subscription),
    /// Another request won the race; this is the stored record.
    Existing(Subscription),
}

pub struct LicenseService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
    pricing: PricingCalculator,
    policy: LicensingSettings,
}

impl<R: BillingRepository + ?Sized> LicenseService<R> {
    pub fn new(repo: Arc<R>, catalog: Arc<Catalog>, policy: LicensingSettings) -> Self {
        Self {
            pricing: PricingCalculator::new(catalog, &policy),
            repo,
            policy,
        }
    }

    /// Validate a license for a tenant and, when given, a camera.
    ///
    /// Empty `camera_id` / `device_id` are treated as absent.
    pub async fn resolve_license(
        &self,
        tenant_id: &str,
        camera_id: &str,
        device_id: &str,
    ) -> Result<LicenseResult, DomainError> {
        info!(tenant_id, camera_id, device_id, "License validation request");
        let now = Utc::now();

        let subscription = self.load_subscription(tenant_id).await?;
        let packs = enabled_pack_names(&self.enabled_packs(tenant_id).await);

        let (result, admitted) = match subscription {
            Some(sub) => self.evaluate(&sub, tenant_id, camera_id, packs, now).await,
            None => {
                info!(tenant_id, "No subscription found, provisioning trial");
                match self.provision_trial(tenant_id, now).await {
                    Ok(Provisioned::Created(sub)) => (self.fresh_trial_result(&sub, packs), true),
                    Ok(Provisioned::Existing(sub)) => {
                        self.evaluate(&sub, tenant_id, camera_id, packs, now).await
                    }
                    Err(e) => {
                        error!(tenant_id, "Trial provisioning failed: {}", e);
                        let sub = Subscription::new_trial(tenant_id, &self.policy, now);
                        (self.fresh_trial_result(&sub, packs), true)
                    }
                }
            }
        };

        // A camera turned away by the trial cap is never registered.
        if !camera_id.is_empty() && admitted {
            let snapshot = CameraLicense::snapshot(
                tenant_id,
                camera_id,
                Some(device_id),
                result.license_mode,
                result.is_valid,
                result.valid_until,
                result.enabled_growth_packs.clone(),
                now,
            );
            if let Err(e) = self.repo.save_camera_license(&snapshot).await {
                warn!(tenant_id, camera_id, "Failed to save camera license: {}", e);
            }
        }

        info!(
            tenant_id,
            camera_id,
            is_valid = result.is_valid,
            mode = result.license_mode.as_str(),
            "License resolved"
        );
        Ok(result)
    }

    /// License overview for a tenant, provisioning a trial on first contact.
    pub async fn license_status(&self, tenant_id: &str) -> Result<LicenseStatus, DomainError> {
        info!(tenant_id, "License status request");
        let now = Utc::now();

        let subscription = self.load_subscription(tenant_id).await?;

        let cameras = self
            .repo
            .get_cameras_by_tenant(tenant_id)
            .await
            .unwrap_or_else(|e| {
                warn!(tenant_id, "Failed to list cameras: {}", e);
                Vec::new()
            });
        let packs = self.enabled_packs(tenant_id).await;

        let sub = match subscription {
            Some(sub) => sub,
            None => match self.provision_trial(tenant_id, now).await {
                Ok(Provisioned::Created(sub)) | Ok(Provisioned::Existing(sub)) => sub,
                Err(e) => {
                    error!(tenant_id, "Trial provisioning failed, reporting unlicensed: {}", e);
                    return Ok(self.unlicensed_status(tenant_id));
                }
            },
        };

        let window = sub.window(now);
        let license_mode = sub.license_mode(now);
        let days_remaining = sub
            .trial_end_date
            .filter(|_| sub.is_trial())
            .map(|end| days_until(end, now));

        Ok(LicenseStatus {
            license_mode,
            is_valid: sub.is_valid_at(now),
            active_cameras: cameras.len() as i64,
            cameras_allowed: sub.cameras_licensed,
            days_remaining,
            valid_until: Some(window.valid_until),
            trial_started_at: sub.trial_start_date.filter(|_| sub.is_trial()),
            enabled_growth_packs: enabled_pack_names(&packs),
            pricing: Some(self.pricing.calculate(cameras.len() as i64, &packs)),
            cameras,
            license_key: mask_license_key(tenant_id),
            can_revoke: license_mode == LicenseMode::Base,
            trial_max_cameras: self.policy.trial_max_cameras,
        })
    }

    async fn load_subscription(&self, tenant_id: &str) -> Result<Option<Subscription>, DomainError> {
        self.repo.get_subscription(tenant_id).await.map_err(|e| {
            error!(tenant_id, "Failed to get subscription: {}", e);
            DomainError::InternalError("Failed to get subscription".to_string())
        })
    }

    async fn enabled_packs(&self, tenant_id: &str) -> Vec<GrowthPackAssignment> {
        self.repo
            .get_enabled_growth_packs(tenant_id)
            .await
            .unwrap_or_else(|e| {
                warn!(tenant_id, "Failed to get growth packs: {}", e);
                Vec::new()
            })
    }

    async fn evaluate(
        &self,
        sub: &Subscription,
        tenant_id: &str,
        camera_id: &str,
        enabled_growth_packs: Vec<String>,
        now: DateTime<Utc>,
    ) -> (LicenseResult, bool) {
        let mut is_valid = sub.status == SubscriptionStatus::Active;
        let license_mode = sub.license_mode(now);

        let admitted = !sub.is_trial()
            || camera_id.is_empty()
            || self.trial_has_room(sub, tenant_id, camera_id).await;
        if !admitted {
            warn!(tenant_id, camera_id, "Trial camera limit exceeded");
            is_valid = false;
        }

        let window = sub.window(now);
        if window.expired {
            debug!(tenant_id, valid_until = %window.valid_until, "License expired");
            is_valid = false;
        }

        let result = LicenseResult {
            is_valid,
            license_mode,
            enabled_growth_packs,
            valid_until: window.valid_until,
            cameras_allowed: sub.cameras_licensed,
        };
        (result, admitted)
    }

    /// A trial at its camera limit still admits cameras that already hold a license.
    async fn trial_has_room(&self, sub: &Subscription, tenant_id: &str, camera_id: &str) -> bool {
        let count = self
            .repo
            .count_cameras_by_tenant(tenant_id)
            .await
            .unwrap_or_else(|e| {
                warn!(tenant_id, "Failed to count cameras: {}", e);
                0
            });
        if count < i64::from(sub.cameras_licensed) {
            return true;
        }

        match self.repo.get_camera_license(camera_id, tenant_id).await {
            Ok(existing) => existing.is_some(),
            Err(e) => {
                warn!(tenant_id, camera_id, "Failed to look up camera license: {}", e);
                false
            }
        }
    }

    fn fresh_trial_result(&self, sub: &Subscription, enabled_growth_packs: Vec<String>) -> LicenseResult {
        LicenseResult {
            is_valid: true,
            license_mode: LicenseMode::Trial,
            enabled_growth_packs,
            valid_until: sub.trial_end_date.unwrap_or(sub.created_at),
            cameras_allowed: self.policy.trial_max_cameras,
        }
    }

    async fn provision_trial(
        &self,
        tenant_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Provisioned, DomainError> {
        self.ensure_tenant(tenant_id, now).await;

        let trial = Subscription::new_trial(tenant_id, &self.policy, now);
        match self.repo.create_subscription(&trial).await {
            Ok(created) => {
                info!(tenant_id, trial_end = ?created.trial_end_date, "Provisioned trial subscription");
                Ok(Provisioned::Created(created))
            }
            Err(DomainError::SubscriptionAlreadyExists(_)) => {
                debug!(tenant_id, "Concurrent trial provisioning, using stored subscription");
                self.repo
                    .get_subscription(tenant_id)
                    .await?
                    .map(Provisioned::Existing)
                    .ok_or_else(|| {
                        DomainError::InternalError(format!(
                            "subscription for {} vanished after conflict",
                            tenant_id
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Creates the placeholder tenant if missing. Failures are logged only.
    async fn ensure_tenant(&self, tenant_id: &str, now: DateTime<Utc>) {
        match self.repo.get_tenant(tenant_id).await {
            Ok(Some(_)) => return,
            Ok(None) => {}
            Err(e) => warn!(tenant_id, "Failed to look up tenant: {}", e),
        }

        match self.repo.create_tenant(&Tenant::auto_created(tenant_id, now)).await {
            Ok(_) => info!(tenant_id, "Auto-created tenant"),
            Err(DomainError::TenantAlreadyExists(_)) => {}
            Err(e) => warn!(tenant_id, "Failed to auto-create tenant: {}", e),
        }
    }

    fn unlicensed_status(&self, tenant_id: &str) -> LicenseStatus {
        LicenseStatus {
            license_mode: LicenseMode::Unlicensed,
            is_valid: false,
            active_cameras: 0,
            cameras_allowed: 0,
            days_remaining: None,
            valid_until: None,
            trial_started_at: None,
            enabled_growth_packs: Vec::new(),
            cameras: Vec::new(),
            pricing: None,
            license_key: mask_license_key(tenant_id),
            can_revoke: false,
            trial_max_cameras: self.policy.trial_max_cameras,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingCycle, Plan};
    use crate::repositories::MockBillingRepository;
    use chrono::Duration;

    fn service(mock: MockBillingRepository) -> LicenseService<MockBillingRepository> {
        LicenseService::new(
            Arc::new(mock),
            Arc::new(Catalog::default()),
            LicensingSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_subscription_read_failure_is_internal() {
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(|_| Err(DomainError::DatabaseError("connection refused".into())));

        let err = service(mock)
            .resolve_license("tenant-1", "cam-1", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InternalError(_)));
    }

    #[tokio::test]
    async fn test_losing_provisioning_race_uses_stored_subscription() {
        let now = Utc::now();
        let winner = Subscription::new_paid("tenant-1", Plan::Base, 8, BillingCycle::Monthly, now);
        let stored = winner.clone();

        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_get_subscription()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        mock.expect_get_enabled_growth_packs().returning(|_| Ok(vec![]));
        mock.expect_get_tenant()
            .returning(|id| Ok(Some(Tenant::auto_created(id, Utc::now()))));
        mock.expect_create_subscription()
            .returning(|sub| Err(DomainError::SubscriptionAlreadyExists(sub.tenant_id.clone())));

        let result = service(mock).resolve_license("tenant-1", "", "").await.unwrap();
        assert_eq!(result.license_mode, LicenseMode::Base);
        assert_eq!(result.cameras_allowed, 8);
        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_storage_failures_degrade() {
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription().returning(|_| Ok(None));
        mock.expect_get_enabled_growth_packs()
            .returning(|_| Err(DomainError::DatabaseError("timeout".into())));
        mock.expect_get_tenant()
            .returning(|_| Err(DomainError::DatabaseError("timeout".into())));
        mock.expect_create_tenant()
            .returning(|_| Err(DomainError::DatabaseError("timeout".into())));
        mock.expect_create_subscription()
            .returning(|_| Err(DomainError::DatabaseError("timeout".into())));
        mock.expect_save_camera_license()
            .times(1)
            .returning(|_| Err(DomainError::DatabaseError("timeout".into())));

        let before = Utc::now();
        let result = service(mock)
            .resolve_license("tenant-1", "cam-1", "dev-1")
            .await
            .unwrap();

        assert!(result.is_valid);
        assert_eq!(result.license_mode, LicenseMode::Trial);
        assert!(result.enabled_growth_packs.is_empty());
        assert!(result.valid_until >= before + Duration::days(90));
    }

    #[tokio::test]
    async fn test_status_reports_unlicensed_when_provisioning_fails() {
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription().returning(|_| Ok(None));
        mock.expect_get_cameras_by_tenant().returning(|_| Ok(vec![]));
        mock.expect_get_enabled_growth_packs().returning(|_| Ok(vec![]));
        mock.expect_get_tenant().returning(|_| Ok(None));
        mock.expect_create_tenant().returning(|t| Ok(t.clone()));
        mock.expect_create_subscription()
            .returning(|_| Err(DomainError::DatabaseError("disk full".into())));

        let status = service(mock).license_status("tenant-abcdefgh").await.unwrap();
        assert_eq!(status.license_mode, LicenseMode::Unlicensed);
        assert!(!status.is_valid);
        assert_eq!(status.cameras_allowed, 0);
        assert!(status.cameras.is_empty());
        assert!(status.pricing.is_none());
        assert_eq!(status.license_key, "***********efgh");
    }

    #[tokio::test]
    async fn test_expiry_applies_regardless_of_status() {
        let now = Utc::now();
        let mut past_due = Subscription::new_paid("tenant-1", Plan::Base, 4, BillingCycle::Monthly, now);
        past_due.status = SubscriptionStatus::PastDue;
        let mut cancelled = past_due.clone();
        cancelled.status = SubscriptionStatus::Cancelled;
        cancelled.subscription_end_date = Some(now - Duration::days(2));

        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .times(1)
            .returning(move |_| Ok(Some(past_due.clone())));
        mock.expect_get_subscription()
            .times(1)
            .returning(move |_| Ok(Some(cancelled.clone())));
        mock.expect_get_enabled_growth_packs().returning(|_| Ok(vec![]));
        let service = service(mock);

        let within = service.resolve_license("tenant-1", "", "").await.unwrap();
        assert!(!within.is_valid);
        assert_eq!(within.license_mode, LicenseMode::Base);

        let lapsed = service.resolve_license("tenant-1", "", "").await.unwrap();
        assert!(!lapsed.is_valid);
        assert_eq!(lapsed.license_mode, LicenseMode::Expired);
    }

    #[tokio::test]
    async fn test_trial_camera_lookup_failure_counts_as_unregistered() {
        let now = Utc::now();
        let trial = Subscription::new_trial("tenant-1", &LicensingSettings::default(), now);

        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(move |_| Ok(Some(trial.clone())));
        mock.expect_get_enabled_growth_packs().returning(|_| Ok(vec![]));
        mock.expect_count_cameras_by_tenant().returning(|_| Ok(2));
        mock.expect_get_camera_license()
            .returning(|_, _| Err(DomainError::DatabaseError("timeout".into())));
        mock.expect_save_camera_license().never();

        let result = service(mock)
            .resolve_license("tenant-1", "cam-3", "")
            .await
            .unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.license_mode, LicenseMode::Trial);
    }
}
