// ============================================================================
// Billing Core - Revocation Service
// File: crates/billing-core/src/services/revocation_service.rs
// ============================================================================
//! Downgrade of a paid subscription back to trial terms.
//!
//! Trial dates already on the record are kept, so a tenant can never earn a
//! fresh trial window by being revoked.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use billing_shared::config::LicensingSettings;
use billing_shared::utils::{days_until, pluralize};

use crate::domain::{Plan, SubscriptionStatus};
use crate::error::DomainError;
use crate::repositories::BillingRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevocationResult {
    pub success: bool,
    pub message: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub days_remaining: Option<i64>,
    pub trial_expired: bool,
    pub cameras_allowed: i32,
    pub current_cameras: i64,
    pub cameras_over_limit: i64,
    pub action_required: bool,
    pub action_message: String,
}

pub struct RevocationService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
    policy: LicensingSettings,
}

impl<R: BillingRepository + ?Sized> RevocationService<R> {
    pub fn new(repo: Arc<R>, policy: LicensingSettings) -> Self {
        Self { repo, policy }
    }

    pub async fn revoke_license(&self, tenant_id: &str) -> Result<RevocationResult, DomainError> {
        info!(tenant_id, "License revocation request");
        let now = Utc::now();

        let mut sub = self
            .repo
            .get_subscription(tenant_id)
            .await
            .map_err(|e| {
                error!(tenant_id, "Failed to get subscription: {}", e);
                DomainError::InternalError("Failed to get subscription".to_string())
            })?
            .ok_or_else(|| DomainError::SubscriptionNotFound(tenant_id.to_string()))?;

        if sub.is_trial() {
            warn!(tenant_id, "Refusing to revoke a trial license");
            return Err(DomainError::CannotRevokeTrial);
        }

        let current_cameras = self
            .repo
            .count_cameras_by_tenant(tenant_id)
            .await
            .unwrap_or_else(|e| {
                warn!(tenant_id, "Failed to count cameras: {}", e);
                0
            });
        let trial_max = self.policy.trial_max_cameras;
        let cameras_over_limit = (current_cameras - i64::from(trial_max)).max(0);

        sub.plan = Plan::Trial;
        sub.status = SubscriptionStatus::Active;
        sub.cameras_licensed = trial_max;
        if !sub.has_trial_dates() {
            sub.trial_start_date = Some(now);
            sub.trial_end_date = Some(now + Duration::days(self.policy.trial_duration_days));
        }
        if sub.trial_end_date.is_some_and(|end| end < now) {
            sub.status = SubscriptionStatus::Expired;
        }
        sub.subscription_start_date = None;
        sub.subscription_end_date = None;
        sub.updated_at = now;

        self.repo.update_subscription(&sub).await.map_err(|e| {
            error!(tenant_id, "Failed to update subscription: {}", e);
            DomainError::InternalError("Failed to revoke license".to_string())
        })?;

        self.disable_all_packs(tenant_id).await;

        let days_remaining = sub.trial_end_date.map(|end| days_until(end, now).max(0));
        info!(
            tenant_id,
            ?days_remaining,
            cameras_over_limit,
            "License revoked, reverted to trial"
        );

        Ok(RevocationResult {
            success: true,
            message: "License revoked. Reverted to trial mode.".to_string(),
            plan: sub.plan,
            status: sub.status,
            days_remaining,
            trial_expired: sub.status == SubscriptionStatus::Expired,
            cameras_allowed: trial_max,
            current_cameras,
            cameras_over_limit,
            action_required: cameras_over_limit > 0,
            action_message: action_message(cameras_over_limit),
        })
    }

    async fn disable_all_packs(&self, tenant_id: &str) {
        let packs = match self.repo.get_enabled_growth_packs(tenant_id).await {
            Ok(packs) => packs,
            Err(e) => {
                warn!(tenant_id, "Failed to list growth packs for revocation: {}", e);
                return;
            }
        };
        for pack in packs {
            if let Err(e) = self.repo.disable_growth_pack(tenant_id, &pack.pack_name).await {
                warn!(tenant_id, pack = %pack.pack_name, "Failed to disable growth pack: {}", e);
            }
        }
    }
}

pub fn action_message(cameras_to_stop: i64) -> String {
    if cameras_to_stop <= 0 {
        return String::new();
    }
    format!(
        "Please stop {} to comply with trial limits.",
        pluralize(cameras_to_stop, "camera")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingCycle, GrowthPackAssignment, Subscription};
    use crate::repositories::MockBillingRepository;

    fn base_subscription() -> Subscription {
        Subscription::new_paid("tenant-1", Plan::Base, 10, BillingCycle::Monthly, Utc::now())
    }

    #[test]
    fn test_action_message() {
        assert_eq!(action_message(0), "");
        assert_eq!(action_message(1), "Please stop 1 camera to comply with trial limits.");
        assert_eq!(action_message(3), "Please stop 3 cameras to comply with trial limits.");
    }

    #[tokio::test]
    async fn test_update_failure_leaves_packs_untouched() {
        let sub = base_subscription();
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(move |_| Ok(Some(sub.clone())));
        mock.expect_count_cameras_by_tenant().returning(|_| Ok(1));
        mock.expect_update_subscription()
            .returning(|_| Err(DomainError::DatabaseError("write failed".into())));
        mock.expect_get_enabled_growth_packs().never();
        mock.expect_disable_growth_pack().never();

        let service = RevocationService::new(Arc::new(mock), LicensingSettings::default());
        let err = service.revoke_license("tenant-1").await.unwrap_err();
        assert!(matches!(err, DomainError::InternalError(_)));
    }

    #[tokio::test]
    async fn test_pack_disable_failure_is_tolerated() {
        let sub = base_subscription();
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(move |_| Ok(Some(sub.clone())));
        mock.expect_count_cameras_by_tenant().returning(|_| Ok(5));
        mock.expect_update_subscription().returning(|s| Ok(s.clone()));
        mock.expect_get_enabled_growth_packs().returning(|t| {
            Ok(vec![
                GrowthPackAssignment::enabled(t, "Retail", None, Utc::now()),
                GrowthPackAssignment::enabled(t, "Intelligence", None, Utc::now()),
            ])
        });
        mock.expect_disable_growth_pack()
            .times(2)
            .returning(|_, _| Err(DomainError::DatabaseError("write failed".into())));

        let service = RevocationService::new(Arc::new(mock), LicensingSettings::default());
        let result = service.revoke_license("tenant-1").await.unwrap();

        assert!(result.success);
        assert_eq!(result.plan, Plan::Trial);
        assert_eq!(result.cameras_over_limit, 3);
        assert_eq!(result.days_remaining, Some(90));
    }

    #[tokio::test]
    async fn test_lapsed_trial_dates_revoke_to_expired() {
        let now = Utc::now();
        let mut sub = base_subscription();
        sub.trial_start_date = Some(now - Duration::days(120));
        sub.trial_end_date = Some(now - Duration::days(30));
        let lapsed_end = sub.trial_end_date;

        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription()
            .returning(move |_| Ok(Some(sub.clone())));
        mock.expect_count_cameras_by_tenant().returning(|_| Ok(2));
        mock.expect_update_subscription()
            .withf(move |s| {
                s.status == SubscriptionStatus::Expired
                    && s.plan == Plan::Trial
                    && s.trial_end_date == lapsed_end
            })
            .times(1)
            .returning(|s| Ok(s.clone()));
        mock.expect_get_enabled_growth_packs().returning(|_| Ok(vec![]));

        let service = RevocationService::new(Arc::new(mock), LicensingSettings::default());
        let result = service.revoke_license("tenant-1").await.unwrap();

        assert_eq!(result.status, SubscriptionStatus::Expired);
        assert!(result.trial_expired);
        assert_eq!(result.days_remaining, Some(0));
        assert_eq!(result.cameras_over_limit, 0);
        assert!(!result.action_required);
    }

    #[tokio::test]
    async fn test_missing_subscription_is_not_found() {
        let mut mock = MockBillingRepository::new();
        mock.expect_get_subscription().returning(|_| Ok(None));

        let service = RevocationService::new(Arc::new(mock), LicensingSettings::default());
        let err = service.revoke_license("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::SubscriptionNotFound(_)));
    }
}
