//! End-to-end billing flows against the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use billing_core::domain::{GrowthPackAssignment, LicenseMode, Plan, Subscription, SubscriptionStatus};
use billing_core::error::DomainError;
use billing_core::repositories::BillingRepository;
use billing_core::services::{
    EntitlementService, EntitlementSource, LicenseService, NewUsageEvent, RevocationService,
    UsageService,
};
use billing_core::{Catalog, Quota};
use billing_infrastructure::MemoryBillingRepository;
use billing_shared::config::LicensingSettings;

fn setup() -> (Arc<MemoryBillingRepository>, LicenseService<MemoryBillingRepository>) {
    let repo = Arc::new(MemoryBillingRepository::new());
    let service = LicenseService::new(
        repo.clone(),
        Arc::new(Catalog::default()),
        LicensingSettings::default(),
    );
    (repo, service)
}

fn paid(tenant_id: &str) -> Subscription {
    Subscription::new_paid(tenant_id, Plan::Base, 10, Default::default(), Utc::now())
}

#[tokio::test]
async fn test_new_tenant_gets_trial() {
    let (repo, service) = setup();
    let before = Utc::now();

    let result = service.resolve_license("tenant-new", "", "").await.unwrap();

    assert!(result.is_valid);
    assert_eq!(result.license_mode, LicenseMode::Trial);
    assert_eq!(result.cameras_allowed, 2);
    let expected = before + Duration::days(90);
    assert!((result.valid_until - expected).num_seconds().abs() <= 1);

    let stored = repo.get_subscription("tenant-new").await.unwrap().unwrap();
    assert_eq!(stored.plan, Plan::Trial);
    assert!(repo.get_tenant("tenant-new").await.unwrap().is_some());
}

#[tokio::test]
async fn test_trial_camera_limit() {
    let (repo, service) = setup();

    assert!(service.resolve_license("t1", "cam-1", "dev-1").await.unwrap().is_valid);
    assert!(service.resolve_license("t1", "cam-2", "dev-1").await.unwrap().is_valid);

    let third = service.resolve_license("t1", "cam-3", "dev-1").await.unwrap();
    assert!(!third.is_valid);
    assert_eq!(third.license_mode, LicenseMode::Trial);

    // Retrying a refused camera does not register it.
    let retry = service.resolve_license("t1", "cam-3", "dev-1").await.unwrap();
    assert!(!retry.is_valid);
    assert_eq!(repo.count_cameras_by_tenant("t1").await.unwrap(), 2);
    assert!(repo.get_camera_license("cam-3", "t1").await.unwrap().is_none());
    assert_eq!(service.license_status("t1").await.unwrap().active_cameras, 2);

    // Registered cameras keep validating.
    assert!(service.resolve_license("t1", "cam-1", "dev-1").await.unwrap().is_valid);
    assert!(service.resolve_license("t1", "cam-2", "dev-1").await.unwrap().is_valid);
}

#[tokio::test]
async fn test_expired_trial() {
    let (repo, service) = setup();
    let now = Utc::now();
    let mut sub = Subscription::new_trial("t1", &LicensingSettings::default(), now - Duration::days(100));
    sub.status = SubscriptionStatus::Active;
    repo.create_subscription(&sub).await.unwrap();

    let result = service.resolve_license("t1", "cam-1", "").await.unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.license_mode, LicenseMode::Expired);

    let status = service.license_status("t1").await.unwrap();
    assert!(!status.is_valid);
    assert_eq!(status.license_mode, LicenseMode::Expired);
    assert_eq!(status.active_cameras, 1);
}

#[tokio::test]
async fn test_revocation_keeps_trial_dates() {
    let repo = Arc::new(MemoryBillingRepository::new());
    let revocation = RevocationService::new(repo.clone(), LicensingSettings::default());

    let now = Utc::now();
    let mut sub = paid("t1");
    sub.trial_start_date = Some(now - Duration::days(10));
    sub.trial_end_date = Some(now + Duration::days(80));
    let original = (sub.trial_start_date, sub.trial_end_date);
    repo.create_subscription(&sub).await.unwrap();

    let first = revocation.revoke_license("t1").await.unwrap();
    assert_eq!(first.plan, Plan::Trial);

    // Upgrade again and revoke a second time.
    let mut upgraded = repo.get_subscription("t1").await.unwrap().unwrap();
    upgraded.plan = Plan::Base;
    repo.update_subscription(&upgraded).await.unwrap();
    revocation.revoke_license("t1").await.unwrap();

    let stored = repo.get_subscription("t1").await.unwrap().unwrap();
    assert_eq!((stored.trial_start_date, stored.trial_end_date), original);
}

#[tokio::test]
async fn test_revocation_over_limit() {
    let (repo, service) = setup();
    let revocation = RevocationService::new(repo.clone(), LicensingSettings::default());

    service.resolve_license("trial-tenant", "", "").await.unwrap();
    let err = revocation.revoke_license("trial-tenant").await.unwrap_err();
    assert!(matches!(err, DomainError::CannotRevokeTrial));

    repo.create_subscription(&paid("t1")).await.unwrap();
    repo.enable_growth_pack(&GrowthPackAssignment::enabled("t1", "Retail", None, Utc::now()))
        .await
        .unwrap();
    for n in 1..=5 {
        let result = service
            .resolve_license("t1", &format!("cam-{}", n), "dev-1")
            .await
            .unwrap();
        assert!(result.is_valid);
    }

    let result = revocation.revoke_license("t1").await.unwrap();
    assert_eq!(result.current_cameras, 5);
    assert_eq!(result.cameras_over_limit, 3);
    assert!(result.action_required);
    assert_eq!(
        result.action_message,
        "Please stop 3 cameras to comply with trial limits."
    );
    assert!(repo.get_enabled_growth_packs("t1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_base_feature_resolution() {
    let repo = Arc::new(MemoryBillingRepository::new());
    let catalog = Arc::new(Catalog::default());
    let (category, feature) = {
        let (category, features) = catalog
            .base_features()
            .iter()
            .next()
            .expect("catalog has base features");
        (category.clone(), features[0].clone())
    };
    let service = EntitlementService::new(repo, catalog);

    let result = service
        .check_entitlement("t1", &category, &feature)
        .await
        .unwrap();
    assert!(result.is_enabled);
    assert_eq!(result.source, EntitlementSource::Base);
    assert_eq!(result.quota_remaining, Quota::Unlimited);
}

#[tokio::test]
async fn test_usage_totals() {
    let repo = Arc::new(MemoryBillingRepository::new());
    let usage = UsageService::new(repo);
    let at = Some(Utc::now() - Duration::hours(1));

    let batch = vec![
        NewUsageEvent {
            tenant_id: "t1".into(),
            event_type: "api_call".into(),
            quantity: 5.0,
            event_time: at,
            ..Default::default()
        },
        NewUsageEvent {
            tenant_id: "t1".into(),
            event_type: "api_call".into(),
            quantity: 10.0,
            event_time: at,
            ..Default::default()
        },
    ];
    let result = usage.report_batch(batch).await;
    assert_eq!(result.accepted_count, 2);

    let report = usage.summary("t1", None, None).await.unwrap();
    assert_eq!(report.totals.get("api_call"), Some(&15.0));
    assert_eq!(report.api_calls, Some(15));
}

#[tokio::test]
async fn test_concurrent_first_contact_single_subscription() {
    let (repo, service) = setup();
    let service = Arc::new(service);

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .resolve_license("busy-tenant", &format!("cam-{}", n % 2), "dev-1")
                    .await
            })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.license_mode, LicenseMode::Trial);
    }

    let stats = repo.get_stats().await.unwrap();
    assert_eq!(stats.tenants, 1);
    assert_eq!(repo.count_cameras_by_tenant("busy-tenant").await.unwrap(), 2);
}
