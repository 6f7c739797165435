// ============================================================================
// Billing Core - Subscription Entity
// File: crates/billing-core/src/domain/subscription.rs
// Description: Tenant subscription with trial / paid windows
// ============================================================================

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use billing_shared::config::LicensingSettings;
use billing_shared::constants::DEFAULT_BILLING_CYCLE;
use billing_shared::new_id;

use super::camera_license::LicenseMode;

/// Subscription plan enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Trial,
    Base,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Trial => "trial",
            Plan::Base => "base",
            Plan::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trial" => Some(Plan::Trial),
            "base" => Some(Plan::Base),
            "enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Trial)
    }
}

/// Subscription status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(SubscriptionStatus::Active),
            "trialing" => Some(SubscriptionStatus::Trialing),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "expired" => Some(SubscriptionStatus::Expired),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

/// Billing cycle enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Annual => "annual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(BillingCycle::Monthly),
            "annual" => Some(BillingCycle::Annual),
            _ => None,
        }
    }
}

impl Default for BillingCycle {
    fn default() -> Self {
        // Keep in sync with the persisted column default.
        BillingCycle::from_str(DEFAULT_BILLING_CYCLE).unwrap_or(BillingCycle::Monthly)
    }
}

/// Outcome of evaluating a subscription's validity window at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseWindow {
    pub valid_until: DateTime<Utc>,
    pub expired: bool,
}

/// Subscription entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub tenant_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub cameras_licensed: i32,

    pub trial_start_date: Option<DateTime<Utc>>,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,

    pub billing_cycle: BillingCycle,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Fresh trial starting at `now`.
    pub fn new_trial(tenant_id: &str, policy: &LicensingSettings, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            plan: Plan::Trial,
            status: SubscriptionStatus::Active,
            cameras_licensed: policy.trial_max_cameras,
            trial_start_date: Some(now),
            trial_end_date: Some(now + Duration::days(policy.trial_duration_days)),
            subscription_start_date: None,
            subscription_end_date: None,
            billing_cycle: BillingCycle::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Paid subscription running one year from `now`.
    pub fn new_paid(
        tenant_id: &str,
        plan: Plan,
        cameras_licensed: i32,
        billing_cycle: BillingCycle,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            plan,
            status: SubscriptionStatus::Active,
            cameras_licensed,
            trial_start_date: None,
            trial_end_date: None,
            subscription_start_date: Some(now),
            subscription_end_date: Some(one_year_from(now)),
            billing_cycle,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_trial(&self) -> bool {
        self.plan == Plan::Trial
    }

    pub fn has_trial_dates(&self) -> bool {
        self.trial_start_date.is_some() || self.trial_end_date.is_some()
    }

    /// Trial plans run to `trial_end_date`, paid plans to `subscription_end_date`;
    /// anything without an applicable end date is treated as valid for one year.
    pub fn window(&self, now: DateTime<Utc>) -> LicenseWindow {
        let end = if self.is_trial() {
            self.trial_end_date
        } else {
            self.subscription_end_date
        };
        match end {
            Some(valid_until) => LicenseWindow {
                valid_until,
                expired: now > valid_until,
            },
            None => LicenseWindow {
                valid_until: one_year_from(now),
                expired: false,
            },
        }
    }

    /// Mode reported to devices: the plan, or `expired` once the window has closed.
    pub fn license_mode(&self, now: DateTime<Utc>) -> LicenseMode {
        if self.window(now).expired {
            LicenseMode::Expired
        } else {
            LicenseMode::from(self.plan)
        }
    }

    /// Status-derived validity combined with the expiry window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && !self.window(now).expired
    }
}

pub fn one_year_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(12))
        .unwrap_or_else(|| now + Duration::days(365))
}
