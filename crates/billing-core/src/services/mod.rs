//! Domain services (business logic)

pub mod admin_service;
pub mod device_service;
pub mod entitlement_service;
pub mod license_service;
pub mod pricing_service;
pub mod revocation_service;
pub mod subscription_service;
pub mod usage_service;

pub use admin_service::{
    AdminService, EntitlementOverride, NewSubscription, NewTenant, SubscriptionUpdate,
    TenantUpdate,
};
pub use device_service::{DeviceService, Heartbeat, HeartbeatAck};
pub use entitlement_service::{EntitlementResult, EntitlementService, EntitlementSource};
pub use license_service::{LicenseResult, LicenseService, LicenseStatus};
pub use pricing_service::{PricingBreakdown, PricingCalculator, PricingConfig};
pub use revocation_service::{RevocationResult, RevocationService};
pub use subscription_service::{PackDetail, SubscriptionService, SubscriptionSummary};
pub use usage_service::{NewUsageEvent, UsageBatchResult, UsageReport, UsageService};
