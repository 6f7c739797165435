pub mod camera_license;
pub mod edge_device;
pub mod entitlement;
pub mod growth_pack;
pub mod stats;
pub mod subscription;
pub mod tenant;
pub mod usage_event;

pub use camera_license::{CameraLicense, LicenseMode};
pub use edge_device::{DeviceStatus, EdgeDevice, ManagementTier};
pub use entitlement::{FeatureEntitlement, Quota};
pub use growth_pack::{enabled_pack_names, GrowthPackAssignment};
pub use stats::StoreStats;
pub use subscription::{BillingCycle, LicenseWindow, Plan, Subscription, SubscriptionStatus};
pub use tenant::{Tenant, TenantStatus};
pub use usage_event::{UsageEvent, UsageSummary};
