//! Application-wide constants

/// Maximum cameras a trial subscription may register.
pub const TRIAL_MAX_CAMERAS: i32 = 2;
/// Length of a trial window in days.
pub const TRIAL_DURATION_DAYS: i64 = 90;
/// Base license per camera per month (AUD).
pub const BASE_PER_CAMERA_RATE: f64 = 14.99;
pub const DEFAULT_CURRENCY: &str = "AUD";
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 900;

/// Cameras granted to a paid subscription created without an explicit count.
pub const DEFAULT_PAID_CAMERAS: i32 = 10;
pub const DEFAULT_BILLING_CYCLE: &str = "monthly";
pub const AUTO_CREATED_TENANT_NAME: &str = "Auto-created Tenant";

/// Sentinel used on the wire for "no quota limit".
pub const UNLIMITED_QUOTA: i32 = -1;

pub const API_KEY_PREFIX: &str = "bb_";
pub const API_KEY_RANDOM_LEN: usize = 20;

pub const SERVICE_NAME: &str = "brinkbyte-vision-billing";
