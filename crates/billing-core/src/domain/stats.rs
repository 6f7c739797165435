use serde::{Deserialize, Serialize};

/// Record counts per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub tenants: i64,
    pub usage_events: i64,
    pub cameras: i64,
    pub devices: i64,
}
