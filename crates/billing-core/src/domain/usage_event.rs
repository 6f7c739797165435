// ============================================================================
// Billing Core - Usage Event
// File: crates/billing-core/src/domain/usage_event.rs
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only metering record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub tenant_id: String,
    pub event_type: String,
    pub resource_id: String,
    pub quantity: f64,
    pub unit: String,
    pub event_time: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Summed quantity per event type.
pub type UsageSummary = BTreeMap<String, f64>;
