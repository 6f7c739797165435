//! Common types

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier used for stored records (tenant ids are caller-supplied strings).
pub type RecordId = String;

pub fn new_id() -> RecordId {
    Uuid::new_v4().to_string()
}

/// Inclusive time window used for usage aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}
