// ============================================================================
// Billing Core - Usage Service
// File: crates/billing-core/src/services/usage_service.rs
// ============================================================================
//! Usage metering: batch ingestion and per-period aggregation

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use billing_shared::Period;

use crate::domain::{UsageEvent, UsageSummary};
use crate::error::DomainError;
use crate::repositories::BillingRepository;

/// Event as reported by a device, before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct NewUsageEvent {
    pub tenant_id: String,
    pub event_type: String,
    pub resource_id: String,
    pub quantity: f64,
    pub unit: String,
    pub event_time: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageBatchResult {
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub tenant_id: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub totals: UsageSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_calls: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_tokens_used: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_gb_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_sent: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_executions: Option<i64>,
}

pub struct UsageService<R: BillingRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BillingRepository + ?Sized> UsageService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Appends the valid events of a batch in input order.
    ///
    /// Events missing a tenant or event type are rejected individually; a
    /// storage failure rejects the whole batch.
    pub async fn report_batch(&self, batch: Vec<NewUsageEvent>) -> UsageBatchResult {
        info!(events = batch.len(), "Usage batch received");
        let now = Utc::now();
        let total = batch.len();

        let mut errors = Vec::new();
        let mut accepted = Vec::with_capacity(total);
        for (index, event) in batch.into_iter().enumerate() {
            if event.tenant_id.trim().is_empty() {
                errors.push(format!("event {}: tenant_id is required", index));
                continue;
            }
            if event.event_type.trim().is_empty() {
                errors.push(format!("event {}: event_type is required", index));
                continue;
            }
            debug!(
                tenant_id = %event.tenant_id,
                event_type = %event.event_type,
                quantity = event.quantity,
                "Usage event"
            );
            accepted.push(UsageEvent {
                tenant_id: event.tenant_id,
                event_type: event.event_type,
                resource_id: event.resource_id,
                quantity: event.quantity,
                unit: event.unit,
                event_time: event.event_time.unwrap_or(now),
                metadata: event.metadata,
            });
        }

        if !errors.is_empty() {
            warn!(rejected = errors.len(), "Rejected invalid usage events");
        }

        if !accepted.is_empty() {
            if let Err(e) = self.repo.save_usage_events(&accepted).await {
                error!("Failed to save usage events: {}", e);
                return UsageBatchResult {
                    accepted_count: 0,
                    rejected_count: total,
                    errors: vec!["Failed to store usage events".to_string()],
                };
            }
        }

        UsageBatchResult {
            accepted_count: accepted.len(),
            rejected_count: total - accepted.len(),
            errors,
        }
    }

    /// Totals per event type over `[start, end]`, defaulting to the last month.
    pub async fn summary(
        &self,
        tenant_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<UsageReport, DomainError> {
        let now = Utc::now();
        let period = Period::new(
            start.unwrap_or_else(|| now.checked_sub_months(Months::new(1)).unwrap_or(now)),
            end.unwrap_or(now),
        );
        info!(tenant_id, start = %period.start, end = %period.end, "Usage summary request");

        let totals = self
            .repo
            .get_usage_summary(tenant_id, period.start, period.end)
            .await
            .map_err(|e| {
                error!(tenant_id, "Failed to get usage summary: {}", e);
                DomainError::InternalError("Failed to get usage summary".to_string())
            })?;

        let count = |event_type: &str| totals.get(event_type).map(|v| *v as i64);

        Ok(UsageReport {
            tenant_id: tenant_id.to_string(),
            period_start: period.start,
            period_end: period.end,
            api_calls: count("api_call"),
            llm_tokens_used: count("llm_tokens"),
            storage_gb_days: totals.get("storage_gb_days").copied(),
            sms_sent: count("sms_sent"),
            agent_executions: count("agent_execution"),
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockBillingRepository;

    fn event(tenant_id: &str, event_type: &str, quantity: f64) -> NewUsageEvent {
        NewUsageEvent {
            tenant_id: tenant_id.to_string(),
            event_type: event_type.to_string(),
            quantity,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_events_are_rejected_individually() {
        let mut mock = MockBillingRepository::new();
        mock.expect_save_usage_events()
            .withf(|events| events.len() == 1 && events[0].event_type == "api_call")
            .times(1)
            .returning(|_| Ok(()));

        let result = UsageService::new(Arc::new(mock))
            .report_batch(vec![
                event("tenant-1", "api_call", 5.0),
                event("", "api_call", 1.0),
                event("tenant-1", " ", 1.0),
            ])
            .await;

        assert_eq!(result.accepted_count, 1);
        assert_eq!(result.rejected_count, 2);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("tenant_id"));
    }

    #[tokio::test]
    async fn test_storage_failure_rejects_batch() {
        let mut mock = MockBillingRepository::new();
        mock.expect_save_usage_events()
            .returning(|_| Err(DomainError::DatabaseError("write failed".into())));

        let result = UsageService::new(Arc::new(mock))
            .report_batch(vec![event("tenant-1", "api_call", 5.0), event("tenant-1", "sms_sent", 1.0)])
            .await;

        assert_eq!(result.accepted_count, 0);
        assert_eq!(result.rejected_count, 2);
        assert_eq!(result.errors, vec!["Failed to store usage events"]);
    }

    #[tokio::test]
    async fn test_summary_projections() {
        let mut mock = MockBillingRepository::new();
        mock.expect_get_usage_summary().returning(|_, _, _| {
            let mut totals = UsageSummary::new();
            totals.insert("api_call".into(), 15.0);
            totals.insert("storage_gb_days".into(), 2.5);
            Ok(totals)
        });

        let report = UsageService::new(Arc::new(mock))
            .summary("tenant-1", None, None)
            .await
            .unwrap();

        assert_eq!(report.api_calls, Some(15));
        assert_eq!(report.storage_gb_days, Some(2.5));
        assert!(report.sms_sent.is_none());
        assert!(report.period_start < report.period_end);
    }
}
