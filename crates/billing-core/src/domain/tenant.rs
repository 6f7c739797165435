// ============================================================================
// Billing Core - Tenant Entity
// File: crates/billing-core/src/domain/tenant.rs
// Description: Billing customer / organization
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use billing_shared::constants::AUTO_CREATED_TENANT_NAME;

/// Tenant status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[default]
    Active,
    Suspended,
    Cancelled,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(TenantStatus::Active),
            "suspended" => Some(TenantStatus::Suspended),
            "cancelled" => Some(TenantStatus::Cancelled),
            _ => None,
        }
    }
}

/// Tenant entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Tenant {
    #[validate(length(min = 1, max = 255, message = "Tenant id must be between 1 and 255 characters"))]
    pub id: String,

    #[validate(length(min = 1, max = 255, message = "Tenant name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub api_key: Option<String>,
    pub status: TenantStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(
        id: String,
        name: String,
        email: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let tenant = Self {
            id,
            name: name.trim().to_string(),
            email: email.map(|e| e.trim().to_lowercase()),
            api_key,
            status: TenantStatus::Active,
            created_at: now,
            updated_at: now,
        };

        tenant.validate()?;
        Ok(tenant)
    }

    /// Placeholder tenant created on first contact from an unknown tenant id.
    pub fn auto_created(id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: AUTO_CREATED_TENANT_NAME.to_string(),
            email: None,
            api_key: None,
            status: TenantStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tenant() {
        let tenant = Tenant::new(
            "tenant-1".to_string(),
            " Acme Traffic ".to_string(),
            Some("Ops@Acme.example".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(tenant.name, "Acme Traffic");
        assert_eq!(tenant.email.as_deref(), Some("ops@acme.example"));
        assert!(tenant.is_active());
    }

    #[test]
    fn test_rejects_invalid_email() {
        let tenant = Tenant::new(
            "tenant-1".to_string(),
            "Acme".to_string(),
            Some("not-an-email".to_string()),
            None,
        );
        assert!(tenant.is_err());
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(TenantStatus::from_str("Suspended"), Some(TenantStatus::Suspended));
        assert_eq!(TenantStatus::from_str("deleted"), None);
    }
}
