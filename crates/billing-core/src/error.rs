//! Domain errors

use thiserror::Error;

/// Coarse classification used by the transport layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error("Tenant already exists: {0}")]
    TenantAlreadyExists(String),

    #[error("Subscription not found for tenant: {0}")]
    SubscriptionNotFound(String),

    #[error("Subscription already exists for tenant: {0}")]
    SubscriptionAlreadyExists(String),

    #[error("Cannot revoke a trial license")]
    CannotRevokeTrial,

    #[error("Unknown growth pack: {0}")]
    UnknownGrowthPack(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::TenantNotFound(_) | DomainError::SubscriptionNotFound(_) => {
                ErrorKind::NotFound
            }
            DomainError::CannotRevokeTrial
            | DomainError::UnknownGrowthPack(_)
            | DomainError::ValidationError(_) => ErrorKind::InvalidRequest,
            DomainError::TenantAlreadyExists(_) | DomainError::SubscriptionAlreadyExists(_) => {
                ErrorKind::Conflict
            }
            DomainError::DatabaseError(_) | DomainError::InternalError(_) => ErrorKind::Internal,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
