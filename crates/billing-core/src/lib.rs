//! # Billing Core
//!
//! Domain entities, license resolution services, and the storage port for the
//! edge billing server.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use catalog::Catalog;
pub use domain::*;
pub use error::{DomainError, ErrorKind};
