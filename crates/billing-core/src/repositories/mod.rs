//! Repository traits (ports)

pub mod billing_repository;

pub use billing_repository::BillingRepository;

#[cfg(test)]
pub use billing_repository::MockBillingRepository;
