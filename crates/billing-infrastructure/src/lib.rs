//! # Billing Infrastructure
//!
//! Storage adapters for the billing port: PostgreSQL and in-memory.

pub mod database;
pub mod memory;

pub use database::{create_pool, ensure_schema, PgBillingRepository};
pub use memory::MemoryBillingRepository;
