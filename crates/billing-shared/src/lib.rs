//! # Billing Shared
//! 
//! Shared utilities, configuration, and telemetry for the billing server.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
