//! # Billing API
//!
//! HTTP handlers, middleware, DTOs, and router for the edge billing server.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
