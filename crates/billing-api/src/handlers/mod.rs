//! HTTP handlers

pub mod admin;
pub mod billing;
pub mod device;
pub mod health;
