mod rows;

pub mod billing_repo_impl;

pub use billing_repo_impl::PgBillingRepository;
