//! Database connection pool and schema bootstrap

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

use billing_shared::config::DatabaseSettings;

pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&settings.url)
        .await
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS tenants (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        api_key TEXT UNIQUE,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS subscriptions (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        plan TEXT NOT NULL,
        status TEXT NOT NULL,
        cameras_licensed INT NOT NULL DEFAULT 0,
        trial_start_date TIMESTAMPTZ,
        trial_end_date TIMESTAMPTZ,
        subscription_start_date TIMESTAMPTZ,
        subscription_end_date TIMESTAMPTZ,
        billing_cycle TEXT NOT NULL DEFAULT 'monthly',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    // One subscription per tenant; concurrent trial provisioning relies on it.
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_subscriptions_tenant ON subscriptions(tenant_id)",
    r#"CREATE TABLE IF NOT EXISTS growth_pack_assignments (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        subscription_id TEXT,
        pack_name TEXT NOT NULL,
        is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
        enabled_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        disabled_at TIMESTAMPTZ,
        price_monthly DOUBLE PRECISION,
        CONSTRAINT uq_growth_pack_tenant_pack UNIQUE (tenant_id, pack_name)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS camera_licenses (
        id TEXT PRIMARY KEY,
        camera_id TEXT NOT NULL,
        tenant_id TEXT NOT NULL,
        device_id TEXT,
        license_mode TEXT NOT NULL,
        is_valid BOOLEAN NOT NULL,
        valid_until TIMESTAMPTZ,
        enabled_growth_packs JSONB NOT NULL DEFAULT '[]'::jsonb,
        last_validated TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_camera_licenses_tenant_camera UNIQUE (tenant_id, camera_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS feature_entitlements (
        id TEXT PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        feature_category TEXT NOT NULL,
        feature_name TEXT NOT NULL,
        is_enabled BOOLEAN NOT NULL DEFAULT FALSE,
        quota_limit INT NOT NULL DEFAULT -1,
        quota_used INT NOT NULL DEFAULT 0,
        valid_until TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_feature_entitlements UNIQUE (tenant_id, feature_category, feature_name)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS usage_events (
        id BIGSERIAL PRIMARY KEY,
        tenant_id TEXT NOT NULL,
        event_type TEXT NOT NULL,
        resource_id TEXT NOT NULL DEFAULT '',
        quantity DOUBLE PRECISION NOT NULL DEFAULT 0,
        unit TEXT NOT NULL DEFAULT '',
        metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
        event_time TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_usage_events_tenant_time ON usage_events(tenant_id, event_time)",
    r#"CREATE TABLE IF NOT EXISTS edge_devices (
        id TEXT PRIMARY KEY,
        device_id TEXT NOT NULL UNIQUE,
        tenant_id TEXT NOT NULL,
        name TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        management_tier TEXT NOT NULL DEFAULT 'basic',
        last_heartbeat TIMESTAMPTZ,
        active_camera_count INT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
];

/// Ensure the billing tables and their unique indexes exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = SCHEMA.len(), "Billing schema ensured");
    info!("Database schema ready");
    Ok(())
}
