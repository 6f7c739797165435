// ============================================================================
// Billing Infrastructure - PostgreSQL Billing Repository
// File: crates/billing-infrastructure/src/database/postgres/billing_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{error, info};

use billing_core::domain::{
    CameraLicense, EdgeDevice, FeatureEntitlement, GrowthPackAssignment, StoreStats,
    Subscription, Tenant, UsageEvent, UsageSummary,
};
use billing_core::error::DomainError;
use billing_core::repositories::BillingRepository;

use super::rows::{
    CameraLicenseRow, EdgeDeviceRow, EntitlementRow, GrowthPackRow, SubscriptionRow, TenantRow,
};

const TENANT_COLUMNS: &str = "id, name, email, api_key, status, created_at, updated_at";

const SUBSCRIPTION_COLUMNS: &str = "id, tenant_id, plan, status, cameras_licensed, \
    trial_start_date, trial_end_date, subscription_start_date, subscription_end_date, \
    billing_cycle, created_at, updated_at";

const GROWTH_PACK_COLUMNS: &str = "id, tenant_id, subscription_id, pack_name, is_enabled, \
    enabled_at, disabled_at, price_monthly::float8 AS price_monthly";

const CAMERA_COLUMNS: &str = "id, camera_id, tenant_id, device_id, license_mode, is_valid, \
    valid_until, enabled_growth_packs, last_validated, created_at, updated_at";

const ENTITLEMENT_COLUMNS: &str = "id, tenant_id, feature_category, feature_name, is_enabled, \
    quota_limit, quota_used, valid_until, created_at, updated_at";

const DEVICE_COLUMNS: &str = "id, device_id, tenant_id, name, status, management_tier, \
    last_heartbeat, active_camera_count, created_at, updated_at";

pub struct PgBillingRepository {
    pool: PgPool,
}

impl PgBillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, table: &'static str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(&format!("counting {}", table), e))
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl BillingRepository for PgBillingRepository {
    async fn get_tenant(&self, tenant_id: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS))
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("finding tenant", e))?;

        Ok(row.map(Into::into))
    }

    async fn get_tenant_by_api_key(&self, api_key: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE api_key = $1",
            TENANT_COLUMNS
        ))
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding tenant by api key", e))?;

        Ok(row.map(Into::into))
    }

    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        info!(tenant_id = %tenant.id, "Creating tenant");

        let row: TenantRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO tenants (id, name, email, api_key, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TENANT_COLUMNS
        ))
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.email)
        .bind(&tenant.api_key)
        .bind(tenant.status.as_str())
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::TenantAlreadyExists(tenant.id.clone())
            } else {
                db_error("creating tenant", e)
            }
        })?;

        Ok(row.into())
    }

    async fn update_tenant(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            r#"
            UPDATE tenants
            SET name = $2, email = $3, api_key = $4, status = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            TENANT_COLUMNS
        ))
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.email)
        .bind(&tenant.api_key)
        .bind(tenant.status.as_str())
        .bind(tenant.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating tenant", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::TenantNotFound(tenant.id.clone()))
    }

    async fn get_subscription(&self, tenant_id: &str) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding subscription", e))?;

        Ok(row.map(Into::into))
    }

    async fn create_subscription(&self, sub: &Subscription) -> Result<Subscription, DomainError> {
        let row: SubscriptionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO subscriptions (
                id, tenant_id, plan, status, cameras_licensed,
                trial_start_date, trial_end_date, subscription_start_date, subscription_end_date,
                billing_cycle, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(&sub.id)
        .bind(&sub.tenant_id)
        .bind(sub.plan.as_str())
        .bind(sub.status.as_str())
        .bind(sub.cameras_licensed)
        .bind(sub.trial_start_date)
        .bind(sub.trial_end_date)
        .bind(sub.subscription_start_date)
        .bind(sub.subscription_end_date)
        .bind(sub.billing_cycle.as_str())
        .bind(sub.created_at)
        .bind(sub.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::SubscriptionAlreadyExists(sub.tenant_id.clone())
            } else {
                db_error("creating subscription", e)
            }
        })?;

        Ok(row.into())
    }

    async fn update_subscription(&self, sub: &Subscription) -> Result<Subscription, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE subscriptions
            SET plan = $2, status = $3, cameras_licensed = $4,
                trial_start_date = $5, trial_end_date = $6,
                subscription_start_date = $7, subscription_end_date = $8,
                billing_cycle = $9, updated_at = $10
            WHERE id = $1
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(&sub.id)
        .bind(sub.plan.as_str())
        .bind(sub.status.as_str())
        .bind(sub.cameras_licensed)
        .bind(sub.trial_start_date)
        .bind(sub.trial_end_date)
        .bind(sub.subscription_start_date)
        .bind(sub.subscription_end_date)
        .bind(sub.billing_cycle.as_str())
        .bind(sub.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating subscription", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::SubscriptionNotFound(sub.tenant_id.clone()))
    }

    async fn get_enabled_growth_packs(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<GrowthPackAssignment>, DomainError> {
        let rows: Vec<GrowthPackRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM growth_pack_assignments
            WHERE tenant_id = $1 AND is_enabled = TRUE
            ORDER BY enabled_at, pack_name
            "#,
            GROWTH_PACK_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing growth packs", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn enable_growth_pack(&self, pack: &GrowthPackAssignment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO growth_pack_assignments (
                id, tenant_id, subscription_id, pack_name, is_enabled, enabled_at, disabled_at, price_monthly
            )
            VALUES ($1, $2, $3, $4, TRUE, $5, NULL, $6)
            ON CONFLICT (tenant_id, pack_name) DO UPDATE SET
                subscription_id = EXCLUDED.subscription_id,
                is_enabled = TRUE,
                enabled_at = EXCLUDED.enabled_at,
                disabled_at = NULL,
                price_monthly = EXCLUDED.price_monthly
            "#,
        )
        .bind(&pack.id)
        .bind(&pack.tenant_id)
        .bind(&pack.subscription_id)
        .bind(&pack.pack_name)
        .bind(pack.enabled_at)
        .bind(pack.price_monthly)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("enabling growth pack", e))?;

        Ok(())
    }

    async fn disable_growth_pack(
        &self,
        tenant_id: &str,
        pack_name: &str,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE growth_pack_assignments
            SET is_enabled = FALSE, disabled_at = $3
            WHERE tenant_id = $1 AND pack_name = $2 AND is_enabled = TRUE
            "#,
        )
        .bind(tenant_id)
        .bind(pack_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("disabling growth pack", e))?;

        Ok(())
    }

    async fn get_camera_license(
        &self,
        camera_id: &str,
        tenant_id: &str,
    ) -> Result<Option<CameraLicense>, DomainError> {
        let row: Option<CameraLicenseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM camera_licenses WHERE camera_id = $1 AND tenant_id = $2",
            CAMERA_COLUMNS
        ))
        .bind(camera_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding camera license", e))?;

        Ok(row.map(Into::into))
    }

    async fn save_camera_license(&self, license: &CameraLicense) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO camera_licenses (
                id, camera_id, tenant_id, device_id, license_mode, is_valid, valid_until,
                enabled_growth_packs, last_validated, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (tenant_id, camera_id) DO UPDATE SET
                device_id = COALESCE(EXCLUDED.device_id, camera_licenses.device_id),
                license_mode = EXCLUDED.license_mode,
                is_valid = EXCLUDED.is_valid,
                valid_until = EXCLUDED.valid_until,
                enabled_growth_packs = EXCLUDED.enabled_growth_packs,
                last_validated = EXCLUDED.last_validated,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&license.id)
        .bind(&license.camera_id)
        .bind(&license.tenant_id)
        .bind(&license.device_id)
        .bind(license.license_mode.as_str())
        .bind(license.is_valid)
        .bind(license.valid_until)
        .bind(Json(&license.enabled_growth_packs))
        .bind(license.last_validated)
        .bind(license.created_at)
        .bind(license.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("saving camera license", e))?;

        Ok(())
    }

    async fn get_cameras_by_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<CameraLicense>, DomainError> {
        let rows: Vec<CameraLicenseRow> = sqlx::query_as(&format!(
            "SELECT {} FROM camera_licenses WHERE tenant_id = $1 ORDER BY created_at, camera_id",
            CAMERA_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing cameras", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_cameras_by_tenant(&self, tenant_id: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM camera_licenses WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("counting cameras", e))
    }

    async fn get_entitlement(
        &self,
        tenant_id: &str,
        feature_category: &str,
        feature_name: &str,
    ) -> Result<Option<FeatureEntitlement>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM feature_entitlements
            WHERE tenant_id = $1 AND feature_category = $2 AND feature_name = $3
            "#,
            ENTITLEMENT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(feature_category)
        .bind(feature_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding entitlement", e))?;

        Ok(row.map(Into::into))
    }

    async fn save_entitlement(&self, entitlement: &FeatureEntitlement) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO feature_entitlements (
                id, tenant_id, feature_category, feature_name, is_enabled,
                quota_limit, quota_used, valid_until, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (tenant_id, feature_category, feature_name) DO UPDATE SET
                is_enabled = EXCLUDED.is_enabled,
                quota_limit = EXCLUDED.quota_limit,
                quota_used = EXCLUDED.quota_used,
                valid_until = EXCLUDED.valid_until,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&entitlement.id)
        .bind(&entitlement.tenant_id)
        .bind(&entitlement.feature_category)
        .bind(&entitlement.feature_name)
        .bind(entitlement.is_enabled)
        .bind(entitlement.quota_limit)
        .bind(entitlement.quota_used)
        .bind(entitlement.valid_until)
        .bind(entitlement.created_at)
        .bind(entitlement.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("saving entitlement", e))?;

        Ok(())
    }

    async fn save_usage_events(&self, events: &[UsageEvent]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting usage transaction", e))?;

        for event in events {
            sqlx::query(
                r#"
                INSERT INTO usage_events (
                    tenant_id, event_type, resource_id, quantity, unit, metadata, event_time
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&event.tenant_id)
            .bind(&event.event_type)
            .bind(&event.resource_id)
            .bind(event.quantity)
            .bind(&event.unit)
            .bind(Json(&event.metadata))
            .bind(event.event_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("inserting usage event", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("committing usage events", e))?;
        Ok(())
    }

    async fn get_usage_summary(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<UsageSummary, DomainError> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT event_type, SUM(quantity)::float8 AS total
            FROM usage_events
            WHERE tenant_id = $1 AND event_time >= $2 AND event_time <= $3
            GROUP BY event_type
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("summarizing usage", e))?;

        Ok(rows.into_iter().collect())
    }

    async fn save_edge_device(&self, device: &EdgeDevice) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO edge_devices (
                id, device_id, tenant_id, name, status, management_tier,
                last_heartbeat, active_camera_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (device_id) DO UPDATE SET
                tenant_id = EXCLUDED.tenant_id,
                name = COALESCE(EXCLUDED.name, edge_devices.name),
                status = EXCLUDED.status,
                management_tier = EXCLUDED.management_tier,
                last_heartbeat = EXCLUDED.last_heartbeat,
                active_camera_count = EXCLUDED.active_camera_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&device.id)
        .bind(&device.device_id)
        .bind(&device.tenant_id)
        .bind(&device.name)
        .bind(device.status.as_str())
        .bind(device.management_tier.as_str())
        .bind(device.last_heartbeat)
        .bind(device.active_camera_count)
        .bind(device.created_at)
        .bind(device.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("saving edge device", e))?;

        Ok(())
    }

    async fn get_edge_device(&self, device_id: &str) -> Result<Option<EdgeDevice>, DomainError> {
        let row: Option<EdgeDeviceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM edge_devices WHERE device_id = $1",
            DEVICE_COLUMNS
        ))
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding edge device", e))?;

        Ok(row.map(Into::into))
    }

    async fn get_stats(&self) -> Result<StoreStats, DomainError> {
        Ok(StoreStats {
            tenants: self.count("tenants").await?,
            usage_events: self.count("usage_events").await?,
            cameras: self.count("camera_licenses").await?,
            devices: self.count("edge_devices").await?,
        })
    }
}
