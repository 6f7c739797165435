use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use crate::handlers::{admin, billing, device, health};
use crate::middleware::{admin_auth, tenant_auth};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let auth = &state.config.auth;

    let mut admin_routes = Router::new()
        .route("/tenants", post(admin::create_tenant))
        .route(
            "/tenants/{id}",
            get(admin::get_tenant).put(admin::update_tenant),
        )
        .route("/subscriptions", post(admin::create_subscription))
        .route("/subscriptions/{tenant_id}", put(admin::update_subscription))
        .route(
            "/subscriptions/{tenant_id}/growth-packs",
            put(admin::manage_growth_packs),
        )
        .route("/entitlements", put(admin::save_entitlement));
    if auth.require_admin_auth {
        info!("Admin authentication enabled");
        admin_routes =
            admin_routes.route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));
    }

    let mut api_routes = Router::new()
        // Dashboard
        .route("/billing/growth-packs/available", get(billing::available_growth_packs))
        .route("/billing/pricing", get(billing::pricing_config))
        .route("/billing/license/{tenant_id}", get(billing::license_status))
        .route("/billing/license/{tenant_id}/revoke", post(billing::revoke_license))
        .route("/billing/subscription/{tenant_id}", get(billing::subscription))
        .route("/billing/growth-packs/{tenant_id}", get(billing::enabled_growth_packs))
        .route("/billing/usage/{tenant_id}", get(billing::usage_summary))
        .route("/billing/validate", post(billing::validate_camera))
        // Edge devices
        .route("/licenses/validate", post(device::validate_license))
        .route("/entitlements/check", post(device::check_entitlement))
        .route("/usage/batch", post(device::report_usage))
        .route("/heartbeat", post(device::heartbeat));
    if auth.require_tenant_auth {
        info!("Tenant API-key authentication enabled");
        api_routes =
            api_routes.route_layer(middleware::from_fn_with_state(state.clone(), tenant_auth));
    }

    Router::new()
        .route("/health", get(health::health_check))
        .route("/stats", get(health::stats))
        .nest("/api/v1", api_routes.nest("/admin", admin_routes))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
