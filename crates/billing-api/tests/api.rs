//! Router tests over the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use billing_api::{build_router, AppState};
use billing_core::repositories::BillingRepository;
use billing_infrastructure::MemoryBillingRepository;
use billing_shared::config::AppConfig;

fn app_with(configure: impl FnOnce(&mut AppConfig)) -> (Router, Arc<MemoryBillingRepository>) {
    let mut config = AppConfig::defaults().unwrap();
    configure(&mut config);
    let repo = Arc::new(MemoryBillingRepository::new());
    let state = AppState::new(repo.clone(), config);
    (build_router(state), repo)
}

fn app() -> Router {
    app_with(|_| {}).0
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_auth(app, method, uri, body, None).await
}

async fn send_with_auth(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "brinkbyte-vision-billing");
    assert_eq!(body["total_events"], 0);
}

#[tokio::test]
async fn test_legacy_validate_provisions_trial() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/licenses/validate",
        Some(json!({"tenant_id": "t1", "camera_id": "cam-1", "device_id": "dev-1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["license_mode"], "trial");
    assert_eq!(body["cameras_allowed"], 2);
    assert_eq!(body["enabled_growth_packs"], json!([]));

    let (_, license) = send(&app, Method::GET, "/api/v1/billing/license/t1", None).await;
    assert_eq!(license["active_cameras"], 1);
    assert_eq!(license["cameras"][0]["camera_id"], "cam-1");
    assert_eq!(license["cameras"][0]["mode"], "trial");
    assert_eq!(license["can_revoke"], false);
    assert_eq!(license["license_key"], "t1");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/licenses/validate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_subscription_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/billing/subscription/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nobody"));
}

#[tokio::test]
async fn test_revoke_trial_rejected() {
    let app = app();
    send(&app, Method::GET, "/api/v1/billing/license/t1", None).await;

    let (status, body) = send(&app, Method::POST, "/api/v1/billing/license/t1/revoke", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_catalog_and_pricing() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/billing/growth-packs/available", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["packs"].as_array().unwrap().len(), 7);

    let (status, body) = send(&app, Method::GET, "/api/v1/billing/pricing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base_license"]["per_camera_monthly"], 14.99);
    assert_eq!(body["currency"], "AUD");
}

#[tokio::test]
async fn test_entitlement_check_base_feature() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/entitlements/check",
        Some(json!({"tenant_id": "t1", "feature_category": "cv_models", "feature_name": "person"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_enabled"], true);
    assert_eq!(body["quota_remaining"], -1);
}

#[tokio::test]
async fn test_usage_batch_and_summary() {
    let app = app();
    let now = chrono::Utc::now().timestamp() - 60;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/usage/batch",
        Some(json!({"events": [
            {"tenant_id": "t1", "event_type": "api_call", "quantity": 5, "event_time": now.to_string()},
            {"tenant_id": "t1", "event_type": "api_call", "quantity": 10, "event_time": now},
            {"tenant_id": "", "event_type": "api_call", "quantity": 1}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted_count"], 2);
    assert_eq!(body["rejected_count"], 1);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/billing/usage/t1?start=not-a-date",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_calls"], 15);
    assert!(body.get("sms_sent").is_none());

    let (_, stats) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(stats["total_events"], 2);
}

#[tokio::test]
async fn test_heartbeat() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/heartbeat",
        Some(json!({"device_id": "dev-1", "tenant_id": "t1", "active_camera_ids": ["a", "b"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["next_heartbeat_in_seconds"], 900);

    let (status, _) = send(&app, Method::POST, "/api/v1/heartbeat", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_flow() {
    let app = app();
    let (status, tenant) = send(
        &app,
        Method::POST,
        "/api/v1/admin/tenants",
        Some(json!({"name": "Acme", "email": "ops@acme.test"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tenant_id = tenant["id"].as_str().unwrap().to_string();
    assert!(tenant["api_key"].as_str().unwrap().starts_with("bb_"));

    let (status, sub) = send(
        &app,
        Method::POST,
        "/api/v1/admin/subscriptions",
        Some(json!({"tenant_id": tenant_id, "plan": "base", "cameras_licensed": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub["plan"], "base");
    assert_eq!(sub["cameras_licensed"], 4);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/admin/subscriptions",
        Some(json!({"tenant_id": tenant_id, "plan": "base"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/v1/admin/subscriptions/{}/growth-packs", tenant_id);
    let (status, packs) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"enable": ["Retail"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(packs["enabled_packs"], json!(["Retail"]));

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"enable": ["Nope"]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = send(
        &app,
        Method::GET,
        &format!("/api/v1/billing/subscription/{}", tenant_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["growth_packs"][0]["pack_name"], "Retail");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/admin/tenants/{}", tenant_id),
        Some(json!({"status": "suspended"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "suspended");
}

#[tokio::test]
async fn test_tenant_auth() {
    let (app, repo) = app_with(|config| config.auth.require_tenant_auth = true);

    let (status, body) = send(&app, Method::GET, "/api/v1/billing/pricing", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing Authorization header");

    let (status, _) =
        send_with_auth(&app, Method::GET, "/api/v1/billing/pricing", None, Some("bogus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut tenant = billing_core::Tenant::auto_created("t1", chrono::Utc::now());
    tenant.api_key = Some("bb_key".into());
    repo.create_tenant(&tenant).await.unwrap();
    let (status, _) =
        send_with_auth(&app, Method::GET, "/api/v1/billing/pricing", None, Some("bb_key")).await;
    assert_eq!(status, StatusCode::OK);

    tenant.status = billing_core::TenantStatus::Suspended;
    repo.update_tenant(&tenant).await.unwrap();
    let (status, _) =
        send_with_auth(&app, Method::GET, "/api/v1/billing/pricing", None, Some("bb_key")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Public routes stay open.
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_auth() {
    let (app, _) = app_with(|config| {
        config.auth.require_admin_auth = true;
        config.auth.admin_api_key = Some("admin-secret".into());
    });

    let (status, _) = send(&app, Method::GET, "/api/v1/admin/tenants/t1", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_with_auth(
        &app,
        Method::GET,
        "/api/v1/admin/tenants/t1",
        None,
        Some("admin-secret"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
