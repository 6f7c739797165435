//! Bearer API-key authentication for tenant and admin routes

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::Unauthorized(
            "Invalid Authorization header format".to_string(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::Unauthorized("Empty API key".to_string()));
    }
    Ok(token)
}

/// Resolves the tenant owning the bearer API key and attaches it to the request.
pub async fn tenant_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let api_key = bearer_token(&request)?.to_string();
    let tenant = state
        .repo
        .get_tenant_by_api_key(&api_key)
        .await
        .map_err(|e| {
            error!("API key lookup failed: {}", e);
            ApiError::InternalError("Authentication error".to_string())
        })?
        .ok_or_else(|| {
            let prefix: String = api_key.chars().take(10).collect();
            warn!(key_prefix = %prefix, "Invalid API key");
            ApiError::Unauthorized("Invalid API key".to_string())
        })?;

    if !tenant.is_active() {
        warn!(tenant_id = %tenant.id, status = tenant.status.as_str(), "Inactive tenant");
        return Err(ApiError::Forbidden("Tenant account is not active".to_string()));
    }

    debug!(tenant_id = %tenant.id, "Authenticated tenant");
    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

/// Checks the bearer token against the configured admin key; open when no key is set.
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let Some(admin_key) = state
        .config
        .auth
        .admin_api_key
        .as_deref()
        .filter(|k| !k.is_empty())
    else {
        warn!("Admin API key not configured, allowing unauthenticated admin access");
        return Ok(next.run(request).await);
    };

    if bearer_token(&request)? != admin_key {
        warn!("Invalid admin API key");
        return Err(ApiError::Unauthorized("Invalid admin API key".to_string()));
    }

    Ok(next.run(request).await)
}
