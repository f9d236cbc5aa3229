//! Request-level middleware: fixed-window rate limiting keyed by user or IP.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use gilt_auth_types::identity::token_from_headers;
use gilt_auth_types::token::validate_access_token;
use gilt_core::rate_limit::FixedWindow;

use crate::error::ApiError;

/// State for one rate-limit group (global, cart, wishlist).
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<FixedWindow>,
    jwt_secret: Arc<str>,
}

impl RateLimitState {
    pub fn new(max: u32, window: Duration, jwt_secret: &str) -> Self {
        Self {
            limiter: Arc::new(FixedWindow::new(max, window)),
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

/// Axum middleware: apply with `middleware::from_fn_with_state`.
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let key = limit_key(&state.jwt_secret, request.headers());
    if !state.limiter.try_acquire(&key) {
        return ApiError::RateLimited.into_response();
    }
    next.run(request).await
}

/// Key by user id when the request carries a valid access token, else by
/// client IP.
fn limit_key(jwt_secret: &str, headers: &HeaderMap) -> String {
    if let Some(token) = token_from_headers(headers) {
        if let Ok(info) = validate_access_token(&token, jwt_secret) {
            return format!("user:{}", info.user_id);
        }
    }
    format!("ip:{}", client_ip(headers))
}

fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    if let Some(ip) = forwarded.filter(|v| !v.is_empty()) {
        return ip.to_owned();
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned()
}
