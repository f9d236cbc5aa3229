//! Authenticated-request identity extractor.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use crate::cookie::GILT_ACCESS_TOKEN;
use crate::token::validate_access_token;

/// State trait giving the extractor access to the JWT signing secret.
pub trait TokenSecret {
    fn jwt_secret(&self) -> &str;
}

/// User identity taken from a bearer `Authorization` header or, failing
/// that, the http-only access-token cookie.
///
/// Returns 401 (enveloped) when neither carries a valid token. Role
/// enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub user_role: u8,
}

/// 401 rejection carrying the `{success, message}` envelope.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "message": "authentication required",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Pull the raw token out of the request headers: bearer first, cookie second.
pub fn token_from_headers(headers: &http::HeaderMap) -> Option<String> {
    let bearer = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);
    if bearer.is_some() {
        return bearer;
    }
    CookieJar::from_headers(headers)
        .get(GILT_ACCESS_TOKEN)
        .map(|c| c.value().to_owned())
}

impl<S> FromRequestParts<S> for Identity
where
    S: TokenSecret + Send + Sync,
{
    type Rejection = Unauthorized;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = token_from_headers(&parts.headers)
            .and_then(|token| validate_access_token(&token, state.jwt_secret()).ok())
            .map(|info| Identity {
                user_id: info.user_id,
                user_role: info.user_role,
            });

        async move { identity.ok_or(Unauthorized) }
    }
}
