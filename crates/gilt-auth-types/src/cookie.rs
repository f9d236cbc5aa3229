//! Cookie builders for access and refresh tokens.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const GILT_ACCESS_TOKEN: &str = "gilt_access_token";

/// Cookie name for the refresh token.
pub const GILT_REFRESH_TOKEN: &str = "gilt_refresh_token";

/// Access-token JWT lifetime in seconds (4 hours).
pub const ACCESS_TOKEN_EXP: u64 = 14400;

/// Refresh-token JWT lifetime and cookie Max-Age for both tokens in
/// seconds (7 days).
pub const REFRESH_TOKEN_EXP: u64 = 604800;

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use gilt_auth_types::cookie::{set_access_token_cookie, GILT_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(GILT_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(build_token_cookie(GILT_ACCESS_TOKEN, value, domain))
}

/// Set the refresh-token cookie on the jar.
pub fn set_refresh_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    jar.add(build_token_cookie(GILT_REFRESH_TOKEN, value, domain))
}

/// Expire both token cookies (logout).
pub fn clear_cookies(jar: CookieJar, domain: String) -> CookieJar {
    let expire = |name: &'static str, domain: String| {
        Cookie::build((name, ""))
            .domain(domain)
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::ZERO)
            .build()
    };
    jar.add(expire(GILT_ACCESS_TOKEN, domain.clone()))
        .add(expire(GILT_REFRESH_TOKEN, domain))
}

fn build_token_cookie(name: &'static str, value: String, domain: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .domain(domain)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(REFRESH_TOKEN_EXP as i64))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_set_both_token_cookies() {
        let jar = CookieJar::new();
        let jar = set_access_token_cookie(jar, "access".into(), "example.com".into());
        let jar = set_refresh_token_cookie(jar, "refresh".into(), "example.com".into());

        assert_eq!(jar.get(GILT_ACCESS_TOKEN).unwrap().value(), "access");
        assert_eq!(jar.get(GILT_REFRESH_TOKEN).unwrap().value(), "refresh");
    }

    #[test]
    fn should_mark_cookies_http_only_and_secure() {
        let jar = set_access_token_cookie(CookieJar::new(), "v".into(), "example.com".into());
        let cookie = jar.get(GILT_ACCESS_TOKEN).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn should_expire_cookies_on_clear() {
        let jar = set_access_token_cookie(CookieJar::new(), "v".into(), "example.com".into());
        let jar = clear_cookies(jar, "example.com".into());
        let cookie = jar.get(GILT_ACCESS_TOKEN).unwrap();
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.value(), "");
    }
}
