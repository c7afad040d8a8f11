//! Server half of the cookie bridge.
//!
//! Browser script cannot set HTTP-only cookies, so the client hands its
//! access token to the server which mirrors it into `buyorsell_access_token`.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

pub const AUTH_COOKIE_NAME: &str = "buyorsell_access_token";
pub const DEFAULT_MAX_AGE_SECONDS: i64 = 86_400;

/// Resolve the configured cookie lifetime. Unset, non-numeric and
/// non-positive values fall back to [`DEFAULT_MAX_AGE_SECONDS`].
pub fn resolve_max_age(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_MAX_AGE_SECONDS;
    };

    match raw.parse::<i64>() {
        Ok(seconds) if seconds > 0 => seconds,
        _ => {
            tracing::warn!(
                value = %raw,
                fallback = DEFAULT_MAX_AGE_SECONDS,
                "Invalid auth cookie max-age, using fallback"
            );
            DEFAULT_MAX_AGE_SECONDS
        }
    }
}

pub fn auth_cookie(access_token: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, access_token.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Set the cookie, always refreshing its max-age (sliding expiration).
pub fn write_auth_cookie(jar: CookieJar, access_token: &str, max_age_seconds: i64) -> CookieJar {
    jar.add(auth_cookie(access_token, max_age_seconds))
}

/// Emit a removal cookie whether or not the request carried one.
pub fn delete_auth_cookie(jar: CookieJar) -> CookieJar {
    jar.add(removal_cookie())
}

/// Access token carried by the request, if any. Unparseable and empty
/// cookies count as absent.
pub fn read_auth_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|value| !value.is_empty())
}
