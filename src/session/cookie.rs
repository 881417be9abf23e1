//! The `auth` session cookie.
//!
//! The guard only cares whether the cookie is present; its value (the
//! identity provider's credential) is resolved later by the auth context.

use super::SessionConfig;
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use secrecy::{ExposeSecret, SecretString};

pub const SESSION_COOKIE_NAME: &str = "auth";

fn cookie_value(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().unwrap_or_default().trim();
            if key == SESSION_COOKIE_NAME {
                return Some(parts.next().unwrap_or_default().trim().to_string());
            }
        }
    }
    None
}

/// Presence check used by the guard; an empty value still counts.
#[must_use]
pub fn has_session_cookie(headers: &HeaderMap) -> bool {
    cookie_value(headers).is_some()
}

/// Credential carried by the cookie, if it holds one.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<SecretString> {
    cookie_value(headers)
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
}

/// `Max-Age` follows the provider's expiry when it is shorter than the configured TTL.
///
/// # Errors
/// Returns an error if the token contains characters not allowed in a header.
pub fn session_cookie(
    config: &SessionConfig,
    token: &SecretString,
    expires_in_seconds: Option<u64>,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = expires_in_seconds.map_or(config.ttl_seconds(), |provider| {
        provider.min(config.ttl_seconds())
    });
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        token.expose_secret()
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// # Errors
/// Never in practice; the value is a fixed ASCII string.
pub fn clear_session_cookie(config: &SessionConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
