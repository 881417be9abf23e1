//! Route handlers and the helpers they share for resolving the signed-in user.

pub mod api_vehicles;
pub mod auth;
pub mod health;
pub mod root;
pub mod vehicles;

use crate::{
    api::SharedIdentity,
    identity::User,
    session::{cookie::session_token, AuthContext},
};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use secrecy::SecretString;

/// Credential from `Authorization: Bearer` or, failing that, the `auth` cookie.
pub(crate) fn request_credential(headers: &HeaderMap) -> Option<SecretString> {
    bearer_token(headers).or_else(|| session_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<SecretString> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(SecretString::from(token.to_string()))
    }
}

/// Resolve the request's user through a fresh [`AuthContext`].
pub(crate) async fn current_user(headers: &HeaderMap, identity: &SharedIdentity) -> Option<User> {
    AuthContext::subscribe(identity.clone(), request_credential(headers))
        .current_user()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};
    use secrecy::ExposeSecret;

    fn exposed(token: Option<SecretString>) -> Option<String> {
        token.map(|t| t.expose_secret().to_string())
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("auth=from-cookie"));
        assert_eq!(exposed(request_credential(&headers)).as_deref(), Some("from-header"));
    }

    #[test]
    fn falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert(COOKIE, HeaderValue::from_static("auth=from-cookie"));
        assert_eq!(exposed(request_credential(&headers)).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn empty_bearer_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(request_credential(&headers).is_none());
    }
}
