//! Firebase Authentication via the Identity Toolkit REST API.
//!
//! The session credential is the Firebase ID token. `accounts:lookup` resolves
//! it, `accounts:signInWithPassword` and `accounts:signUp` issue new ones.
//! The base URL is configurable so the Auth emulator can be used locally.

use super::{IdentityError, IdentityProvider, SignedIn, User};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

// Lookup failures that mean "this token does not identify anyone".
const REJECTED_TOKEN_CODES: [&str; 4] = [
    "INVALID_ID_TOKEN",
    "TOKEN_EXPIRED",
    "USER_NOT_FOUND",
    "USER_DISABLED",
];

#[derive(Debug)]
pub struct FirebaseIdentity {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseIdentity {
    /// Build a client for the given Identity Toolkit base URL.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid identity URL: {base_url}"))?;

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build identity HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url, IdentityError> {
        let mut url = Url::parse(&format!("{}/accounts:{method}", self.base_url)).map_err(|e| {
            IdentityError::Provider {
                status: 0,
                message: format!("invalid endpoint: {e}"),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn post(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<(StatusCode, String), IdentityError> {
        let response = self
            .client
            .post(self.endpoint(method)?)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn issue(
        &self,
        method: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        let payload = json!({
            "email": email.trim(),
            "password": password.expose_secret(),
            "returnSecureToken": true,
        });

        let (status, body) = self.post(method, payload).await?;
        if !status.is_success() {
            return Err(map_error(status, &body));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| IdentityError::Provider {
                status: status.as_u16(),
                message: format!("unexpected response: {e}"),
            })?;

        Ok(SignedIn {
            expires_in_seconds: token.expires_in.and_then(|s| s.parse().ok()),
            user: User::new(token.local_id, token.email, SecretString::from(token.id_token)),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip_all)]
    async fn resolve(&self, credential: &SecretString) -> Result<Option<User>, IdentityError> {
        let payload = json!({ "idToken": credential.expose_secret() });
        let (status, body) = self.post("lookup", payload).await?;

        if status == StatusCode::BAD_REQUEST {
            let code = error_code(&body);
            if REJECTED_TOKEN_CODES.contains(&code.as_str()) {
                debug!("credential rejected: {code}");
                return Ok(None);
            }
            return Err(map_error(status, &body));
        }

        if !status.is_success() {
            return Err(map_error(status, &body));
        }

        let lookup: LookupResponse =
            serde_json::from_str(&body).map_err(|e| IdentityError::Provider {
                status: status.as_u16(),
                message: format!("unexpected response: {e}"),
            })?;

        Ok(lookup
            .users
            .into_iter()
            .next()
            .map(|user| User::new(user.local_id, user.email, credential.clone())))
    }

    #[instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        self.issue("signInWithPassword", email, password).await
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        self.issue("signUp", email, password).await
    }

    fn name(&self) -> &'static str {
        "firebase"
    }
}

/// Error messages look like `WEAK_PASSWORD : Password should be at least 6 characters`.
fn error_code(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default()
        .split(" : ")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn map_error(status: StatusCode, body: &str) -> IdentityError {
    let code = error_code(body);
    match code.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(
            body_detail(body).unwrap_or_else(|| "Password should be at least 6 characters".into()),
        ),
        _ => {
            warn!("identity provider error {status}: {code}");
            IdentityError::Provider {
                status: status.as_u16(),
                message: if code.is_empty() {
                    "unknown error".to_string()
                } else {
                    code
                },
            }
        }
    }
}

fn body_detail(body: &str) -> Option<String> {
    let message = serde_json::from_str::<ErrorEnvelope>(body).ok()?.error.message;
    message
        .split_once(" : ")
        .map(|(_, detail)| detail.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(message: &str) -> String {
        json!({ "error": { "code": 400, "message": message } }).to_string()
    }

    #[test]
    fn error_code_strips_detail() {
        assert_eq!(
            error_code(&envelope("WEAK_PASSWORD : Password should be at least 6 characters")),
            "WEAK_PASSWORD"
        );
        assert_eq!(error_code(&envelope("EMAIL_EXISTS")), "EMAIL_EXISTS");
        assert_eq!(error_code("not json"), "");
    }

    #[test]
    fn map_error_known_codes() {
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, &envelope("INVALID_LOGIN_CREDENTIALS")),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, &envelope("EMAIL_NOT_FOUND")),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, &envelope("EMAIL_EXISTS")),
            IdentityError::EmailExists
        ));
    }

    #[test]
    fn map_error_weak_password_keeps_detail() {
        let err = map_error(
            StatusCode::BAD_REQUEST,
            &envelope("WEAK_PASSWORD : Password should be at least 6 characters"),
        );
        match err {
            IdentityError::WeakPassword(detail) => {
                assert_eq!(detail, "Password should be at least 6 characters");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn map_error_unknown_is_provider_error() {
        match map_error(StatusCode::SERVICE_UNAVAILABLE, "") {
            IdentityError::Provider { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "unknown error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn endpoint_appends_method_and_key() -> Result<()> {
        let identity = FirebaseIdentity::new(
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1/",
            SecretString::from("api-key".to_string()),
        )?;
        let url = identity.endpoint("lookup")?;
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1/accounts:lookup?key=api-key"
        );
        Ok(())
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(FirebaseIdentity::new("not a url", SecretString::from("k".to_string())).is_err());
    }
}
