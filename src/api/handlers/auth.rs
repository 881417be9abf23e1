//! Sign-in, sign-up and sign-out pages.
//!
//! Successful sign-in or sign-up stores the provider's credential in the
//! `auth` cookie and sends the browser to the dashboard.

use super::request_credential;
use crate::{
    api::SharedIdentity,
    identity::{valid_email, IdentityError, IdentityProvider, SignedIn},
    session::{
        cookie::{clear_session_cookie, session_cookie},
        guard::{DASHBOARD_PATH, LOGIN_PATH},
        SessionConfig,
    },
    views::html::{auth_page, AuthPage},
};
use axum::{
    extract::{Extension, Form},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

pub async fn login_form() -> impl IntoResponse {
    Html(auth_page(AuthPage::Login, "", None))
}

pub async fn register_form() -> impl IntoResponse {
    Html(auth_page(AuthPage::Register, "", None))
}

pub async fn login(
    identity: Extension<SharedIdentity>,
    session: Extension<SessionConfig>,
    Form(credentials): Form<Credentials>,
) -> Response {
    authenticate(AuthPage::Login, &identity, &session, credentials).await
}

pub async fn register(
    identity: Extension<SharedIdentity>,
    session: Extension<SessionConfig>,
    Form(credentials): Form<Credentials>,
) -> Response {
    authenticate(AuthPage::Register, &identity, &session, credentials).await
}

async fn authenticate(
    page: AuthPage,
    identity: &SharedIdentity,
    session: &SessionConfig,
    credentials: Credentials,
) -> Response {
    let email = credentials.email.trim().to_string();
    if !valid_email(&email) {
        return reject(
            page,
            StatusCode::UNPROCESSABLE_ENTITY,
            &email,
            "Please enter a valid email address",
        );
    }
    if credentials.password.is_empty() {
        return reject(
            page,
            StatusCode::UNPROCESSABLE_ENTITY,
            &email,
            "Please enter your password",
        );
    }

    let password = SecretString::from(credentials.password);
    let result = match page {
        AuthPage::Login => identity.sign_in(&email, &password).await,
        AuthPage::Register => identity.sign_up(&email, &password).await,
    };

    match result {
        Ok(signed_in) => start_session(session, &signed_in),
        Err(IdentityError::InvalidCredentials) => reject(
            page,
            StatusCode::UNAUTHORIZED,
            &email,
            "Invalid email or password",
        ),
        Err(IdentityError::EmailExists) => reject(
            page,
            StatusCode::CONFLICT,
            &email,
            "An account with this email already exists",
        ),
        Err(IdentityError::WeakPassword(detail)) => {
            reject(page, StatusCode::UNPROCESSABLE_ENTITY, &email, &detail)
        }
        Err(e) => {
            error!("Identity provider {} failed: {e}", identity.name());
            reject(
                page,
                StatusCode::BAD_GATEWAY,
                &email,
                "Something went wrong. Please try again.",
            )
        }
    }
}

fn reject(page: AuthPage, status: StatusCode, email: &str, message: &str) -> Response {
    (status, Html(auth_page(page, email, Some(message)))).into_response()
}

fn start_session(session: &SessionConfig, signed_in: &SignedIn) -> Response {
    match session_cookie(
        session,
        signed_in.user.credential(),
        signed_in.expires_in_seconds,
    ) {
        Ok(cookie) => {
            info!("user {} signed in", signed_in.user.id());
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (headers, Redirect::to(DASHBOARD_PATH)).into_response()
        }
        Err(e) => {
            error!("Failed to build session cookie: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn logout(
    headers: HeaderMap,
    identity: Extension<SharedIdentity>,
    session: Extension<SessionConfig>,
) -> Response {
    if let Some(credential) = request_credential(&headers) {
        if let Err(e) = identity.revoke(&credential).await {
            warn!("Failed to revoke session with {}: {e}", identity.name());
        }
    }

    // Always clear the cookie, even if the session was already gone.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(&session) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(e) => warn!("Failed to build clearing cookie: {e}"),
    }
    (response_headers, Redirect::to(LOGIN_PATH)).into_response()
}
