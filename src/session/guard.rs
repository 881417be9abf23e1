//! Route guard.
//!
//! Runs before any handler and decides from the request path and the mere
//! presence of the session cookie whether to redirect. It never checks that
//! the credential is genuine; handlers do that through the auth context.

use super::cookie::has_session_cookie;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    RedirectToDashboard,
    RedirectToLogin,
    PassThrough,
}

/// `path` equals `area` or sits below it (`/dashboard/vehicles`, not `/dashboards`).
fn within(path: &str, area: &str) -> bool {
    path.strip_prefix(area)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn is_auth_page(path: &str) -> bool {
    within(path, LOGIN_PATH) || within(path, REGISTER_PATH)
}

#[must_use]
pub fn is_protected(path: &str) -> bool {
    within(path, DASHBOARD_PATH)
}

#[must_use]
pub fn decide(path: &str, has_credential: bool) -> GuardDecision {
    if is_auth_page(path) && has_credential {
        GuardDecision::RedirectToDashboard
    } else if is_protected(path) && !has_credential {
        GuardDecision::RedirectToLogin
    } else {
        GuardDecision::PassThrough
    }
}

/// Middleware applying [`decide`] with `307 Temporary Redirect` responses.
pub async fn session_guard(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    match decide(&path, has_session_cookie(request.headers())) {
        GuardDecision::RedirectToDashboard => {
            debug!("session present on {path}, redirecting to dashboard");
            Redirect::temporary(DASHBOARD_PATH).into_response()
        }
        GuardDecision::RedirectToLogin => {
            debug!("no session for {path}, redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        GuardDecision::PassThrough => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::LOCATION, Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    #[test]
    fn auth_page_with_credential_goes_to_dashboard() {
        assert_eq!(decide("/login", true), GuardDecision::RedirectToDashboard);
        assert_eq!(decide("/register", true), GuardDecision::RedirectToDashboard);
        assert_eq!(decide("/login/reset", true), GuardDecision::RedirectToDashboard);
    }

    #[test]
    fn protected_without_credential_goes_to_login() {
        assert_eq!(decide("/dashboard", false), GuardDecision::RedirectToLogin);
        assert_eq!(
            decide("/dashboard/vehicles/ABC123", false),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn everything_else_passes() {
        assert_eq!(decide("/login", false), GuardDecision::PassThrough);
        assert_eq!(decide("/dashboard/vehicles", true), GuardDecision::PassThrough);
        assert_eq!(decide("/", false), GuardDecision::PassThrough);
        assert_eq!(decide("/health", true), GuardDecision::PassThrough);
        assert_eq!(decide("/dashboards", false), GuardDecision::PassThrough);
        assert_eq!(decide("/loginx", true), GuardDecision::PassThrough);
        assert_eq!(decide("/v1/vehicles", false), GuardDecision::PassThrough);
    }

    fn app() -> Router {
        Router::new()
            .route("/login", get(|| async { "login" }))
            .route("/dashboard/vehicles/:plate", get(|| async { "detail" }))
            .layer(middleware::from_fn(session_guard))
    }

    #[tokio::test]
    async fn middleware_redirects_before_handler() -> anyhow::Result<()> {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/dashboard/vehicles/ABC123")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/login")
        );
        Ok(())
    }

    #[tokio::test]
    async fn middleware_sends_signed_in_users_to_dashboard() -> anyhow::Result<()> {
        let response = app()
            .oneshot(
                HttpRequest::builder()
                    .uri("/login")
                    .header("cookie", "auth=anything")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/dashboard")
        );
        Ok(())
    }

    #[tokio::test]
    async fn middleware_passes_through() -> anyhow::Result<()> {
        let response = app()
            .oneshot(HttpRequest::builder().uri("/login").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
