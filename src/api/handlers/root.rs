use crate::{session::guard::DASHBOARD_PATH, views::list::LIST_PATH};
use axum::response::{IntoResponse, Redirect};

// axum handler for root
pub async fn root() -> impl IntoResponse {
    Redirect::temporary(DASHBOARD_PATH)
}

pub async fn dashboard() -> impl IntoResponse {
    Redirect::to(LIST_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header::LOCATION, Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_and_dashboard_redirect() -> anyhow::Result<()> {
        let app = Router::new()
            .route("/", get(root))
            .route("/dashboard", get(dashboard));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/dashboard")
        );

        let response = app
            .oneshot(Request::builder().uri("/dashboard").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/dashboard/vehicles")
        );
        Ok(())
    }
}
