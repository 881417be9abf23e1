//! HTTP surface: server-rendered dashboard pages, a small JSON API, health
//! and Swagger UI, all behind the session guard.

pub mod handlers;
mod openapi;

pub use openapi::{openapi, ApiDoc};

use crate::{
    identity::IdentityProvider,
    session::{session_guard, SessionConfig},
    store::VehicleStore,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Extension, Router,
};
use handlers::{api_vehicles, auth, health, root, vehicles};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub type SharedStore = Arc<dyn VehicleStore>;
pub type SharedIdentity = Arc<dyn IdentityProvider>;

/// Build the application router with every layer the server runs with.
#[must_use]
pub fn router(store: SharedStore, identity: SharedIdentity, session: SessionConfig) -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/dashboard", get(root::dashboard))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/logout", axum::routing::post(auth::logout))
        .route(
            "/dashboard/vehicles",
            get(vehicles::list).post(vehicles::create),
        )
        .route("/dashboard/vehicles/:plate", get(vehicles::detail))
        .route(
            "/v1/vehicles",
            get(api_vehicles::list).post(api_vehicles::create),
        )
        .route("/v1/vehicles/:plate", get(api_vehicles::get))
        .route("/health", get(health::health).options(health::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(middleware::from_fn(session_guard))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(store))
                .layer(Extension(identity))
                .layer(Extension(session)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(
    port: u16,
    store: SharedStore,
    identity: SharedIdentity,
    session: SessionConfig,
) -> Result<()> {
    info!(
        "Using {} vehicle store and {} identity provider",
        store.name(),
        identity.name()
    );

    let app = router(store, identity, session);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = route,
        request_id
    )
}
