//! `/health`: build info plus a store reachability probe.

use crate::{
    api::{SharedIdentity, SharedStore},
    identity::IdentityProvider,
    store::VehicleStore,
    GIT_COMMIT_HASH,
};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

const HEALTH_STORE_TIMEOUT_SECONDS: u64 = 2;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    store: String,
    identity: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Vehicle store is reachable", body = Health),
        (status = 503, description = "Vehicle store is unreachable", body = Health)
    ),
    tag = "health",
)]
/// Report build info and whether the vehicle store answers.
pub async fn health(
    method: Method,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
) -> impl IntoResponse {
    let store_healthy = probe_store(&store).await;

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: format!(
            "{}:{}",
            store.name(),
            if store_healthy { "ok" } else { "error" }
        ),
        identity: identity.name().to_string(),
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();
            headers.insert("X-App", x_app_header_value);
            headers
        })
        .map_err(|err| {
            debug!("Failed to parse X-App header: {}", err);
        })
        .unwrap_or_else(|()| HeaderMap::new());

    if store_healthy {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}

async fn probe_store(store: &SharedStore) -> bool {
    match timeout(Duration::from_secs(HEALTH_STORE_TIMEOUT_SECONDS), store.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("Failed to ping {} store: {e}", store.name());
            false
        }
        Err(_) => {
            warn!("{} store health check timed out", store.name());
            false
        }
    }
}
