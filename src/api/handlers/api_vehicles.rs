//! JSON API over the signed-in user's vehicles.
//!
//! Accepts the session cookie or an `Authorization: Bearer` credential.

use super::current_user;
use crate::{
    api::{SharedIdentity, SharedStore},
    store::{StoreError, VehicleStore},
    vehicles::Vehicle,
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub message: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            message: message.into(),
        }),
    )
        .into_response()
}

fn unauthorized() -> Response {
    api_error(StatusCode::UNAUTHORIZED, "You must be signed in")
}

#[utoipa::path(
    get,
    path = "/v1/vehicles",
    responses(
        (status = 200, description = "Vehicles owned by the signed-in user", body = [Vehicle]),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 502, description = "Vehicle store failed", body = ApiError),
    ),
    tag = "vehicles"
)]
pub async fn list(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
) -> Response {
    let Some(user) = current_user(&headers, &identity).await else {
        return unauthorized();
    };

    match store.list(&user).await {
        Ok(vehicles) => (StatusCode::OK, Json(vehicles)).into_response(),
        Err(e) => {
            error!("Failed to fetch vehicles: {e}");
            api_error(StatusCode::BAD_GATEWAY, "Failed to fetch vehicles")
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/vehicles",
    request_body = Vehicle,
    responses(
        (status = 201, description = "Vehicle stored (replacing any vehicle with the same plate)", body = Vehicle),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 422, description = "Required fields missing or unusable plate", body = ApiError),
        (status = 502, description = "Vehicle store failed", body = ApiError),
    ),
    tag = "vehicles"
)]
pub async fn create(
    headers: HeaderMap,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
    Json(mut vehicle): Json<Vehicle>,
) -> Response {
    let Some(user) = current_user(&headers, &identity).await else {
        return unauthorized();
    };

    vehicle.plate = vehicle.plate.trim().to_string();
    if let Err(e) = vehicle.check() {
        return api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
    }

    match store.put(&user, &vehicle).await {
        Ok(()) => (StatusCode::CREATED, Json(vehicle)).into_response(),
        Err(e) => {
            error!("Failed to add vehicle: {e}");
            api_error(StatusCode::BAD_GATEWAY, "Failed to add vehicle")
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/vehicles/{plate}",
    params(
        ("plate" = String, Path, description = "License plate identifying the vehicle")
    ),
    responses(
        (status = 200, description = "Vehicle found", body = Vehicle),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 404, description = "No vehicle with this plate", body = ApiError),
        (status = 502, description = "Vehicle store failed", body = ApiError),
    ),
    tag = "vehicles"
)]
pub async fn get(
    headers: HeaderMap,
    Path(plate): Path<String>,
    store: Extension<SharedStore>,
    identity: Extension<SharedIdentity>,
) -> Response {
    let Some(user) = current_user(&headers, &identity).await else {
        return unauthorized();
    };

    match store.get(&user, &plate).await {
        Ok(Some(vehicle)) => (StatusCode::OK, Json(vehicle)).into_response(),
        Ok(None) | Err(StoreError::InvalidKey(_)) => {
            api_error(StatusCode::NOT_FOUND, "Vehicle not found")
        }
        Err(e) => {
            error!("Failed to fetch vehicle details: {e}");
            api_error(StatusCode::BAD_GATEWAY, "Failed to fetch vehicle details")
        }
    }
}
