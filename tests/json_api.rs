//! `/v1/vehicles` JSON API and `/health` through the full router.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Request, StatusCode},
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tyretrack::{
    api,
    identity::{local::LocalIdentity, IdentityProvider},
    session::SessionConfig,
    store::memory::MemoryStore,
};

async fn app_with_token() -> Result<(Router, String)> {
    let identity = Arc::new(LocalIdentity::new());
    let signed_in = identity
        .sign_up(
            "driver@example.com",
            &SecretString::from("secret-pass".to_string()),
        )
        .await?;
    let token = signed_in.user.credential().expose_secret().to_string();
    let router = api::router(
        Arc::new(MemoryStore::new()),
        identity,
        SessionConfig::new(),
    );
    Ok((router, token))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

fn abc123(mileage: &str) -> Value {
    json!({
        "plate": " ABC123 ",
        "currentMileage": mileage,
        "type": "car",
        "tyres": {
            "width": "205",
            "aspectRatio": "55",
            "rimDiameter": "16",
            "brand": "Michelin",
            "type": "summer",
            "dateChanged": "3/1/2024",
            "maxMileage": "40000",
            "vehicleMileageWhenChanged": "5000",
            "notes": ""
        }
    })
}

#[tokio::test]
async fn requires_a_session() -> Result<()> {
    let (app, _) = app_with_token().await?;

    let (status, body) = call(&app, "GET", "/v1/vehicles", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "You must be signed in");

    let (status, _) = call(&app, "GET", "/v1/vehicles", Some("forged"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_then_read() -> Result<()> {
    let (app, token) = app_with_token().await?;

    let (status, created) =
        call(&app, "POST", "/v1/vehicles", Some(&token), Some(abc123("52000"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["plate"], "ABC123");

    let (status, list) = call(&app, "GET", "/v1/vehicles", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["tyres"]["brand"], "Michelin");

    let (status, vehicle) =
        call(&app, "GET", "/v1/vehicles/ABC123", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vehicle["currentMileage"], "52000");
    assert_eq!(vehicle["tyres"]["vehicleMileageWhenChanged"], "5000");
    Ok(())
}

#[tokio::test]
async fn last_write_wins() -> Result<()> {
    let (app, token) = app_with_token().await?;

    call(&app, "POST", "/v1/vehicles", Some(&token), Some(abc123("52000"))).await?;
    call(&app, "POST", "/v1/vehicles", Some(&token), Some(abc123("61000"))).await?;

    let (_, list) = call(&app, "GET", "/v1/vehicles", Some(&token), None).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["currentMileage"], "61000");
    Ok(())
}

#[tokio::test]
async fn missing_and_unusable_plates_are_not_found() -> Result<()> {
    let (app, token) = app_with_token().await?;

    let (status, body) = call(&app, "GET", "/v1/vehicles/NOPE1", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vehicle not found");

    let (status, _) = call(&app, "GET", "/v1/vehicles/A%2FB", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn incomplete_vehicle_is_rejected() -> Result<()> {
    let (app, token) = app_with_token().await?;

    let mut vehicle = abc123("52000");
    vehicle["tyres"]["brand"] = json!("");
    let (status, body) =
        call(&app, "POST", "/v1/vehicles", Some(&token), Some(vehicle)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("Brand")));

    let (_, list) = call(&app, "GET", "/v1/vehicles", Some(&token), None).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn health_and_openapi_are_public() -> Result<()> {
    let (app, _) = app_with_token().await?;

    let (status, health) = call(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["store"], "memory:ok");
    assert_eq!(health["identity"], "local");

    let (status, doc) = call(&app, "GET", "/api-docs/openapi.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/v1/vehicles/{plate}"].is_object());
    Ok(())
}
