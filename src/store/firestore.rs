//! Cloud Firestore backend over the REST v1 API.
//!
//! Documents live at `users/{userId}/vehicles/{plate}` under the configured
//! project and database. Every call carries the signed-in user's ID token so
//! Firestore security rules apply on the user's behalf.

use super::{check_key, StoreError, VehicleStore};
use crate::{
    identity::User,
    vehicles::{record, Vehicle},
    APP_USER_AGENT,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";

#[derive(Debug)]
pub struct FirestoreStore {
    client: Client,
    // .../projects/{project}/databases/{database}/documents
    documents: Url,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    /// # Errors
    /// Returns an error if the base URL cannot carry path segments or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, project: &str, database: &str) -> Result<Self> {
        if project.trim().is_empty() {
            return Err(anyhow!("Firestore project id is required"));
        }

        let mut documents =
            Url::parse(base_url).with_context(|| format!("Invalid Firestore URL: {base_url}"))?;
        documents
            .path_segments_mut()
            .map_err(|()| anyhow!("Firestore URL cannot be a base: {base_url}"))?
            .pop_if_empty()
            .extend(["projects", project, "databases", database, "documents"]);

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build Firestore HTTP client")?;

        Ok(Self { client, documents })
    }

    fn collection_url(&self, owner: &User) -> Result<Url, StoreError> {
        self.url_for(&["users", owner.id(), "vehicles"])
    }

    fn document_url(&self, owner: &User, plate: &str) -> Result<Url, StoreError> {
        check_key(owner, plate)?;
        self.url_for(&["users", owner.id(), "vehicles", plate])
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.documents.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidKey(segments.join("/")))?
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, owner: &User) -> RequestBuilder {
        request.bearer_auth(owner.credential().expose_secret())
    }
}

#[async_trait]
impl VehicleStore for FirestoreStore {
    #[instrument(skip_all, fields(user = owner.id()))]
    async fn list(&self, owner: &User) -> Result<Vec<Vehicle>, StoreError> {
        let url = self.collection_url(owner)?;
        let mut vehicles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.authorized(self.client.get(url.clone()), owner);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListResponse = check(request.send().await?).await?.json().await?;

            for document in page.documents {
                let plate = document_id(&document.name);
                match parse_document(&plate, document.fields) {
                    Ok(vehicle) => vehicles.push(vehicle),
                    Err(e) => warn!("skipping vehicle record: {e}"),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("listed {} vehicles", vehicles.len());
        Ok(vehicles)
    }

    #[instrument(skip(self, owner), fields(user = owner.id()))]
    async fn get(&self, owner: &User, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        let url = self.document_url(owner, plate)?;
        let response = self.authorized(self.client.get(url), owner).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Document = check(response).await?.json().await?;
        parse_document(plate, document.fields).map(Some)
    }

    #[instrument(skip_all, fields(user = owner.id(), plate = %vehicle.plate))]
    async fn put(&self, owner: &User, vehicle: &Vehicle) -> Result<(), StoreError> {
        let url = self.document_url(owner, &vehicle.plate)?;
        let body = serde_json::to_value(vehicle.body()).map_err(|e| StoreError::Backend {
            status: 0,
            message: format!("failed to encode vehicle: {e}"),
        })?;

        let fields = match encode_value(&body) {
            Value::Object(mut typed) => typed
                .remove("mapValue")
                .and_then(|mut map| map.get_mut("fields").map(Value::take))
                .unwrap_or_else(|| json!({})),
            _ => json!({}),
        };

        let response = self
            .authorized(self.client.patch(url), owner)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(self.documents.clone())
            .query(&[("pageSize", "1")])
            .send()
            .await?;

        // Auth failures still prove the service answered.
        if response.status().is_server_error() {
            return Err(backend_error(response).await);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "firestore"
    }
}

async fn check(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(backend_error(response).await)
    }
}

async fn backend_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    StoreError::Backend { status, message }
}

fn parse_document(plate: &str, fields: Map<String, Value>) -> Result<Vehicle, StoreError> {
    let plain = decode_fields(fields);
    record::parse_body(&plain)
        .map(|body| Vehicle::from_body(plate, body))
        .map_err(|source| StoreError::InvalidRecord {
            plate: plate.to_string(),
            source,
        })
}

/// Last segment of a resource name such as
/// `projects/p/databases/(default)/documents/users/u1/vehicles/ABC123`.
fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or_default().to_string()
}

fn decode_fields(fields: Map<String, Value>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key, decode_value(value)))
            .collect(),
    )
}

/// Typed Firestore value into plain JSON.
fn decode_value(value: Value) -> Value {
    let Value::Object(mut typed) = value else {
        return Value::Null;
    };

    if let Some(v) = typed.remove("stringValue") {
        return v;
    }
    if let Some(v) = typed.remove("integerValue") {
        // int64 travels as a JSON string
        return match v {
            Value::String(s) => s.parse::<i64>().map_or(Value::String(s), Value::from),
            other => other,
        };
    }
    if let Some(v) = typed.remove("doubleValue") {
        return v;
    }
    if let Some(v) = typed.remove("booleanValue") {
        return v;
    }
    if typed.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(v) = typed.remove("timestampValue") {
        return v;
    }
    if let Some(mut map) = typed.remove("mapValue") {
        return match map.get_mut("fields").map(Value::take) {
            Some(Value::Object(fields)) => decode_fields(fields),
            _ => Value::Object(Map::new()),
        };
    }
    if let Some(mut array) = typed.remove("arrayValue") {
        return match array.get_mut("values").map(Value::take) {
            Some(Value::Array(values)) => {
                Value::Array(values.into_iter().map(decode_value).collect())
            }
            _ => Value::Array(Vec::new()),
        };
    }

    Value::Null
}

/// Plain JSON into a typed Firestore value.
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => {
            let fields: Map<String, Value> = fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn encode_number(n: &Number) -> Value {
    match n.as_i64() {
        Some(i) => json!({ "integerValue": i.to_string() }),
        None => json!({ "doubleValue": n.as_f64() }),
    }
}
