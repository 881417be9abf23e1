use super::handlers::{api_vehicles, health};
use crate::vehicles::{Tyre, Vehicle};
use utoipa::{
    openapi::{Contact, License},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        api_vehicles::list,
        api_vehicles::create,
        api_vehicles::get,
    ),
    components(schemas(health::Health, Vehicle, Tyre, api_vehicles::ApiError)),
    modifiers(&CargoInfo),
    tags(
        (name = "health", description = "Service health"),
        (name = "vehicles", description = "Vehicles and their tyre records"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Fill the document info from Cargo metadata.
struct CargoInfo;

impl Modify for CargoInfo {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let info = &mut openapi.info;
        info.title = env!("CARGO_PKG_NAME").to_string();
        info.version = env!("CARGO_PKG_VERSION").to_string();
        info.description = optional_str(env!("CARGO_PKG_DESCRIPTION")).map(str::to_string);
        info.contact = cargo_contact();
        info.license = cargo_license();
    }
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    fn non_empty(s: &str) -> Option<&str> {
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    match author.split_once('<') {
        Some((name, email)) => (
            non_empty(name.trim()),
            non_empty(email.trim_end_matches('>').trim()),
        ),
        None => (non_empty(author.trim()), None),
    }
}
