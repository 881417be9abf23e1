//! Explicit parsing of stored vehicle documents.
//!
//! Backends hand back loosely typed JSON. Instead of trusting that shape, each
//! field is read on its own: missing or `null` text becomes `""`, numbers and
//! booleans are stringified, and containers where text is expected are
//! rejected. A missing `tyres` map yields an all-empty tyre.

use super::{Tyre, VehicleBody};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("vehicle record is not an object")]
    NotAnObject,

    #[error("vehicle record field `{field}` has an unsupported type")]
    InvalidField { field: &'static str },
}

/// Parse a stored document body into a [`VehicleBody`].
///
/// # Errors
/// Returns [`RecordError`] when the body is not an object or a field holds a
/// container where text is expected.
pub fn parse_body(value: &Value) -> Result<VehicleBody, RecordError> {
    let Value::Object(fields) = value else {
        return Err(RecordError::NotAnObject);
    };

    let tyres = match fields.get("tyres") {
        None | Some(Value::Null) => Tyre::default(),
        Some(Value::Object(tyre)) => parse_tyre(tyre)?,
        Some(_) => return Err(RecordError::InvalidField { field: "tyres" }),
    };

    Ok(VehicleBody {
        current_mileage: text(fields, "currentMileage")?,
        kind: text(fields, "type")?,
        tyres,
    })
}

fn parse_tyre(fields: &Map<String, Value>) -> Result<Tyre, RecordError> {
    Ok(Tyre {
        width: text(fields, "width")?,
        aspect_ratio: text(fields, "aspectRatio")?,
        rim_diameter: text(fields, "rimDiameter")?,
        brand: text(fields, "brand")?,
        kind: text(fields, "type")?,
        date_changed: text(fields, "dateChanged")?,
        max_mileage: text(fields, "maxMileage")?,
        vehicle_mileage_when_changed: text(fields, "vehicleMileageWhenChanged")?,
        notes: text(fields, "notes")?,
    })
}

fn text(fields: &Map<String, Value>, field: &'static str) -> Result<String, RecordError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        Some(Value::Bool(value)) => Ok(value.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Err(RecordError::InvalidField { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_record() -> Result<(), RecordError> {
        let body = parse_body(&json!({
            "currentMileage": "10000",
            "type": "car",
            "tyres": {
                "aspectRatio": "55",
                "brand": "Michelin",
                "dateChanged": "1/1/2024",
                "maxMileage": "60000",
                "notes": "",
                "rimDiameter": "16",
                "type": "Summer Tyres",
                "vehicleMileageWhenChanged": "5000",
                "width": "205"
            }
        }))?;

        assert_eq!(body.current_mileage, "10000");
        assert_eq!(body.kind, "car");
        assert_eq!(body.tyres.brand, "Michelin");
        assert_eq!(body.tyres.size(), "205/55R16");
        assert_eq!(body.tyres.vehicle_mileage_when_changed, "5000");
        Ok(())
    }

    #[test]
    fn missing_fields_default_to_empty() -> Result<(), RecordError> {
        let body = parse_body(&json!({ "type": "truck" }))?;
        assert_eq!(body.kind, "truck");
        assert_eq!(body.current_mileage, "");
        assert_eq!(body.tyres, Tyre::default());
        Ok(())
    }

    #[test]
    fn null_counts_as_missing() -> Result<(), RecordError> {
        let body = parse_body(&json!({ "currentMileage": null, "tyres": null }))?;
        assert_eq!(body.current_mileage, "");
        assert_eq!(body.tyres, Tyre::default());
        Ok(())
    }

    #[test]
    fn scalars_are_stringified() -> Result<(), RecordError> {
        let body = parse_body(&json!({
            "currentMileage": 12500,
            "tyres": { "width": 205, "notes": true }
        }))?;
        assert_eq!(body.current_mileage, "12500");
        assert_eq!(body.tyres.width, "205");
        assert_eq!(body.tyres.notes, "true");
        Ok(())
    }

    #[test]
    fn unknown_fields_are_ignored() -> Result<(), RecordError> {
        let body = parse_body(&json!({ "color": "red", "type": "car" }))?;
        assert_eq!(body.kind, "car");
        Ok(())
    }

    #[test]
    fn rejects_non_object_body() {
        assert_eq!(parse_body(&json!("car")), Err(RecordError::NotAnObject));
        assert_eq!(parse_body(&json!([])), Err(RecordError::NotAnObject));
    }

    #[test]
    fn rejects_container_where_text_expected() {
        assert_eq!(
            parse_body(&json!({ "currentMileage": ["1"] })),
            Err(RecordError::InvalidField {
                field: "currentMileage"
            })
        );
        assert_eq!(
            parse_body(&json!({ "tyres": { "brand": { "name": "x" } } })),
            Err(RecordError::InvalidField { field: "brand" })
        );
    }

    #[test]
    fn rejects_non_object_tyres() {
        assert_eq!(
            parse_body(&json!({ "tyres": "Michelin" })),
            Err(RecordError::InvalidField { field: "tyres" })
        );
    }
}
