//! Vehicle and tyre records.
//!
//! A [`Vehicle`] is identified by its plate inside the owner's collection and
//! always embeds exactly one [`Tyre`]. Text fields are free-form: sizes and
//! mileages are not parsed as numbers, and the vehicle/tyre type sets only drive
//! the creation form, they are not enforced on stored data.

pub mod form;
pub mod record;

pub use self::form::NewVehicleForm;

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Single tyre record embedded in a vehicle (not per wheel, not historical).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Tyre {
    pub width: String,
    pub aspect_ratio: String,
    pub rim_diameter: String,
    pub brand: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date_changed: String,
    pub max_mileage: String,
    pub vehicle_mileage_when_changed: String,
    pub notes: String,
}

impl Tyre {
    /// Size triple as printed on the sidewall, e.g. `205/55R16`.
    #[must_use]
    pub fn size(&self) -> String {
        format!("{}/{}R{}", self.width, self.aspect_ratio, self.rim_diameter)
    }

    /// Empty or blank notes mean "no notes".
    #[must_use]
    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

/// Stored document body; the plate is the document key and is not repeated here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleBody {
    pub current_mileage: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tyres: Tyre,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Vehicle {
    pub plate: String,
    pub current_mileage: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tyres: Tyre,
}

impl Vehicle {
    /// Compose a vehicle from its storage key and document body.
    #[must_use]
    pub fn from_body(plate: impl Into<String>, body: VehicleBody) -> Self {
        Self {
            plate: plate.into(),
            current_mileage: body.current_mileage,
            kind: body.kind,
            tyres: body.tyres,
        }
    }

    /// Document body written under `users/{userId}/vehicles/{plate}`.
    #[must_use]
    pub fn body(&self) -> VehicleBody {
        VehicleBody {
            current_mileage: self.current_mileage.clone(),
            kind: self.kind.clone(),
            tyres: self.tyres.clone(),
        }
    }

    /// Check the fields the creation surface requires.
    ///
    /// # Errors
    /// Returns [`InvalidVehicle`] listing every required field left blank, or
    /// flagging a plate that cannot be used as a document key.
    pub fn check(&self) -> Result<(), InvalidVehicle> {
        let required = [
            ("Plate", &self.plate),
            ("Current Mileage", &self.current_mileage),
            ("Brand", &self.tyres.brand),
            ("Width", &self.tyres.width),
            ("Aspect Ratio", &self.tyres.aspect_ratio),
            ("Rim Diameter", &self.tyres.rim_diameter),
            ("Max Mileage", &self.tyres.max_mileage),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();

        if !missing.is_empty() {
            return Err(InvalidVehicle::Missing(missing));
        }

        if !valid_plate(&self.plate) {
            return Err(InvalidVehicle::Plate(self.plate.clone()));
        }

        Ok(())
    }
}

/// A plate doubles as a single path segment, so it cannot contain `/` or be a
/// relative path component.
#[must_use]
pub fn valid_plate(plate: &str) -> bool {
    let plate = plate.trim();
    !plate.is_empty() && !plate.contains('/') && plate != "." && plate != ".."
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidVehicle {
    Missing(Vec<&'static str>),
    Plate(String),
}

impl fmt::Display for InvalidVehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(fields) => write!(f, "Please fill in: {}", fields.join(", ")),
            Self::Plate(plate) => write!(f, "Plate \"{plate}\" cannot be used as an identifier"),
        }
    }
}

impl std::error::Error for InvalidVehicle {}

/// Vehicle types offered by the creation form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleType {
    Car,
    Truck,
    Motorcycle,
}

impl VehicleType {
    pub const ALL: [Self; 3] = [Self::Car, Self::Truck, Self::Motorcycle];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Motorcycle => "motorcycle",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Truck => "Truck",
            Self::Motorcycle => "Motorcycle",
        }
    }
}

/// Tyre types offered by the creation form; the label is also the stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TyreType {
    Winter,
    Summer,
    AllSeason,
}

impl TyreType {
    pub const ALL: [Self; 3] = [Self::Winter, Self::Summer, Self::AllSeason];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "Winter Tyres",
            Self::Summer => "Summer Tyres",
            Self::AllSeason => "All Season Tyres",
        }
    }
}
