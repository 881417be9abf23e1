//! Creation form for new vehicles.

use super::{InvalidVehicle, Tyre, TyreType, Vehicle, VehicleType};
use chrono::Local;
use serde::Deserialize;

/// Fields posted by the "Add vehicle" dialog.
///
/// Missing form fields deserialize to the same defaults as a fresh dialog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewVehicleForm {
    pub plate: String,
    pub current_mileage: String,
    pub vehicle_type: String,
    pub tyre_brand: String,
    pub tyre_type: String,
    pub tyre_width: String,
    pub tyre_aspect_ratio: String,
    pub tyre_rim_diameter: String,
    pub tyre_date_changed: String,
    pub tyre_max_mileage: String,
    pub tyre_mileage_when_changed: String,
    pub tyre_notes: String,
}

impl Default for NewVehicleForm {
    fn default() -> Self {
        Self {
            plate: String::new(),
            current_mileage: String::new(),
            vehicle_type: VehicleType::Car.as_str().to_string(),
            tyre_brand: String::new(),
            tyre_type: TyreType::Winter.as_str().to_string(),
            tyre_width: String::new(),
            tyre_aspect_ratio: String::new(),
            tyre_rim_diameter: String::new(),
            tyre_date_changed: today(),
            tyre_max_mileage: String::new(),
            tyre_mileage_when_changed: String::new(),
            tyre_notes: String::new(),
        }
    }
}

impl NewVehicleForm {
    /// Build the vehicle to write; only the plate is trimmed since it becomes the key.
    ///
    /// # Errors
    /// Returns [`InvalidVehicle`] when a required field is blank or the plate is unusable.
    pub fn to_vehicle(&self) -> Result<Vehicle, InvalidVehicle> {
        let vehicle = Vehicle {
            plate: self.plate.trim().to_string(),
            current_mileage: self.current_mileage.clone(),
            kind: self.vehicle_type.clone(),
            tyres: Tyre {
                width: self.tyre_width.clone(),
                aspect_ratio: self.tyre_aspect_ratio.clone(),
                rim_diameter: self.tyre_rim_diameter.clone(),
                brand: self.tyre_brand.clone(),
                kind: self.tyre_type.clone(),
                date_changed: self.tyre_date_changed.clone(),
                max_mileage: self.tyre_max_mileage.clone(),
                vehicle_mileage_when_changed: self.tyre_mileage_when_changed.clone(),
                notes: self.tyre_notes.clone(),
            },
        };
        vehicle.check()?;
        Ok(vehicle)
    }
}

/// Current local date in the `M/D/YYYY` form the creation dialog pre-fills.
#[must_use]
pub fn today() -> String {
    Local::now().format("%-m/%-d/%Y").to_string()
}
