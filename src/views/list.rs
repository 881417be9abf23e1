//! Vehicle list with the "Add vehicle" dialog.

use super::{Notification, ViewState};
use crate::{
    identity::User,
    store::VehicleStore,
    vehicles::{NewVehicleForm, Vehicle},
};
use tracing::{error, info};
use url::Url;

pub const LIST_PATH: &str = "/dashboard/vehicles";

pub const FETCH_FAILED: &str = "Failed to fetch vehicles";
pub const CREATED: &str = "Vehicle added successfully!";
pub const CREATE_FAILED: &str = "Failed to add vehicle. Please try again.";

/// What a submission did, so the caller can pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Invalid,
    Failed,
    SignedOut,
}

#[derive(Debug)]
pub struct VehicleListView {
    pub state: ViewState,
    pub vehicles: Vec<Vehicle>,
    pub form: NewVehicleForm,
    pub dialog_open: bool,
    pub notification: Option<Notification>,
}

impl Default for VehicleListView {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleListView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ViewState::Initializing,
            vehicles: Vec::new(),
            form: NewVehicleForm::default(),
            dialog_open: false,
            notification: None,
        }
    }

    /// Replace the list with the owner's vehicles.
    ///
    /// Without a user nothing is fetched and the list stays empty. A failed
    /// read keeps the previous list and raises a notification.
    pub async fn load(&mut self, store: &dyn VehicleStore, user: Option<&User>) {
        let Some(user) = user else {
            return;
        };

        self.state = ViewState::Loading;
        match store.list(user).await {
            Ok(vehicles) => {
                self.vehicles = vehicles;
                self.state = ViewState::Ready;
            }
            Err(e) => {
                error!("Failed to fetch vehicles: {e}");
                self.notification = Some(Notification::error(FETCH_FAILED));
                self.state = ViewState::Error;
            }
        }
    }

    /// Write a new vehicle keyed by its plate.
    ///
    /// On success the in-memory entry with the same plate is replaced (or the
    /// vehicle appended), the form resets and the dialog closes. Otherwise the
    /// dialog stays open with the submitted values.
    pub async fn create(
        &mut self,
        store: &dyn VehicleStore,
        user: Option<&User>,
        form: NewVehicleForm,
    ) -> CreateOutcome {
        let Some(user) = user else {
            return CreateOutcome::SignedOut;
        };

        let vehicle = match form.to_vehicle() {
            Ok(vehicle) => vehicle,
            Err(e) => {
                self.form = form;
                self.dialog_open = true;
                self.notification = Some(Notification::error(e.to_string()));
                return CreateOutcome::Invalid;
            }
        };

        match store.put(user, &vehicle).await {
            Ok(()) => {
                info!("vehicle {} saved", vehicle.plate);
                match self.vehicles.iter_mut().find(|v| v.plate == vehicle.plate) {
                    Some(existing) => *existing = vehicle,
                    None => self.vehicles.push(vehicle),
                }
                self.form = NewVehicleForm::default();
                self.dialog_open = false;
                self.notification = Some(Notification::success(CREATED));
                CreateOutcome::Created
            }
            Err(e) => {
                error!("Failed to add vehicle: {e}");
                self.form = form;
                self.dialog_open = true;
                self.notification = Some(Notification::error(CREATE_FAILED));
                CreateOutcome::Failed
            }
        }
    }
}

/// Detail page path for `plate`, percent-encoded as a single segment.
#[must_use]
pub fn detail_path(plate: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/dashboard/vehicles") else {
        return LIST_PATH.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(plate);
    }
    url.path().to_string()
}
