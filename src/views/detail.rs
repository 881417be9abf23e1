//! Read-only view of a single vehicle.

use super::{Notification, ViewState};
use crate::{
    identity::User,
    store::{StoreError, VehicleStore},
    vehicles::Vehicle,
};
use tracing::error;

pub const NOT_FOUND: &str = "Vehicle not found";
pub const FETCH_FAILED: &str = "Failed to fetch vehicle details";
pub const PLATE_MISSING: &str = "Vehicle plate is missing";
pub const SIGNED_OUT: &str = "You must be signed in";

#[derive(Debug, Default)]
pub struct VehicleDetailView {
    pub state: ViewState,
    pub vehicle: Option<Vehicle>,
    pub notification: Option<Notification>,
}

impl VehicleDetailView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the vehicle keyed by `plate`.
    ///
    /// A blank plate or a missing user ends in `Error` without fetching.
    pub async fn load(&mut self, store: &dyn VehicleStore, user: Option<&User>, plate: &str) {
        if plate.trim().is_empty() {
            self.fail(PLATE_MISSING);
            return;
        }
        let Some(user) = user else {
            self.fail(SIGNED_OUT);
            return;
        };

        self.state = ViewState::Loading;
        match store.get(user, plate).await {
            Ok(Some(vehicle)) => {
                self.vehicle = Some(vehicle);
                self.state = ViewState::Ready;
            }
            // a plate that cannot be a key cannot have a record either
            Ok(None) | Err(StoreError::InvalidKey(_)) => {
                self.notification = Some(Notification::error(NOT_FOUND));
                self.state = ViewState::NotFound;
            }
            Err(e) => {
                error!("Failed to fetch vehicle details: {e}");
                self.fail(FETCH_FAILED);
            }
        }
    }

    /// The navigation carried no plate to look up.
    #[must_use]
    pub fn plate_missing(&self) -> bool {
        self.state == ViewState::Error
            && self
                .notification
                .as_ref()
                .is_some_and(|n| n.message == PLATE_MISSING)
    }

    fn fail(&mut self, message: &str) {
        self.notification = Some(Notification::error(message));
        self.state = ViewState::Error;
    }
}
