//! Vehicle record store.
//!
//! Records are addressed as `users/{userId}/vehicles/{plate}`. Writes are
//! create-or-replace on that key, so the last write wins and no uniqueness
//! check happens beforehand. A user only ever sees their own key space.

pub mod firestore;
pub mod memory;
pub mod postgres;

use crate::{
    identity::User,
    vehicles::{record::RecordError, valid_plate, Vehicle},
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vehicle store unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("vehicle store returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("stored vehicle {plate:?} is malformed: {source}")]
    InvalidRecord {
        plate: String,
        #[source]
        source: RecordError,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid vehicle key: {0:?}")]
    InvalidKey(String),
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// All vehicles under the owner's collection, in backend order.
    async fn list(&self, owner: &User) -> Result<Vec<Vehicle>, StoreError>;

    /// Single vehicle by exact plate; `Ok(None)` when no record exists.
    async fn get(&self, owner: &User, plate: &str) -> Result<Option<Vehicle>, StoreError>;

    /// Create or replace the record keyed by `vehicle.plate`.
    async fn put(&self, owner: &User, vehicle: &Vehicle) -> Result<(), StoreError>;

    /// Cheap reachability check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    fn name(&self) -> &'static str;
}

/// Reject keys that cannot address a single document.
///
/// # Errors
/// Returns [`StoreError::InvalidKey`] for an empty user id or an unusable plate.
pub fn check_key(owner: &User, plate: &str) -> Result<(), StoreError> {
    if owner.id().is_empty() || owner.id().contains('/') {
        return Err(StoreError::InvalidKey(owner.id().to_string()));
    }
    if !valid_plate(plate) {
        return Err(StoreError::InvalidKey(plate.to_string()));
    }
    Ok(())
}
