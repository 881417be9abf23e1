use super::{check_key, StoreError, VehicleStore};
use crate::{
    identity::User,
    vehicles::{Vehicle, VehicleBody},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::instrument;

/// In-process store, ordered by `(user, plate)` so listings come back sorted by plate.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<(String, String), VehicleBody>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    #[instrument(skip_all, fields(user = owner.id()))]
    async fn list(&self, owner: &User) -> Result<Vec<Vehicle>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|((user, _), _)| user == owner.id())
            .map(|((_, plate), body)| Vehicle::from_body(plate.clone(), body.clone()))
            .collect())
    }

    #[instrument(skip(self, owner), fields(user = owner.id()))]
    async fn get(&self, owner: &User, plate: &str) -> Result<Option<Vehicle>, StoreError> {
        check_key(owner, plate)?;
        let records = self.records.read().await;
        Ok(records
            .get(&(owner.id().to_string(), plate.to_string()))
            .map(|body| Vehicle::from_body(plate, body.clone())))
    }

    #[instrument(skip_all, fields(user = owner.id(), plate = %vehicle.plate))]
    async fn put(&self, owner: &User, vehicle: &Vehicle) -> Result<(), StoreError> {
        check_key(owner, &vehicle.plate)?;
        self.records.write().await.insert(
            (owner.id().to_string(), vehicle.plate.clone()),
            vehicle.body(),
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicles::Tyre;
    use anyhow::Result;
    use secrecy::SecretString;

    fn user(id: &str) -> User {
        User::new(id, format!("{id}@example.com"), SecretString::from("t".to_string()))
    }

    fn vehicle(plate: &str, mileage: &str) -> Vehicle {
        Vehicle {
            plate: plate.to_string(),
            current_mileage: mileage.to_string(),
            kind: "car".to_string(),
            tyres: Tyre {
                brand: "Michelin".to_string(),
                ..Tyre::default()
            },
        }
    }

    #[tokio::test]
    async fn put_then_get_returns_written_body() -> Result<()> {
        let store = MemoryStore::new();
        let u1 = user("u1");
        let written = vehicle("ABC123", "10000");
        store.put(&u1, &written).await?;

        assert_eq!(store.get(&u1, "ABC123").await?, Some(written));
        assert_eq!(store.get(&u1, "ZZZ999").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn put_overwrites_same_plate() -> Result<()> {
        let store = MemoryStore::new();
        let u1 = user("u1");
        store.put(&u1, &vehicle("ABC123", "10000")).await?;
        store.put(&u1, &vehicle("ABC123", "12000")).await?;

        let listed = store.list(&u1).await?;
        assert_eq!(listed, vec![vehicle("ABC123", "12000")]);
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_scoped_to_owner() -> Result<()> {
        let store = MemoryStore::new();
        store.put(&user("u1"), &vehicle("ABC123", "1")).await?;
        store.put(&user("u2"), &vehicle("XYZ789", "2")).await?;
        store.put(&user("u10"), &vehicle("LMN456", "3")).await?;

        let listed = store.list(&user("u1")).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].plate, "ABC123");
        assert_eq!(store.get(&user("u2"), "ABC123").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_sorted_by_plate() -> Result<()> {
        let store = MemoryStore::new();
        let u1 = user("u1");
        for plate in ["MNO", "ABC", "XYZ"] {
            store.put(&u1, &vehicle(plate, "1")).await?;
        }
        let plates: Vec<String> = store.list(&u1).await?.into_iter().map(|v| v.plate).collect();
        assert_eq!(plates, ["ABC", "MNO", "XYZ"]);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_slash_in_plate() {
        let store = MemoryStore::new();
        let result = store.put(&user("u1"), &vehicle("A/B", "1")).await;
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }
}
