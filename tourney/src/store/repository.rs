//! Typed repository over an [`EntityStore`].

use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Entity, EntityId, EntityStore, Record, StoreResult};

/// One repository interface for every record type.
///
/// Encodes entities to JSON on the way in and stamps the store-assigned id
/// back onto them on the way out.
pub struct Repository<T> {
    store: Arc<dyn EntityStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn decode(record: Record) -> StoreResult<T> {
        let mut entity: T = serde_json::from_value(record.data)?;
        entity.set_id(record.id);
        Ok(entity)
    }

    fn decode_all(records: Vec<Record>) -> StoreResult<Vec<T>> {
        records.into_iter().map(Self::decode).collect()
    }

    /// Find an entity by id
    pub async fn find(&self, id: EntityId) -> StoreResult<Option<T>> {
        self.store
            .find(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Persist a new entity; the returned copy carries its assigned id
    pub async fn create(&self, mut entity: T) -> StoreResult<T> {
        let id = self
            .store
            .create(T::COLLECTION, serde_json::to_value(&entity)?)
            .await?;
        entity.set_id(id);
        Ok(entity)
    }

    /// Overwrite an existing entity
    pub async fn save(&self, entity: &T) -> StoreResult<()> {
        self.store
            .save(T::COLLECTION, entity.id(), serde_json::to_value(entity)?)
            .await
    }

    /// Entities whose `field` equals `value`, in creation order
    pub async fn scan_where(&self, field: &str, value: impl Into<Value>) -> StoreResult<Vec<T>> {
        let records = self
            .store
            .scan_where(T::COLLECTION, field, &value.into())
            .await?;
        Self::decode_all(records)
    }

    /// Every entity of this type, in creation order
    pub async fn all(&self) -> StoreResult<Vec<T>> {
        Self::decode_all(self.store.all(T::COLLECTION).await?)
    }

    /// Delete an entity, returning whether it existed
    pub async fn delete(&self, id: EntityId) -> StoreResult<bool> {
        self.store.delete(T::COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{Match, Team};
    use crate::store::{MemoryStore, StoreError};
    use serde_json::json;

    fn store() -> Arc<dyn EntityStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let teams = Repository::<Team>::new(store());

        let lions = teams.create(Team::new("Lions", Some(4.0))).await.unwrap();
        let tigers = teams.create(Team::new("Tigers", None)).await.unwrap();

        assert_eq!(lions.id, 1);
        assert_eq!(tigers.id, 2);
        assert_eq!(teams.find(2).await.unwrap(), Some(tigers));
        assert_eq!(teams.find(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_round_trips() {
        let matches = Repository::<Match>::new(store());
        let mut m = matches
            .create(Match::new(7, 1, Some(10), Some(11)))
            .await
            .unwrap();

        m.team_a_score = Some(3);
        m.team_b_score = Some(1);
        m.winner_id = Some(10);
        matches.save(&m).await.unwrap();

        assert_eq!(matches.find(m.id).await.unwrap(), Some(m));
    }

    #[tokio::test]
    async fn test_scan_where_by_typed_field() {
        let matches = Repository::<Match>::new(store());
        matches.create(Match::new(1, 1, Some(1), Some(2))).await.unwrap();
        matches.create(Match::new(2, 1, Some(3), Some(4))).await.unwrap();
        matches.create(Match::new(1, 1, Some(5), Some(6))).await.unwrap();

        let first = matches.scan_where("tournament_id", 1).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|m| m.tournament_id == 1));
        assert!(first[0].id < first[1].id);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_a_serialization_error() {
        let raw = store();
        let id = raw
            .create(Team::COLLECTION, json!({"name": 12}))
            .await
            .unwrap();

        let teams = Repository::<Team>::new(raw);
        let err = teams.find(id).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
