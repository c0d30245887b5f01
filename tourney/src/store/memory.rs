//! In-process entity store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{EntityId, EntityStore, Record, StoreError, StoreResult};

#[derive(Default)]
struct Collections {
    records: HashMap<String, BTreeMap<EntityId, Value>>,
    last_id: EntityId,
}

/// Entity store kept entirely in memory.
///
/// Ids are drawn from one sequence shared by all collections, starting at 1,
/// the same way the PostgreSQL backend hands them out.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .await
            .records
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn with_id(mut data: Value, id: EntityId) -> Value {
    if let Value::Object(fields) = &mut data {
        fields.insert("id".to_string(), Value::from(id));
    }
    data
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find(&self, collection: &str, id: EntityId) -> StoreResult<Option<Record>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(collection)
            .and_then(|records| records.get(&id))
            .map(|data| Record {
                id,
                data: data.clone(),
            }))
    }

    async fn create(&self, collection: &str, data: Value) -> StoreResult<EntityId> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner
            .records
            .entry(collection.to_string())
            .or_default()
            .insert(id, with_id(data, id));
        Ok(id)
    }

    async fn save(&self, collection: &str, id: EntityId, data: Value) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        match inner
            .records
            .get_mut(collection)
            .and_then(|records| records.get_mut(&id))
        {
            Some(slot) => {
                *slot = with_id(data, id);
                Ok(())
            }
            None => Err(StoreError::Missing {
                collection: collection.to_string(),
                id,
            }),
        }
    }

    async fn scan_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, data)| data.get(field) == Some(value))
                    .map(|(&id, data)| Record {
                        id,
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn all(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(&id, data)| Record {
                        id,
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, id: EntityId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .records
            .get_mut(collection)
            .is_some_and(|records| records.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_ids_are_shared_across_collections() {
        let store = MemoryStore::new();

        let a = store.create("teams", json!({"name": "A"})).await.unwrap();
        let b = store.create("matches", json!({"round": 1})).await.unwrap();
        let c = store.create("teams", json!({"name": "C"})).await.unwrap();

        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(store.count("teams").await, 2);
        assert_eq!(store.count("matches").await, 1);
    }

    #[tokio::test]
    async fn test_create_writes_id_into_document() {
        let store = MemoryStore::new();
        let id = store.create("teams", json!({"id": 0, "name": "A"})).await.unwrap();

        let record = store.find("teams", id).await.unwrap().unwrap();
        assert_eq!(record.data["id"], json!(id));
    }

    #[tokio::test]
    async fn test_scan_where_filters_and_keeps_creation_order() {
        let store = MemoryStore::new();
        store.create("matches", json!({"round": 2})).await.unwrap();
        store.create("matches", json!({"round": 1})).await.unwrap();
        store.create("matches", json!({"round": 2})).await.unwrap();

        let found = store
            .scan_where("matches", "round", &json!(2))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let none = store
            .scan_where("teams", "round", &json!(2))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_save_missing_record_fails() {
        let store = MemoryStore::new();
        let err = store
            .save("teams", 42, json!({"name": "ghost"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let id = store.create("teams", json!({"name": "A"})).await.unwrap();

        assert!(store.delete("teams", id).await.unwrap());
        assert!(!store.delete("teams", id).await.unwrap());
        assert!(store.find("teams", id).await.unwrap().is_none());
    }
}
