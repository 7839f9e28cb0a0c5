//! In-process record store
//!
//! Backs `--dry-run` imports and the test suites. Collections keep insertion
//! order so "first match" behaves the way a store without an explicit sort
//! returns records.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::{Session, StoredRecord};
use super::query::{Filter, ListQuery};
use super::store::{RecordStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<StoredRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record verbatim, bypassing any reconciliation (seeding, tests)
    pub async fn insert_raw(&self, collection: &str, fields: Map<String, Value>) -> String {
        let id = new_record_id();
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredRecord::new(id.clone(), fields));
        id
    }

    /// Snapshot of a collection in insertion order
    pub async fn records(&self, collection: &str) -> Vec<StoredRecord> {
        let collections = self.collections.lock().await;
        collections.get(collection).cloned().unwrap_or_default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.lock().await;
        collections.get(collection).map_or(0, Vec::len)
    }
}

/// 15-character lowercase id, the shape the dashboard store assigns
fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()[..15].to_string()
}

fn project(record: &StoredRecord, fields: Option<&Vec<String>>) -> StoredRecord {
    match fields {
        None => record.clone(),
        Some(keep) => {
            let projected = record
                .fields
                .iter()
                .filter(|(k, _)| keep.iter().any(|f| f == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            StoredRecord::new(record.id.clone(), projected)
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create(
        &self,
        _session: &Session,
        collection: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<String> {
        Ok(self.insert_raw(collection, data.clone()).await)
    }

    async fn update_by_id(
        &self,
        _session: &Session,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or(StoreError::NotFound)?;
        for (key, value) in data {
            record.fields.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete_by_id(&self, _session: &Session, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        let records = collections.get_mut(collection).ok_or(StoreError::NotFound)?;
        let position = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        records.remove(position);
        Ok(())
    }

    async fn list_full(
        &self,
        _session: &Session,
        collection: &str,
        query: &ListQuery,
    ) -> StoreResult<Vec<StoredRecord>> {
        let collections = self.collections.lock().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&StoredRecord> = records
            .iter()
            .filter(|r| query.filter.as_ref().is_none_or(|f| f.matches(&r.fields)))
            .collect();

        if !query.sort.is_empty() {
            // stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| {
                query
                    .sort
                    .iter()
                    .map(|order| order.compare(&a.fields, &b.fields))
                    .find(|o| o.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Ok(matched
            .into_iter()
            .map(|r| project(r, query.fields.as_ref()))
            .collect())
    }

    async fn get_first(
        &self,
        _session: &Session,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<StoredRecord> {
        let collections = self.collections.lock().await;
        collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| filter.matches(&r.fields)))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::OrderBy;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();

        let id = store
            .create(&session, "performance", &fields(json!({"name": "Zhang", "weight": 1.5})))
            .await
            .unwrap();
        assert_eq!(id.len(), 15);

        store
            .update_by_id(&session, "performance", &id, &fields(json!({"weight": 2.5})))
            .await
            .unwrap();
        let records = store.records("performance").await;
        assert_eq!(records[0].fields["weight"], json!(2.5));
        assert_eq!(records[0].str_field("name"), Some("Zhang"));

        store.delete_by_id(&session, "performance", &id).await.unwrap();
        assert_eq!(store.len("performance").await, 0);

        assert_eq!(
            store.delete_by_id(&session, "performance", &id).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_list_filter_sort_project() {
        let store = InMemoryStore::new();
        let session = Session::anonymous();
        for (name, date) in [
            ("Zhang", "2024-12-01"),
            ("Li", "2024-12-02"),
            ("Zhang", "2024-12-03"),
        ] {
            store
                .insert_raw("performance", fields(json!({"name": name, "date": date})))
                .await;
        }

        let query = ListQuery::new()
            .filter(Filter::eq("name", "Zhang"))
            .sort(OrderBy::desc("date"))
            .fields(["date"]);
        let records = store.list_full(&session, "performance", &query).await.unwrap();

        let dates: Vec<_> = records.iter().filter_map(|r| r.str_field("date")).collect();
        assert_eq!(dates, vec!["2024-12-03", "2024-12-01"]);
        assert!(records.iter().all(|r| r.str_field("name").is_none()));
    }

    #[tokio::test]
    async fn test_get_first_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .get_first(&Session::anonymous(), "daily_performance", &Filter::eq("name", "Wang"))
            .await;
        assert_eq!(result, Err(StoreError::NotFound));
    }
}
