//! The in-memory product collection and its mutation path
//!
//! `Catalog` owns the collection loaded at startup. Every mutation takes the
//! collection lock, changes the in-memory copy, then rewrites the backing file
//! while still holding the lock, so id assignment and saves never interleave.
//! The file write itself runs on tokio's blocking pool.
//! A failed save leaves the in-memory change in place; the file keeps the
//! content of the last successful save until the next one succeeds.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult, StoreError};
use crate::record::Record;
use crate::store::{RecordStore, next_id};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Vec<Record>;
    async fn create(&self, candidate: Record) -> CatalogResult<Record>;
    async fn update(&self, id: &str, replacement: Record) -> CatalogResult<Record>;
    async fn delete(&self, id: &str) -> CatalogResult<Record>;
}

pub struct Catalog {
    records: Mutex<Vec<Record>>,
    store: Arc<dyn RecordStore>,
}

impl Catalog {
    /// Loads the collection from `store`.
    pub fn open(store: Arc<dyn RecordStore>) -> CatalogResult<Self> {
        let records = store.load()?;
        info!(records = records.len(), "catalog opened");
        Ok(Self {
            records: Mutex::new(records),
            store,
        })
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Writes a snapshot of `records` off the async worker threads.
    async fn persist(&self, records: &[Record]) -> CatalogResult<()> {
        let store = Arc::clone(&self.store);
        let snapshot = records.to_vec();
        let saved = tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .unwrap_or_else(|err| Err(StoreError::Interrupted(err)));

        saved.map_err(|err| {
            warn!(error = %err, "catalog diverged from data file");
            CatalogError::Store(err)
        })
    }
}

#[async_trait]
impl ProductRepository for Catalog {
    async fn list(&self) -> Vec<Record> {
        self.records.lock().await.clone()
    }

    async fn create(&self, candidate: Record) -> CatalogResult<Record> {
        if let Some(field) = candidate.missing_required_field() {
            return Err(CatalogError::MissingField(field));
        }

        let mut records = self.records.lock().await;
        let id = next_id(&records).ok_or(CatalogError::IdsExhausted)?;
        let product = candidate.with_id(id);
        records.push(product.clone());
        debug!(id = ?product.get("id"), "product created");

        self.persist(&records).await?;
        Ok(product)
    }

    async fn update(&self, id: &str, replacement: Record) -> CatalogResult<Record> {
        if let Some(field) = replacement.missing_required_field() {
            return Err(CatalogError::MissingField(field));
        }

        let mut records = self.records.lock().await;
        let slot = records
            .iter_mut()
            .find(|record| record.has_id(id))
            .ok_or(CatalogError::NotFound)?;
        let product = replacement.with_id(id);
        *slot = product.clone();
        debug!(id, "product updated");

        self.persist(&records).await?;
        Ok(product)
    }

    async fn delete(&self, id: &str) -> CatalogResult<Record> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|record| record.has_id(id))
            .ok_or(CatalogError::NotFound)?;
        let removed = records.remove(index);
        debug!(id, "product deleted");

        self.persist(&records).await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::store::JsonFileStore;
    use serde_json::{Value, json};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex as StdMutex;
    use std::thread::{self, ThreadId};
    use tempfile::TempDir;

    /// In-memory store that remembers which thread each save ran on.
    #[derive(Default)]
    struct ThreadRecordingStore {
        seed: Vec<Record>,
        save_threads: StdMutex<Vec<ThreadId>>,
    }

    impl RecordStore for ThreadRecordingStore {
        fn load(&self) -> StoreResult<Vec<Record>> {
            Ok(self.seed.clone())
        }

        fn save(&self, _records: &[Record]) -> StoreResult<()> {
            self.save_threads.lock().unwrap().push(thread::current().id());
            Ok(())
        }
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn seeded(temp: &TempDir) -> (PathBuf, Catalog) {
        let path = temp.path().join("products.json");
        fs::write(
            &path,
            r#"{"products": [
                {"id": "1", "name": "Pen", "price": 1.5, "currency": "USD"},
                {"id": "4", "name": "Ink", "price": 3, "currency": "USD"}
            ]}"#,
        )
        .unwrap();
        let catalog = Catalog::open(Arc::new(JsonFileStore::new(&path))).unwrap();
        (path, catalog)
    }

    /// Swaps the data file for a directory so the next save fails.
    fn break_data_file(path: &Path) {
        fs::remove_file(path).unwrap();
        fs::create_dir(path).unwrap();
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp.path().join("absent.json"));

        let result = Catalog::open(Arc::new(store));
        assert!(matches!(result, Err(CatalogError::Store(_))));
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_persists() {
        let temp = TempDir::new().unwrap();
        let (path, catalog) = seeded(&temp);

        let created = catalog
            .create(record(json!({"name": "Widget", "price": 9.99, "currency": "USD"})))
            .await
            .unwrap();

        assert_eq!(created.get("id"), Some(&json!("5")));
        assert_eq!(catalog.len().await, 3);

        let reloaded = JsonFileStore::new(&path).load().unwrap();
        assert!(reloaded[2].has_id("5"));
    }

    #[tokio::test]
    async fn test_create_missing_field_leaves_collection_unchanged() {
        let temp = TempDir::new().unwrap();
        let (path, catalog) = seeded(&temp);
        let before = fs::read(&path).unwrap();

        let result = catalog
            .create(record(json!({"name": "Widget", "price": 9.99})))
            .await;

        assert!(matches!(result, Err(CatalogError::MissingField("currency"))));
        assert_eq!(catalog.len().await, 2);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_create_keeps_in_memory_record_when_save_fails() {
        let temp = TempDir::new().unwrap();
        let (path, catalog) = seeded(&temp);
        break_data_file(&path);

        let result = catalog
            .create(record(json!({"name": "Widget", "price": 9.99, "currency": "USD"})))
            .await;

        assert!(matches!(result, Err(CatalogError::Store(_))));
        assert_eq!(catalog.len().await, 3);
    }

    #[tokio::test]
    async fn test_create_fails_when_ids_exhausted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        fs::write(
            &path,
            r#"{"products": [{"id": "9223372036854775807", "name": "Last", "price": 1, "currency": "USD"}]}"#,
        )
        .unwrap();
        let catalog = Catalog::open(Arc::new(JsonFileStore::new(&path))).unwrap();
        let before = fs::read(&path).unwrap();

        let result = catalog
            .create(record(json!({"name": "Widget", "price": 9.99, "currency": "USD"})))
            .await;

        assert!(matches!(result, Err(CatalogError::IdsExhausted)));
        assert_eq!(catalog.len().await, 1);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_saves_run_off_the_runtime_thread() {
        let store = Arc::new(ThreadRecordingStore::default());
        let catalog = Catalog::open(store.clone()).unwrap();

        catalog
            .create(record(json!({"name": "Widget", "price": 9.99, "currency": "USD"})))
            .await
            .unwrap();
        catalog.delete("1").await.unwrap();

        let runtime_thread = thread::current().id();
        let save_threads = store.save_threads.lock().unwrap();
        assert_eq!(save_threads.len(), 2);
        assert!(save_threads.iter().all(|id| *id != runtime_thread));
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let temp = TempDir::new().unwrap();
        let (_path, catalog) = seeded(&temp);

        catalog
            .update(
                "1",
                record(json!({"name": "Fountain Pen", "price": 12, "currency": "EUR"})),
            )
            .await
            .unwrap();

        let records = catalog.list().await;
        assert!(records[0].has_id("1"));
        assert_eq!(records[0].get("name"), Some(&json!("Fountain Pen")));
        assert_eq!(records[0].get("description"), None);
        assert!(records[1].has_id("4"));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let (path, catalog) = seeded(&temp);
        let before = fs::read(&path).unwrap();

        let result = catalog
            .update("9", record(json!({"name": "X", "price": 1, "currency": "USD"})))
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound)));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_missing_field_stops_before_mutation() {
        let temp = TempDir::new().unwrap();
        let (_path, catalog) = seeded(&temp);

        let result = catalog.update("1", record(json!({"name": "X"}))).await;

        assert!(matches!(result, Err(CatalogError::MissingField("price"))));
        assert_eq!(catalog.list().await[0].get("name"), Some(&json!("Pen")));
    }

    #[tokio::test]
    async fn test_delete_removes_and_persists() {
        let temp = TempDir::new().unwrap();
        let (path, catalog) = seeded(&temp);

        let removed = catalog.delete("1").await.unwrap();

        assert!(removed.has_id("1"));
        let reloaded = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded[0].has_id("4"));
    }

    #[tokio::test]
    async fn test_delete_keeps_removal_when_save_fails() {
        let temp = TempDir::new().unwrap();
        let (path, catalog) = seeded(&temp);
        break_data_file(&path);

        let result = catalog.delete("4").await;

        assert!(matches!(result, Err(CatalogError::Store(_))));
        assert_eq!(catalog.len().await, 1);
    }
}
