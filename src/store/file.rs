//! File-backed store: one JSON array document per collection, held in memory and
//! rewritten in full on every mutation.

use crate::error::AppError;
use crate::registry::Registry;
use crate::store::{record_id, RecordStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct JsonFileStore {
    dir: PathBuf,
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl JsonFileStore {
    /// Load every registered collection from `dir`. Missing files read as empty
    /// collections; the directory is created if absent.
    pub async fn open(dir: impl Into<PathBuf>, registry: &Registry) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let mut collections = HashMap::new();
        for resource in registry.resources() {
            let records = load_collection(&dir, resource.collection).await?;
            collections.insert(resource.collection.to_string(), records);
        }
        Ok(JsonFileStore {
            dir,
            collections: RwLock::new(collections),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Rewrite the whole collection file: temp file in the same directory,
    /// then rename over the old file.
    async fn flush(&self, collection: &str, records: &[Value]) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let path = self.collection_path(collection);
        let tmp = self.dir.join(format!("{}.json.tmp", collection));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(collection = %collection, records = records.len(), "flushed collection");
        Ok(())
    }
}

async fn load_collection(dir: &Path, collection: &str) -> Result<Vec<Value>, AppError> {
    let path = dir.join(format!("{}.json", collection));
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let records: Vec<Value> = serde_json::from_str(&raw)?;
    Ok(records)
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let collections = self.collections.read().await;
        let records = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(records.iter().find(|r| record_id(r) == Some(id)).cloned())
    }

    async fn search(
        &self,
        collection: &str,
        field: &str,
        term: &str,
    ) -> Result<Vec<Value>, AppError> {
        let needle = term.to_lowercase();
        let collections = self.collections.read().await;
        let records = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(records
            .iter()
            .filter(|r| {
                r.get(field)
                    .and_then(Value::as_str)
                    .map(|s| s.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, AppError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        records.push(record.clone());
        // Write guard held across the flush: mutations are totally ordered and a
        // reader never sees memory ahead of disk.
        self.flush(collection, records).await?;
        Ok(record)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        record: Value,
    ) -> Result<Option<Value>, AppError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        let Some(slot) = records.iter_mut().find(|r| record_id(r) == Some(id)) else {
            return Ok(None);
        };
        *slot = record.clone();
        self.flush(collection, records).await?;
        Ok(Some(record))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        let Some(pos) = records.iter().position(|r| record_id(r) == Some(id)) else {
            return Ok(None);
        };
        let removed = records.remove(pos);
        self.flush(collection, records).await?;
        Ok(Some(removed))
    }

    async fn ping(&self) -> Result<(), AppError> {
        tokio::fs::metadata(&self.dir).await?;
        Ok(())
    }
}
