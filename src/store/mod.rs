//! Pluggable record storage: file-backed JSON collections or PostgreSQL documents.

mod file;
mod postgres;

pub use file::JsonFileStore;
pub use postgres::{ensure_collections, ensure_database_exists, PgDocStore};

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// One collection of JSON records per resource. Records are flat objects carrying
/// an "id" string; the store never generates or rewrites ids.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    /// Case-insensitive substring match on a string field. Records where the field
    /// is missing or not a string never match.
    async fn search(&self, collection: &str, field: &str, term: &str)
        -> Result<Vec<Value>, AppError>;

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, AppError>;

    /// Whole-record replace by id. None for an unknown id; the collection is unchanged.
    async fn replace(
        &self,
        collection: &str,
        id: &str,
        record: Value,
    ) -> Result<Option<Value>, AppError>;

    /// Remove by id, returning the removed record. None for an unknown id.
    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    /// Readiness probe for GET /ready.
    async fn ping(&self) -> Result<(), AppError>;
}

pub(crate) fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
