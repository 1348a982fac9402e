//! Generic CRUD execution against any RecordStore.

use crate::error::AppError;
use crate::registry::ResourceSpec;
use crate::store::RecordStore;
use serde_json::{Map, Value};

pub struct CrudService;

impl CrudService {
    pub async fn list(
        store: &dyn RecordStore,
        resource: &ResourceSpec,
    ) -> Result<Vec<Value>, AppError> {
        let records = store.list(resource.collection).await?;
        Ok(records.into_iter().map(|r| strip_sensitive(resource, r)).collect())
    }

    /// Fetch one record by id. Returns None for an unknown id.
    pub async fn get(
        store: &dyn RecordStore,
        resource: &ResourceSpec,
        id: &str,
    ) -> Result<Option<Value>, AppError> {
        let record = store.get(resource.collection, id).await?;
        Ok(record.map(|r| strip_sensitive(resource, r)))
    }

    pub async fn search(
        store: &dyn RecordStore,
        resource: &ResourceSpec,
        term: &str,
    ) -> Result<Vec<Value>, AppError> {
        let records = store
            .search(resource.collection, resource.search_field, term)
            .await?;
        Ok(records.into_iter().map(|r| strip_sensitive(resource, r)).collect())
    }

    /// Insert with a freshly generated id. The stored record carries only
    /// declared fields; a client-supplied id is ignored.
    pub async fn create(
        store: &dyn RecordStore,
        resource: &ResourceSpec,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let record = build_record(resource, body, &id);
        let stored = store.insert(resource.collection, record).await?;
        tracing::debug!(resource = %resource.path_segment, id = %id, "created record");
        Ok(strip_sensitive(resource, stored))
    }

    /// Whole-record replace; the path id survives no matter what the body claims.
    /// Returns None for an unknown id.
    pub async fn update(
        store: &dyn RecordStore,
        resource: &ResourceSpec,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let record = build_record(resource, body, id);
        let replaced = store.replace(resource.collection, id, record).await?;
        Ok(replaced.map(|r| strip_sensitive(resource, r)))
    }

    /// Delete by id, returning the removed record. None for an unknown id.
    pub async fn delete(
        store: &dyn RecordStore,
        resource: &ResourceSpec,
        id: &str,
    ) -> Result<Option<Value>, AppError> {
        let removed = store.remove(resource.collection, id).await?;
        Ok(removed.map(|r| strip_sensitive(resource, r)))
    }
}

/// Assemble the stored record: id plus the declared fields, in catalog order.
/// Undeclared body fields are dropped.
fn build_record(resource: &ResourceSpec, body: &Map<String, Value>, id: &str) -> Value {
    let mut record = Map::new();
    record.insert("id".into(), Value::String(id.to_string()));
    for field in resource.fields {
        if let Some(v) = body.get(*field) {
            record.insert((*field).to_string(), v.clone());
        }
    }
    Value::Object(record)
}

fn strip_sensitive(resource: &ResourceSpec, record: Value) -> Value {
    if resource.sensitive_fields.is_empty() {
        return record;
    }
    match record {
        Value::Object(mut map) => {
            for field in resource.sensitive_fields {
                map.remove(*field);
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::json;

    #[test]
    fn build_record_drops_undeclared_fields_and_body_id() {
        let registry = Registry::builtin();
        let events = registry.resource_by_path("events").unwrap();
        let body = json!({
            "id": "smuggled",
            "description": "Staff sync",
            "date": "2024-05-20T14:30:00Z",
            "comments": "Q2 goals",
            "location": "gym"
        });
        let record = build_record(events, body.as_object().unwrap(), "real-id");
        assert_eq!(record["id"], "real-id");
        assert_eq!(record["description"], "Staff sync");
        assert!(record.get("location").is_none());
    }

    #[test]
    fn strip_sensitive_removes_password_only_for_users() {
        let registry = Registry::builtin();
        let users = registry.resource_by_path("users").unwrap();
        let record = json!({"id": "u1", "name": "Ana", "password": "hunter2"});
        let stripped = strip_sensitive(users, record);
        assert!(stripped.get("password").is_none());
        assert_eq!(stripped["name"], "Ana");

        let teachers = registry.resource_by_path("teachers").unwrap();
        let record = json!({"id": "t1", "name": "Ana", "password": "odd-but-kept"});
        let untouched = strip_sensitive(teachers, record);
        assert_eq!(untouched["password"], "odd-but-kept");
    }
}
