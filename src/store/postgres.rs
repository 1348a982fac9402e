//! PostgreSQL as a document store: one table per collection with a TEXT id and a
//! JSONB document, one statement per operation, no transactions.

use crate::error::AppError;
use crate::registry::Registry;
use crate::store::RecordStore;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

pub struct PgDocStore {
    pool: PgPool,
}

impl PgDocStore {
    pub fn new(pool: PgPool) -> Self {
        PgDocStore { pool }
    }
}

/// Quote identifier for PostgreSQL (safe: only catalog names reach this).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// JSON text extraction for the search field. Field names come from the static
/// catalog, never from the request.
fn doc_field(field: &str) -> String {
    format!("doc->>'{}'", field)
}

/// Escape LIKE wildcards so the term is matched literally inside %...%.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Create one document table per registered collection if absent.
pub async fn ensure_collections(pool: &PgPool, registry: &Registry) -> Result<(), AppError> {
    for resource in registry.resources() {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                doc JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            quoted(resource.collection)
        );
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

#[async_trait]
impl RecordStore for PgDocStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, AppError> {
        let sql = format!("SELECT doc FROM {}", quoted(collection));
        tracing::debug!(sql = %sql, "query");
        let docs = sqlx::query_scalar::<_, Value>(&sql).fetch_all(&self.pool).await?;
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", quoted(collection));
        tracing::debug!(sql = %sql, id = %id, "query");
        let doc = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn search(
        &self,
        collection: &str,
        field: &str,
        term: &str,
    ) -> Result<Vec<Value>, AppError> {
        let sql = format!(
            "SELECT doc FROM {} WHERE {} ILIKE $1",
            quoted(collection),
            doc_field(field)
        );
        tracing::debug!(sql = %sql, term = %term, "query");
        let docs = sqlx::query_scalar::<_, Value>(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, AppError> {
        let id = crate::store::record_id(&record)
            .ok_or_else(|| AppError::BadRequest("record has no id".into()))?
            .to_string();
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", quoted(collection));
        tracing::debug!(sql = %sql, id = %id, "query");
        sqlx::query(&sql)
            .bind(&id)
            .bind(&record)
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        record: Value,
    ) -> Result<Option<Value>, AppError> {
        let sql = format!(
            "UPDATE {} SET doc = $2, updated_at = NOW() WHERE id = $1 RETURNING doc",
            quoted(collection)
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let doc = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .bind(&record)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING doc",
            quoted(collection)
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let doc = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn quoted_doubles_embedded_quotes() {
        assert_eq!(quoted("events"), "\"events\"");
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn parse_db_name_strips_query() {
        let (admin, name) =
            parse_db_name_from_url("postgres://localhost:5432/campus?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost:5432/postgres");
        assert_eq!(name, "campus");
    }
}
