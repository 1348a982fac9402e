//! Server binary: reads settings from the environment, provisions the selected
//! storage backend, mounts common and resource routes, and serves.

use campus_api::{
    common_routes, ensure_collections, ensure_database_exists, resource_routes, AppState,
    JsonFileStore, PgDocStore, RecordStore, Registry, Settings, StorageBackend,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("campus_api=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let registry = Arc::new(Registry::builtin());

    let store: Arc<dyn RecordStore> = match &settings.backend {
        StorageBackend::File { data_dir } => {
            let store = JsonFileStore::open(data_dir.clone(), &registry).await?;
            tracing::info!(dir = %data_dir.display(), "file-backed storage");
            Arc::new(store)
        }
        StorageBackend::Postgres { database_url } => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            ensure_collections(&pool, &registry).await?;
            tracing::info!("postgres document storage");
            Arc::new(PgDocStore::new(pool))
        }
    };

    let state = AppState { store, registry };
    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(resource_routes(state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
