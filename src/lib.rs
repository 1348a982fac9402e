//! Campus API: school-administration REST backend library.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Settings, StorageBackend};
pub use error::{AppError, ConfigError};
pub use registry::{Operation, Registry, ResourceSpec};
pub use routes::{common_routes, resource_routes};
pub use service::{CrudService, RequestValidator};
pub use state::AppState;
pub use store::{
    ensure_collections, ensure_database_exists, JsonFileStore, PgDocStore, RecordStore,
};
