//! Shared application state for all routes.

use crate::registry::Registry;
use crate::store::RecordStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub registry: Arc<Registry>,
}
