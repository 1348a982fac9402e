//! Resource CRUD routes built from the catalog.
//! Uses parameterized paths so Path extractors receive the segment and id;
//! handlers resolve the resource by path segment.

use crate::handlers::resource::{create, delete as delete_handler, list, read, search, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route("/:resource/search/:term", get(search))
        .route(
            "/:resource/:id",
            get(read).put(update).delete(delete_handler),
        )
        .with_state(state)
}
