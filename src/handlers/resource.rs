//! Resource CRUD handlers: list, get, search, create, update, delete.
//! One generic set for every resource; each handler resolves the catalog entry
//! from the path segment, so a handler cannot touch the wrong collection.

use crate::error::AppError;
use crate::registry::{Operation, ResourceSpec};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

fn resolve<'a>(state: &'a AppState, segment: &str, op: Operation) -> Result<&'a ResourceSpec, AppError> {
    let resource = state
        .registry
        .resource_by_path(segment)
        .ok_or_else(|| AppError::NotFound(segment.to_string()))?;
    if !resource.allows(op) {
        return Err(AppError::BadRequest(format!(
            "{} not allowed for {}",
            op.name(),
            resource.path_segment
        )));
    }
    Ok(resource)
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let resource = resolve(&state, &segment, Operation::List)?;
    let records = CrudService::list(state.store.as_ref(), resource).await?;
    Ok(Json(records))
}

pub async fn read(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let resource = resolve(&state, &segment, Operation::Get)?;
    let record = CrudService::get(state.store.as_ref(), resource, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(id))?;
    Ok(Json(record))
}

pub async fn search(
    State(state): State<AppState>,
    Path((segment, term)): Path<(String, String)>,
) -> Result<Json<Vec<Value>>, AppError> {
    let resource = resolve(&state, &segment, Operation::Search)?;
    let records = CrudService::search(state.store.as_ref(), resource, &term).await?;
    Ok(Json(records))
}

pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let resource = resolve(&state, &segment, Operation::Create)?;
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, resource)?;
    let record = CrudService::create(state.store.as_ref(), resource, &body).await?;
    Ok(Json(record))
}

pub async fn update(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let resource = resolve(&state, &segment, Operation::Update)?;
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, resource)?;
    let record = CrudService::update(state.store.as_ref(), resource, &id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(id))?;
    Ok(Json(record))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let resource = resolve(&state, &segment, Operation::Delete)?;
    let record = CrudService::delete(state.store.as_ref(), resource, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(id))?;
    Ok(Json(record))
}
