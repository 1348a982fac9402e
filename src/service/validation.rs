//! Request validation from the resource catalog.

use crate::error::AppError;
use crate::registry::ResourceSpec;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// One pass over the catalog's declared fields: each must be present. Absent,
    /// null, and blank strings all fail with a field-specific message; `false`
    /// and `0` are present values.
    pub fn validate(body: &Map<String, Value>, resource: &ResourceSpec) -> Result<(), AppError> {
        for field in resource.fields {
            if !field_present(body.get(*field)) {
                return Err(AppError::Validation(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

fn field_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}
