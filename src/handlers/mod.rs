//! HTTP handlers for resource CRUD.

pub mod resource;

pub use resource::*;
