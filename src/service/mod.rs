//! CrudService: catalog-driven CRUD over any RecordStore.

mod crud;
mod validation;

pub use crud::CrudService;
pub use validation::RequestValidator;
