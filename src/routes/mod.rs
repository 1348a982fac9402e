//! Route construction: common service routes and resource CRUD routes.

mod common;
mod resource;

pub use common::common_routes;
pub use resource::resource_routes;
