//! Static resource catalog: one declarative table drives routing, validation, and storage
//! for every resource instead of a copy of the handler code per resource.

use std::collections::HashMap;

/// Operations a resource exposes over HTTP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Search,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Search => "search",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

const ALL_OPERATIONS: &[Operation] = &[
    Operation::List,
    Operation::Get,
    Operation::Search,
    Operation::Create,
    Operation::Update,
    Operation::Delete,
];

/// One resource as exposed by the API and stored in a backend collection.
#[derive(Clone, Debug)]
pub struct ResourceSpec {
    /// URL path segment (e.g. "teachers") and the backend collection name.
    pub path_segment: &'static str,
    pub collection: &'static str,
    /// Declared fields. Every one is required and non-blank on create and full update;
    /// anything else in the body is dropped.
    pub fields: &'static [&'static str],
    /// Field matched by GET /:resource/search/:term (case-insensitive substring).
    pub search_field: &'static str,
    /// Fields stored but never returned in API responses.
    pub sensitive_fields: &'static [&'static str],
    pub operations: &'static [Operation],
}

impl ResourceSpec {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn is_sensitive(&self, field: &str) -> bool {
        self.sensitive_fields.contains(&field)
    }
}

const RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        path_segment: "teachers",
        collection: "teachers",
        fields: &["name", "subjects", "email", "phone", "active"],
        search_field: "name",
        sensitive_fields: &[],
        operations: ALL_OPERATIONS,
    },
    ResourceSpec {
        path_segment: "students",
        collection: "students",
        fields: &["name", "age", "phone", "active"],
        search_field: "name",
        sensitive_fields: &[],
        operations: ALL_OPERATIONS,
    },
    ResourceSpec {
        path_segment: "professionals",
        collection: "professionals",
        fields: &["name", "specialty", "email", "phone", "active"],
        search_field: "name",
        sensitive_fields: &[],
        operations: ALL_OPERATIONS,
    },
    ResourceSpec {
        path_segment: "events",
        collection: "events",
        fields: &["description", "date", "comments"],
        search_field: "description",
        sensitive_fields: &[],
        operations: ALL_OPERATIONS,
    },
    // Appointments reference students and professionals by free-text name; no
    // foreign keys, so a rename silently orphans the appointment.
    ResourceSpec {
        path_segment: "appointments",
        collection: "appointments",
        fields: &["specialty", "comments", "date", "student", "professional"],
        search_field: "student",
        sensitive_fields: &[],
        operations: ALL_OPERATIONS,
    },
    ResourceSpec {
        path_segment: "users",
        collection: "users",
        fields: &["name", "email", "username", "level", "password", "active"],
        search_field: "name",
        sensitive_fields: &["password"],
        operations: ALL_OPERATIONS,
    },
];

/// Resolved catalog with path-segment lookup.
#[derive(Clone, Debug)]
pub struct Registry {
    resources: Vec<ResourceSpec>,
    by_path: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn builtin() -> Self {
        let resources: Vec<ResourceSpec> = RESOURCES.to_vec();
        let by_path = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.path_segment, i))
            .collect();
        Registry { resources, by_path }
    }

    pub fn resources(&self) -> &[ResourceSpec] {
        &self.resources
    }

    pub fn resource_by_path(&self, path: &str) -> Option<&ResourceSpec> {
        self.by_path.get(path).map(|&i| &self.resources[i])
    }
}
