// Document store access layer

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A schemaless record. Every stored document carries its identifier under `_id`.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

/// Collections served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Trainers,
    TrainerRequests,
    Gallery,
    Classes,
    Forums,
    Bookings,
    Newsletters,
    Payments,
    Testimonials,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Trainers => "trainers",
            Collection::TrainerRequests => "trainer_requests",
            Collection::Gallery => "gallery",
            Collection::Classes => "classes",
            Collection::Forums => "forums",
            Collection::Bookings => "bookings",
            Collection::Newsletters => "newsletters",
            Collection::Payments => "payments",
            Collection::Testimonials => "testimonials",
        }
    }

    /// Field whose string values must be unique within the collection
    pub fn unique_field(&self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("email"),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact field-equality filter. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn by_id(id: &str) -> Self {
        Self::eq(ID_FIELD, id)
    }

    pub fn and(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Skip/limit window applied after filtering, in insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Page {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("Duplicate document id: {0}")]
    DuplicateId(String),
    #[error("Duplicate value for unique field {0}")]
    UniqueViolation(&'static str),
}

/// Single-operation access to named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Stores the document, assigning a fresh `_id` when it has none.
    /// Fails with `UniqueViolation` when the collection's unique field is taken.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertResult, StoreError>;

    /// Shallow-merges `patch` into the first matching document. `_id` is never patched.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError>;

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    /// Sum of the numeric values of `field` over matching documents; non-numeric values are skipped.
    async fn sum(
        &self,
        collection: Collection,
        filter: &Filter,
        field: &str,
    ) -> Result<f64, StoreError>;
}

/// Returns the document's `_id`, generating one if absent.
pub(crate) fn ensure_id(document: &mut Document) -> Result<String, StoreError> {
    match document.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(other) => Err(StoreError::InvalidDocument(format!(
            "{} must be a string, got {}",
            ID_FIELD, other
        ))),
        None => {
            let id = uuid::Uuid::new_v4().simple().to_string();
            document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            Ok(id)
        }
    }
}

/// Applies `patch` onto `document`, returning whether anything changed.
pub(crate) fn merge_patch(document: &mut Document, mut patch: Document) -> bool {
    patch.remove(ID_FIELD);

    let mut modified = false;
    for (field, value) in patch {
        if document.get(&field) != Some(&value) {
            document.insert(field, value);
            modified = true;
        }
    }
    modified
}

pub fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        into_document(value).unwrap()
    }

    #[test]
    fn test_filter_matching() {
        let user = doc(json!({ "_id": "1", "email": "a@x.com", "role": "admin" }));

        assert!(Filter::all().matches(&user));
        assert!(Filter::eq("email", "a@x.com").matches(&user));
        assert!(Filter::eq("email", "a@x.com").and("role", "admin").matches(&user));
        assert!(!Filter::eq("email", "a@x.com").and("role", "trainer").matches(&user));
        assert!(!Filter::eq("missing", Value::Null).matches(&user));
        assert!(Filter::by_id("1").matches(&user));
    }

    #[test]
    fn test_merge_patch_ignores_id_and_reports_changes() {
        let mut user = doc(json!({ "_id": "1", "email": "a@x.com" }));

        let changed = merge_patch(&mut user, doc(json!({ "_id": "2", "role": "trainer" })));
        assert!(changed);
        assert_eq!(user["_id"], "1");
        assert_eq!(user["role"], "trainer");

        let unchanged = merge_patch(&mut user, doc(json!({ "role": "trainer" })));
        assert!(!unchanged);
    }

    #[test]
    fn test_ensure_id() {
        let mut with_id = doc(json!({ "_id": "abc" }));
        assert_eq!(ensure_id(&mut with_id).unwrap(), "abc");

        let mut without_id = doc(json!({ "name": "yoga" }));
        let generated = ensure_id(&mut without_id).unwrap();
        assert_eq!(generated.len(), 32);
        assert_eq!(without_id[ID_FIELD], generated.as_str());

        let mut numeric_id = doc(json!({ "_id": 7 }));
        assert!(ensure_id(&mut numeric_id).is_err());
    }

    #[test]
    fn test_only_users_have_a_unique_field() {
        assert_eq!(Collection::Users.unique_field(), Some("email"));
        assert_eq!(Collection::Newsletters.unique_field(), None);
        assert_eq!(Collection::Trainers.unique_field(), None);
    }

    #[test]
    fn test_into_document_rejects_non_objects() {
        assert!(into_document(json!([1, 2])).is_err());
        assert!(into_document(json!("text")).is_err());
    }
}
