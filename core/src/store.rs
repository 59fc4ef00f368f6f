//! Document store abstraction.
//!
//! Every persisted entity is a JSON document addressed by `(collection, id)`.
//! Queries are restricted to top-level field equality, which both the
//! `PostgreSQL` implementation (`JSONB` containment) and the in-memory test
//! implementation can answer.
//!
//! # Conditional updates
//!
//! [`Collection::replace_if`] only writes when the stored document still
//! matches a guard [`Filter`]. Workflows use it to claim a state transition
//! before running side effects, so that two concurrent writers cannot both
//! observe `pending` and both act on it.
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` so that collections can be shared as
//! `Arc<dyn Collection<T>>` across request handlers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors raised by document stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("{collection} document {id} not found")]
    NotFound {
        /// Collection name.
        collection: &'static str,
        /// Document id.
        id: String,
    },

    /// A document with the same id already exists.
    #[error("{collection} document {id} already exists")]
    Conflict {
        /// Collection name.
        collection: &'static str,
        /// Document id.
        id: String,
    },

    /// Document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Database connection or query failure.
    #[error("Database error: {0}")]
    Backend(String),
}

/// Future returned by [`Collection`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A persisted JSON document.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    /// Primary key.
    fn id(&self) -> &str;
}

/// Generate a fresh document id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Top-level field equality constraints.
///
/// ```
/// use clientdesk_core::store::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new().eq("status", "pending").eq("paymentStatus", "pending");
/// assert!(filter.matches(&json!({"status": "pending", "paymentStatus": "pending", "id": "a"})));
/// assert!(!filter.matches(&json!({"status": "confirmed", "paymentStatus": "paid"})));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// An empty filter matching every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Whether no constraints are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check a serialized document against every constraint.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// The constraints as a JSON object, suitable for `JSONB @>` containment.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// A typed collection of documents.
pub trait Collection<T: Document>: Send + Sync {
    /// Load a document by id.
    ///
    /// # Errors
    ///
    /// - `Backend`/`Serialization` on storage failures
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<T>>;

    /// All documents matching the filter, in unspecified order.
    ///
    /// # Errors
    ///
    /// - `Backend`/`Serialization` on storage failures
    fn find<'a>(&'a self, filter: &'a Filter) -> StoreFuture<'a, Vec<T>>;

    /// Insert a new document.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the id already exists
    fn insert<'a>(&'a self, document: &'a T) -> StoreFuture<'a, ()>;

    /// Overwrite an existing document.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id does not exist
    fn replace<'a>(&'a self, document: &'a T) -> StoreFuture<'a, ()>;

    /// Overwrite only if the stored document matches `guard`.
    ///
    /// Returns `false` (and writes nothing) when the guard no longer holds or
    /// the document is gone.
    ///
    /// # Errors
    ///
    /// - `Backend`/`Serialization` on storage failures
    fn replace_if<'a>(&'a self, document: &'a T, guard: &'a Filter) -> StoreFuture<'a, bool>;

    /// Remove a document. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// - `Backend` on storage failures
    fn delete<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool>;
}
