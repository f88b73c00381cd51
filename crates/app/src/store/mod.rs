//! Remote document store seam.
//!
//! # Contract
//!
//! A store holds named collections of JSON-object documents keyed by a
//! store-assigned identifier. It offers four calls and nothing else:
//!
//! - `create` - add a document, returning its new identifier
//! - `list` - fetch every document in a collection
//! - `update` - merge the given fields into an existing document
//! - `delete` - remove a document
//!
//! There are no transactions, no filtered queries, and no subscriptions.
//! Callers observe their own writes only by listing again.
//!
//! # Adapters
//!
//! - [`InMemoryStore`] - process-local, with fault injection for tests
//! - [`FirestoreStore`] - Cloud Firestore REST v1

pub mod firestore;
pub mod memory;
mod value;

use std::future::Future;

use serde_json::{Map, Value};
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

/// Field map of a document.
pub type Fields = Map<String, Value>;

/// A document as returned by [`DocumentStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: String,
    /// Field values.
    pub fields: Fields,
}

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("{status} ({code}): {message}")]
    Service {
        /// HTTP status code.
        code: u16,
        /// Provider status name (e.g. `PERMISSION_DENIED`).
        status: String,
        /// Provider-supplied message.
        message: String,
    },

    /// The document does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document identifier.
        id: String,
    },

    /// A document could not be decoded into the expected shape.
    #[error("invalid document {collection}/{id}: {reason}")]
    Decode {
        /// Collection name.
        collection: String,
        /// Document identifier.
        id: String,
        /// What was wrong.
        reason: String,
    },

    /// JSON encoding or parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store is unreachable or refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A remote collection store.
///
/// Futures are `Send` so screens can run on a multi-threaded runtime.
pub trait DocumentStore: Send + Sync {
    /// Add a document and return the identifier the store assigned.
    fn create(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Fetch every document in a collection.
    fn list(&self, collection: &str)
    -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Merge `fields` into an existing document. Fields not named are kept.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a document.
    fn delete(&self, collection: &str, id: &str)
    -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Collection names used by the screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    /// Stock items.
    pub stock: String,
    /// Sale records.
    pub sales: String,
}

impl Collections {
    /// Default stock collection name.
    pub const DEFAULT_STOCK: &'static str = "estoque";
    /// Default sales collection name.
    pub const DEFAULT_SALES: &'static str = "vendas";
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            stock: Self::DEFAULT_STOCK.to_string(),
            sales: Self::DEFAULT_SALES.to_string(),
        }
    }
}

/// Serialize a value that must encode as a JSON object.
pub(crate) fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Json(<serde_json::Error as serde::ser::Error>::custom(
            format!("expected a JSON object, got {other}"),
        ))),
    }
}
