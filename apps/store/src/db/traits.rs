//! Core traits for document storage backends

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::filter::Filter;
use crate::Result;

/// A resource's serialized form together with its storage key
///
/// `storage_id` is the backend's primary key (`_id` in document-store terms).
/// It is assigned on insert and never rewritten. The domain `id` lives inside
/// `document` and is what callers look resources up by.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub storage_id: String,
    pub document: JsonValue,
}

impl StoredDocument {
    pub fn new(storage_id: impl Into<String>, document: JsonValue) -> Self {
        Self {
            storage_id: storage_id.into(),
            document,
        }
    }

    /// The domain `id` element of the document
    pub fn resource_id(&self) -> Option<&str> {
        self.document.get("id").and_then(|v| v.as_str())
    }
}

/// Result of an insert
#[derive(Debug, Clone)]
pub struct InsertResult {
    pub inserted: Vec<StoredDocument>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceOptions {
    /// Insert the document when nothing matches
    pub upsert: bool,
}

/// Result of `find_one_and_replace`
#[derive(Debug, Clone)]
pub struct ReplaceResult {
    /// The document after the write; `None` if nothing matched and no upsert happened
    pub value: Option<StoredDocument>,
    /// True if the write inserted a new document
    pub upserted: bool,
}

/// Driver-level handle on one named collection
///
/// Every method is a single storage call. Implementations own their
/// concurrency control; callers add none.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Number of documents in the collection
    async fn count(&self) -> Result<u64>;

    /// First matching document in storage-key order
    async fn find_one(&self, filter: &Filter) -> Result<Option<StoredDocument>>;

    /// All matching documents in storage-key order
    async fn find(&self, filter: &Filter) -> Result<Vec<StoredDocument>>;

    /// Insert a new document
    ///
    /// # Errors
    /// * `DuplicateKey` - storage key or domain `id` already present
    async fn insert(&self, document: StoredDocument) -> Result<InsertResult>;

    /// Replace the first matching document's content
    ///
    /// The matched document keeps its storage key; `document.storage_id` is
    /// only used when the call inserts (`upsert`).
    async fn find_one_and_replace(
        &self,
        filter: &Filter,
        document: StoredDocument,
        options: ReplaceOptions,
    ) -> Result<ReplaceResult>;

    /// Delete every matching document, returning how many were removed
    async fn remove(&self, filter: &Filter) -> Result<u64>;
}

/// A live database handle that hands out collections
///
/// Handles are cheap to clone and shared by all repositories. The composing
/// application creates one at startup and closes it at shutdown.
pub trait DocumentDatabase: Send + Sync + Clone + 'static {
    type Collection: Collection;

    fn collection(&self, name: &str) -> Self::Collection;
}
