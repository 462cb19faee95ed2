use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::errors::CoreError;

/// Collections the dashboard keeps in the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Investors,
    Performance,
    Consultations,
    ChatMessages,
    NewsSources,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Investors,
        Collection::Performance,
        Collection::Consultations,
        Collection::ChatMessages,
        Collection::NewsSources,
    ];

    /// Name of the collection in the store.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Investors => "investors",
            Collection::Performance => "performance",
            Collection::Consultations => "consultations",
            Collection::ChatMessages => "chatMessages",
            Collection::NewsSources => "newsSources",
        }
    }

    /// Document field holding the owner key used by [`DocumentStore::list`].
    /// News sources are shared and have no owner.
    pub fn owner_field(&self) -> Option<&'static str> {
        match self {
            Collection::Investors => Some("username"),
            Collection::Performance | Collection::Consultations | Collection::ChatMessages => {
                Some("investorId")
            }
            Collection::NewsSources => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document: its id plus loosely typed JSON fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Put,
    Delete,
}

/// Notification delivered to subscribers of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub collection: Collection,
    pub id: String,
    pub kind: ChangeKind,
}

/// Abstraction over the managed document database.
///
/// The dashboard only ever needs these operations: list a collection
/// (optionally for one owner), point reads, upserts, deletes, and live
/// change notifications. Typed records are decoded from the returned JSON
/// at the boundary (see [`super::decode`]).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// All documents in `collection`, or only those whose owner field
    /// equals `owner`. Ordered by document id.
    async fn list(&self, collection: Collection, owner: Option<&str>) -> Result<Vec<Document>, CoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, CoreError>;

    /// Create or replace a document.
    async fn put(&self, collection: Collection, id: &str, fields: Value) -> Result<(), CoreError>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, CoreError>;

    /// Receive a [`DocumentChange`] for every subsequent write to `collection`.
    /// Slow receivers may lag and miss changes.
    fn subscribe(&self, collection: Collection) -> broadcast::Receiver<DocumentChange>;
}
