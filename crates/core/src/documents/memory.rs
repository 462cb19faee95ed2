use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::errors::CoreError;

use super::traits::{ChangeKind, Collection, Document, DocumentChange, DocumentStore};

/// Buffered changes per collection before a slow subscriber starts lagging.
const CHANGE_CAPACITY: usize = 256;

/// In-process document store.
///
/// Backs tests and offline imports. Each collection has its own broadcast
/// channel; writes never wait on subscribers.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
    channels: HashMap<Collection, broadcast::Sender<DocumentChange>>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        let channels = Collection::ALL
            .into_iter()
            .map(|c| (c, broadcast::channel(CHANGE_CAPACITY).0))
            .collect();
        Self {
            collections: RwLock::default(),
            channels,
        }
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        collections.get(&collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn notify(&self, collection: Collection, id: &str, kind: ChangeKind) {
        if let Some(tx) = self.channels.get(&collection) {
            // No receivers is not an error.
            let _ = tx.send(DocumentChange {
                collection,
                id: id.to_string(),
                kind,
            });
        }
    }
}

impl std::fmt::Debug for MemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        let counts: BTreeMap<&str, usize> = collections
            .iter()
            .map(|(c, docs)| (c.name(), docs.len()))
            .collect();
        f.debug_struct("MemoryDocumentStore")
            .field("documents", &counts)
            .finish()
    }
}

fn owner_matches(fields: &Value, owner_field: Option<&str>, owner: &str) -> bool {
    let Some(field) = owner_field else {
        return false;
    };
    match fields.get(field) {
        Some(Value::String(s)) => s == owner,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == owner,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &str {
        "MemoryDocumentStore"
    }

    async fn list(&self, collection: Collection, owner: Option<&str>) -> Result<Vec<Document>, CoreError> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, fields)| match owner {
                Some(owner) => owner_matches(fields, collection.owner_field(), owner),
                None => true,
            })
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, CoreError> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn put(&self, collection: Collection, id: &str, fields: Value) -> Result<(), CoreError> {
        if id.trim().is_empty() {
            return Err(CoreError::ValidationError("Document id cannot be empty".into()));
        }
        if !fields.is_object() {
            return Err(CoreError::ValidationError(format!(
                "Document {collection}/{id} must be a JSON object"
            )));
        }

        {
            let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
            collections
                .entry(collection)
                .or_default()
                .insert(id.to_string(), fields);
        }
        self.notify(collection, id, ChangeKind::Put);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, CoreError> {
        let existed = {
            let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
            collections
                .get_mut(&collection)
                .is_some_and(|docs| docs.remove(id).is_some())
        };
        if existed {
            self.notify(collection, id, ChangeKind::Delete);
        }
        Ok(existed)
    }

    fn subscribe(&self, collection: Collection) -> broadcast::Receiver<DocumentChange> {
        match self.channels.get(&collection) {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}
