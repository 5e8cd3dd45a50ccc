// crates/blockdrag-core/src/runtime/memory_store.rs
// ============================================================================
// Module: In-Memory Document Store
// Description: Process-local DocumentStore for tests and dry runs.
// Purpose: Assign ids, keep documents, and record deletions in order.
// Dependencies: crate::{core, interfaces}, async-trait, serde_json
// ============================================================================

//! ## Overview
//! Identifiers are sequential integers shared across collections. Block rows
//! inside created documents receive string ids the way the CMS assigns them.
//! Failures can be injected per collection to exercise teardown paths.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::Collection;
use crate::core::DocId;
use crate::interfaces::DocumentStore;
use crate::interfaces::StoreError;

/// Mutable store state.
#[derive(Debug, Default)]
struct MemoryState {
    /// Next identifier to assign.
    next_id: u64,
    /// Stored documents keyed by collection and id.
    documents: BTreeMap<(Collection, DocId), Value>,
    /// Deletions in the order they happened.
    deletions: Vec<(Collection, DocId)>,
    /// Collections whose creates fail.
    failing_creates: BTreeSet<Collection>,
    /// Collections whose deletes fail.
    failing_deletes: BTreeSet<Collection>,
    /// Collections whose creates succeed but reply with a malformed record.
    garbled_replies: BTreeSet<Collection>,
}

/// Document store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    /// Shared state.
    state: Mutex<MemoryState>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later create in `collection` fail.
    pub fn fail_creates(&self, collection: Collection) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_creates.insert(collection);
        }
    }

    /// Makes every later delete in `collection` fail.
    pub fn fail_deletes(&self, collection: Collection) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_deletes.insert(collection);
        }
    }

    /// Makes every later create in `collection` store the document but reply
    /// with a record whose fields have the wrong types.
    pub fn garble_replies(&self, collection: Collection) {
        if let Ok(mut state) = self.state.lock() {
            state.garbled_replies.insert(collection);
        }
    }

    /// Returns the stored document, if present.
    #[must_use]
    pub fn get(&self, collection: Collection, id: &DocId) -> Option<Value> {
        self.state.lock().ok()?.documents.get(&(collection, id.clone())).cloned()
    }

    /// Returns the number of documents stored in `collection`.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        self.state.lock().map_or(0, |state| {
            state.documents.keys().filter(|(stored, _)| *stored == collection).count()
        })
    }

    /// Returns every deletion in order.
    #[must_use]
    pub fn deletions(&self) -> Vec<(Collection, DocId)> {
        self.state.lock().map(|state| state.deletions.clone()).unwrap_or_default()
    }

    /// Locks the state.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Transport("memory store poisoned".to_string()))
    }
}

/// Removes one document or reports it missing.
fn remove(state: &mut MemoryState, collection: Collection, id: &DocId) -> Result<(), StoreError> {
    if state.failing_deletes.contains(&collection) {
        return Err(StoreError::Rejected {
            operation: format!("delete {collection}"),
            status: 500,
            message: "injected failure".to_string(),
        });
    }
    if state.documents.remove(&(collection, id.clone())).is_none() {
        return Err(StoreError::NotFound {
            collection,
            id: id.clone(),
        });
    }
    state.deletions.push((collection, id.clone()));
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, collection: Collection, data: Value) -> Result<Value, StoreError> {
        let mut state = self.lock()?;
        if state.failing_creates.contains(&collection) {
            return Err(StoreError::Rejected {
                operation: format!("create {collection}"),
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        let Value::Object(mut object) = data else {
            return Err(StoreError::Rejected {
                operation: format!("create {collection}"),
                status: 400,
                message: "document body must be an object".to_string(),
            });
        };
        state.next_id += 1;
        let id = state.next_id;
        object.insert("id".to_string(), Value::from(id));
        if let Some(Value::Array(blocks)) = object.get_mut("blocks") {
            for (index, block) in blocks.iter_mut().enumerate() {
                if let Value::Object(block) = block {
                    block
                        .entry("id")
                        .or_insert_with(|| Value::String(format!("{id}-block-{index}")));
                }
            }
        }
        object.remove("password");
        let stored = Value::Object(object);
        state.documents.insert((collection, DocId::Number(id)), stored.clone());
        if state.garbled_replies.contains(&collection) {
            return Ok(serde_json::json!({
                "id": id,
                "name": 0,
                "email": 0,
                "blocks": "garbled",
            }));
        }
        Ok(stored)
    }

    async fn delete(&self, collection: Collection, id: &DocId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        remove(&mut state, collection, id)
    }

    async fn delete_where_id_in(
        &self,
        collection: Collection,
        ids: &[DocId],
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let mut first_error = None;
        for id in ids {
            if let Err(err) = remove(&mut state, collection, id) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test-only assertions favor direct unwrap for clarity.")]
mod tests {
    use serde_json::json;

    use super::InMemoryDocumentStore;
    use crate::core::Collection;
    use crate::core::DocId;
    use crate::interfaces::DocumentStore;
    use crate::interfaces::StoreError;

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_block_ids() {
        let store = InMemoryDocumentStore::new();
        let seed = store.create(Collection::Seeds, json!({ "name": "s" })).await.unwrap();
        let fruit = store
            .create(Collection::Fruits, json!({ "blocks": [{ "blockType": "pears" }] }))
            .await
            .unwrap();
        assert_eq!(seed["id"], json!(1));
        assert_eq!(fruit["id"], json!(2));
        assert_eq!(fruit["blocks"][0]["id"], json!("2-block-0"));
    }

    #[tokio::test]
    async fn bulk_delete_reports_missing_but_removes_the_rest() {
        let store = InMemoryDocumentStore::new();
        store.create(Collection::Seeds, json!({})).await.unwrap();
        let err = store
            .delete_where_id_in(Collection::Seeds, &[DocId::Number(9), DocId::Number(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.count(Collection::Seeds), 0);
        assert_eq!(store.deletions(), vec![(Collection::Seeds, DocId::Number(1))]);
    }
}
