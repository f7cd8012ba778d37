//! Store client capability interface and the in-process implementation.
//!
//! The document store itself is an external collaborator. This module defines
//! the narrow capability surface the access layer consumes — resolve a
//! location, read/write/delete a raw document, begin/commit/rollback a
//! transaction — as the [`StoreClient`] and [`AsyncStoreClient`] traits, so a
//! remote client can be swapped in without touching the mapping or scoping
//! code.
//!
//! [`MemoryStore`] is the bundled implementation: an `RwLock`-guarded map,
//! good enough for tests and the demo server. It implements both traits; the
//! async flavor delegates to the sync one since nothing here ever waits.

use crate::error::{StoreError, StoreResult};
use crate::path::DocumentHandle;
use crate::transaction::{Transaction, WriteIntent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// The raw field mapping of one document, as stored.
pub type RawDocument = serde_json::Map<String, serde_json::Value>;

/// A read-only point-in-time view of a document: its raw fields plus its own
/// location.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    location: DocumentHandle,
    fields: RawDocument,
}

impl Snapshot {
    pub fn new(location: DocumentHandle, fields: RawDocument) -> Self {
        Snapshot { location, fields }
    }

    /// The document's raw field mapping.
    pub fn raw_fields(&self) -> &RawDocument {
        &self.fields
    }

    /// Where this snapshot was read from.
    pub fn location(&self) -> &DocumentHandle {
        &self.location
    }

    pub fn into_parts(self) -> (DocumentHandle, RawDocument) {
        (self.location, self.fields)
    }
}

/// Blocking capability interface onto the document store.
///
/// Each call is assumed atomic; transactional grouping happens by buffering
/// writes on a [`Transaction`] and applying them in `commit_transaction`.
pub trait StoreClient: Send + Sync {
    /// Issue a new transaction handle.
    fn begin_transaction(&self) -> StoreResult<Transaction>;

    /// Read the document at `at`, if present.
    fn get_document(&self, at: &DocumentHandle) -> StoreResult<Option<Snapshot>>;

    /// Write `fields` at `at`, replacing any existing document.
    fn set_document(&self, at: &DocumentHandle, fields: RawDocument) -> StoreResult<()>;

    /// Delete the document at `at`. Deleting an absent document is not an
    /// error.
    fn delete_document(&self, at: &DocumentHandle) -> StoreResult<()>;

    /// Apply the transaction's buffered writes atomically.
    fn commit_transaction(&self, tx: &mut Transaction) -> StoreResult<()>;

    /// Discard the transaction's buffered writes.
    fn rollback_transaction(&self, tx: &mut Transaction) -> StoreResult<()>;
}

/// [`StoreClient`] over an asynchronous execution context, with identical
/// semantics.
#[async_trait]
pub trait AsyncStoreClient: Send + Sync {
    async fn begin_transaction(&self) -> StoreResult<Transaction>;
    async fn get_document(&self, at: &DocumentHandle) -> StoreResult<Option<Snapshot>>;
    async fn set_document(&self, at: &DocumentHandle, fields: RawDocument) -> StoreResult<()>;
    async fn delete_document(&self, at: &DocumentHandle) -> StoreResult<()>;
    async fn commit_transaction(&self, tx: &mut Transaction) -> StoreResult<()>;
    async fn rollback_transaction(&self, tx: &mut Transaction) -> StoreResult<()>;
}

/// An in-process document store backed by a `RwLock`-guarded map.
pub struct MemoryStore {
    documents: RwLock<HashMap<String, RawDocument>>,
    next_tx_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            documents: RwLock::new(HashMap::new()),
            next_tx_id: AtomicU64::new(1),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(&self, writes: Vec<WriteIntent>) -> StoreResult<()> {
        // A single write lock is held for the whole batch so a commit is
        // atomic with respect to readers.
        let mut guard = self
            .documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for write in writes {
            match write {
                WriteIntent::Set { at, fields } => {
                    guard.insert(at.path(), fields);
                }
                WriteIntent::Delete { at } => {
                    guard.remove(&at.path());
                }
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreClient for MemoryStore {
    fn begin_transaction(&self) -> StoreResult<Transaction> {
        let id = self.next_tx_id.fetch_add(1, Ordering::Relaxed);
        Ok(Transaction::new(id))
    }

    fn get_document(&self, at: &DocumentHandle) -> StoreResult<Option<Snapshot>> {
        let guard = self
            .documents
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard
            .get(&at.path())
            .map(|fields| Snapshot::new(at.clone(), fields.clone())))
    }

    fn set_document(&self, at: &DocumentHandle, fields: RawDocument) -> StoreResult<()> {
        self.documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(at.path(), fields);
        Ok(())
    }

    fn delete_document(&self, at: &DocumentHandle) -> StoreResult<()> {
        self.documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .remove(&at.path());
        Ok(())
    }

    fn commit_transaction(&self, tx: &mut Transaction) -> StoreResult<()> {
        self.apply(tx.take_writes())
    }

    fn rollback_transaction(&self, tx: &mut Transaction) -> StoreResult<()> {
        tx.take_writes();
        Ok(())
    }
}

// The in-memory store never suspends, so the async capability surface is a
// direct delegation to the blocking one.
#[async_trait]
impl AsyncStoreClient for MemoryStore {
    async fn begin_transaction(&self) -> StoreResult<Transaction> {
        StoreClient::begin_transaction(self)
    }

    async fn get_document(&self, at: &DocumentHandle) -> StoreResult<Option<Snapshot>> {
        StoreClient::get_document(self, at)
    }

    async fn set_document(&self, at: &DocumentHandle, fields: RawDocument) -> StoreResult<()> {
        StoreClient::set_document(self, at, fields)
    }

    async fn delete_document(&self, at: &DocumentHandle) -> StoreResult<()> {
        StoreClient::delete_document(self, at)
    }

    async fn commit_transaction(&self, tx: &mut Transaction) -> StoreResult<()> {
        StoreClient::commit_transaction(self, tx)
    }

    async fn rollback_transaction(&self, tx: &mut Transaction) -> StoreResult<()> {
        StoreClient::rollback_transaction(self, tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::resolve;
    use serde_json::json;

    fn doc(pairs: &[(&str, serde_json::Value)]) -> RawDocument {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn set_get_delete_round_trip() {
        let store = MemoryStore::new();
        let at = resolve("users/alice").unwrap();
        let fields = doc(&[("name", json!("Alice"))]);

        StoreClient::set_document(&store, &at, fields.clone()).unwrap();
        let snap = StoreClient::get_document(&store, &at).unwrap().unwrap();
        assert_eq!(snap.location(), &at);
        assert_eq!(snap.raw_fields(), &fields);

        StoreClient::delete_document(&store, &at).unwrap();
        assert!(StoreClient::get_document(&store, &at).unwrap().is_none());
    }

    #[test]
    fn delete_of_absent_document_is_not_an_error() {
        let store = MemoryStore::new();
        let at = resolve("users/ghost").unwrap();
        StoreClient::delete_document(&store, &at).unwrap();
    }

    #[test]
    fn transaction_ids_are_unique_per_client() {
        let store = MemoryStore::new();
        let a = StoreClient::begin_transaction(&store).unwrap();
        let b = StoreClient::begin_transaction(&store).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn commit_applies_writes_in_order() {
        let store = MemoryStore::new();
        let at = resolve("users/alice").unwrap();
        let mut tx = StoreClient::begin_transaction(&store).unwrap();
        tx.set(at.clone(), doc(&[("v", json!(1))]));
        tx.set(at.clone(), doc(&[("v", json!(2))]));
        StoreClient::commit_transaction(&store, &mut tx).unwrap();

        let snap = StoreClient::get_document(&store, &at).unwrap().unwrap();
        assert_eq!(snap.raw_fields()["v"], json!(2));
        assert!(tx.pending_writes().is_empty());
    }
}
