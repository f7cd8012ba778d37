//! Transaction handles and scope-exit bracketing.
//!
//! A [`Transaction`] is a store-issued token that buffers write intents until
//! the caller decides its fate. [`with_transaction`] and
//! [`with_async_transaction`] bracket a body with a guaranteed completion
//! step: however control leaves the body — normal return, error, panic, or a
//! cancelled future — a single `transaction complete` debug event fires before
//! the caller regains control, and any error propagates unchanged.
//!
//! Neither scope commits or rolls back. The body (or, for an abandoned
//! transaction, the store's own semantics) decides by calling
//! [`StoreClient::commit_transaction`](crate::StoreClient::commit_transaction)
//! or [`rollback_transaction`](crate::StoreClient::rollback_transaction)
//! explicitly.

use crate::client::RawDocument;
use crate::error::StoreResult;
use crate::path::DocumentHandle;
use futures::future::BoxFuture;

/// A buffered write carried by an in-flight transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteIntent {
    Set {
        at: DocumentHandle,
        fields: RawDocument,
    },
    Delete {
        at: DocumentHandle,
    },
}

/// An in-flight transaction: a store-issued token plus its buffered writes.
///
/// Exclusively owned by the scope that created it; never shared. Writes are
/// buffered here and only reach the store when the client's
/// `commit_transaction` applies them.
#[derive(Debug)]
pub struct Transaction {
    id: u64,
    writes: Vec<WriteIntent>,
}

impl Transaction {
    /// Construct a handle with a store-issued id. Called by client
    /// implementations from `begin_transaction`.
    pub fn new(id: u64) -> Self {
        Transaction {
            id,
            writes: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Buffer a set of `fields` at `at`, replacing the whole document on
    /// commit.
    pub fn set(&mut self, at: DocumentHandle, fields: RawDocument) {
        self.writes.push(WriteIntent::Set { at, fields });
    }

    /// Buffer a deletion of the document at `at`.
    pub fn delete(&mut self, at: DocumentHandle) {
        self.writes.push(WriteIntent::Delete { at });
    }

    /// Buffered writes, in the order they were issued.
    pub fn pending_writes(&self) -> &[WriteIntent] {
        &self.writes
    }

    /// Drain the buffered writes, leaving the transaction empty. Client
    /// implementations call this inside `commit_transaction` /
    /// `rollback_transaction`.
    pub fn take_writes(&mut self) -> Vec<WriteIntent> {
        std::mem::take(&mut self.writes)
    }
}

/// Emits the completion event from `Drop`, so the guarantee survives panics
/// and mid-suspend cancellation of an async body.
struct CompletionGuard {
    tx_id: u64,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        tracing::debug!(tx_id = self.tx_id, "transaction complete");
    }
}

/// Run `body` inside a transaction scope against a blocking client.
///
/// Acquires a [`Transaction`] from `client`, yields it to `body`, and emits
/// the completion event exactly once when the scope exits, on every exit
/// path. An error from `body` reaches the caller unmodified after the event
/// fires.
///
/// # Examples
///
/// ```rust
/// use docstore::{resolve, with_transaction, MemoryStore, StoreClient};
///
/// let store = MemoryStore::new();
/// let at = resolve("users/alice")?;
/// with_transaction(&store, |tx| {
///     tx.set(at.clone(), serde_json::Map::new());
///     store.commit_transaction(tx)
/// })?;
/// # Ok::<(), docstore::StoreError>(())
/// ```
pub fn with_transaction<C, T, F>(client: &C, body: F) -> StoreResult<T>
where
    C: crate::client::StoreClient + ?Sized,
    F: FnOnce(&mut Transaction) -> StoreResult<T>,
{
    let mut tx = client.begin_transaction()?;
    let _guard = CompletionGuard { tx_id: tx.id() };
    body(&mut tx)
}

/// [`with_transaction`] over an asynchronous client.
///
/// The body returns a boxed future borrowing only the transaction, so
/// anything else it touches must be owned — clone an `Arc` of the client in:
///
/// ```rust
/// use docstore::{resolve, with_async_transaction, AsyncStoreClient, MemoryStore};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), docstore::StoreError> {
/// let store = Arc::new(MemoryStore::new());
/// let at = resolve("users/alice")?;
/// with_async_transaction(store.as_ref(), |tx| {
///     let store = store.clone();
///     let at = at.clone();
///     Box::pin(async move {
///         tx.set(at, serde_json::Map::new());
///         store.commit_transaction(tx).await
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
///
/// If the returned future is dropped while the body is suspended, the
/// completion event still fires before the cancellation propagates.
pub async fn with_async_transaction<C, T, F>(client: &C, body: F) -> StoreResult<T>
where
    C: crate::client::AsyncStoreClient + ?Sized,
    F: for<'a> FnOnce(&'a mut Transaction) -> BoxFuture<'a, StoreResult<T>>,
{
    let mut tx = client.begin_transaction().await?;
    let _guard = CompletionGuard { tx_id: tx.id() };
    body(&mut tx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AsyncStoreClient, MemoryStore, StoreClient};
    use crate::error::StoreError;
    use crate::path::resolve;
    use serde_json::Map;

    #[test]
    fn scope_returns_the_body_value() {
        let store = MemoryStore::new();
        let out = with_transaction(&store, |_tx| Ok(7)).unwrap();
        assert_eq!(out, 7);
    }

    #[test]
    fn scope_propagates_body_error_unchanged() {
        let store = MemoryStore::new();
        let err = with_transaction::<_, (), _>(&store, |_tx| {
            Err(StoreError::backend("deliberate"))
        })
        .unwrap_err();
        assert_eq!(err, StoreError::Backend("deliberate".to_string()));
    }

    #[test]
    fn uncommitted_writes_never_reach_the_store() {
        let store = MemoryStore::new();
        let at = resolve("users/alice").unwrap();
        with_transaction(&store, |tx| {
            tx.set(at.clone(), Map::new());
            Ok(())
        })
        .unwrap();
        assert!(StoreClient::get_document(&store, &at).unwrap().is_none());
    }

    #[test]
    fn committed_writes_are_applied() {
        let store = MemoryStore::new();
        let at = resolve("users/alice").unwrap();
        with_transaction(&store, |tx| {
            let mut fields = Map::new();
            fields.insert("name".to_string(), serde_json::json!("Alice"));
            tx.set(at.clone(), fields);
            StoreClient::commit_transaction(&store, tx)
        })
        .unwrap();

        let snap = StoreClient::get_document(&store, &at)
            .unwrap()
            .expect("document present");
        assert_eq!(snap.raw_fields()["name"], serde_json::json!("Alice"));
    }

    #[test]
    fn rollback_discards_buffered_writes() {
        let store = MemoryStore::new();
        let at = resolve("users/alice").unwrap();
        with_transaction(&store, |tx| {
            tx.set(at.clone(), Map::new());
            StoreClient::rollback_transaction(&store, tx)
        })
        .unwrap();
        assert!(StoreClient::get_document(&store, &at).unwrap().is_none());
    }

    #[tokio::test]
    async fn async_scope_has_the_same_semantics() {
        // The body's future may borrow only the transaction; the client
        // travels in as an owned Arc clone.
        let store = std::sync::Arc::new(MemoryStore::new());
        let at = resolve("users/alice").unwrap();
        with_async_transaction(store.as_ref(), |tx| {
            let store = store.clone();
            let at = at.clone();
            Box::pin(async move {
                tx.set(at, Map::new());
                AsyncStoreClient::commit_transaction(store.as_ref(), tx).await
            })
        })
        .await
        .unwrap();
        assert!(AsyncStoreClient::get_document(store.as_ref(), &at)
            .await
            .unwrap()
            .is_some());
    }
}
