//! Integration tests for transaction scope bracketing.
//!
//! The scope's contract is that its completion step runs exactly once per
//! invocation, on every exit path, and that errors pass through unchanged.
//! The completion step is a tracing event, so these tests install a counting
//! subscriber and assert on the count.

use docstore::{with_async_transaction, with_transaction, MemoryStore, StoreError};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::span;

/// Counts `transaction complete` events emitted by the access layer.
#[derive(Clone, Default)]
struct CompletionCounter(Arc<AtomicUsize>);

impl CompletionCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl tracing::Subscriber for CompletionCounter {
    fn enabled(&self, metadata: &tracing::Metadata<'_>) -> bool {
        metadata.target().starts_with("docstore")
    }

    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }

    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}

    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}

    fn event(&self, event: &tracing::Event<'_>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.message.contains("transaction complete") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &span::Id) {}

    fn exit(&self, _: &span::Id) {}
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

#[test]
fn completion_runs_once_on_normal_return() {
    let counter = CompletionCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let store = MemoryStore::new();
        let out = with_transaction(&store, |_tx| Ok("value")).unwrap();
        assert_eq!(out, "value");
    });
    assert_eq!(counter.count(), 1);
}

#[test]
fn completion_runs_once_on_empty_result() {
    let counter = CompletionCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let store = MemoryStore::new();
        with_transaction(&store, |_tx| Ok(())).unwrap();
    });
    assert_eq!(counter.count(), 1);
}

#[test]
fn completion_runs_once_and_error_passes_through_unchanged() {
    let counter = CompletionCounter::default();
    let err = tracing::subscriber::with_default(counter.clone(), || {
        let store = MemoryStore::new();
        with_transaction::<_, (), _>(&store, |_tx| {
            Err(StoreError::InvalidPath {
                path: "a/b/c".to_string(),
                reason: "odd segment count".to_string(),
            })
        })
        .unwrap_err()
    });
    assert_eq!(counter.count(), 1);
    assert_eq!(
        err,
        StoreError::InvalidPath {
            path: "a/b/c".to_string(),
            reason: "odd segment count".to_string(),
        }
    );
}

#[test]
fn completion_runs_when_the_body_panics() {
    let counter = CompletionCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let store = MemoryStore::new();
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            with_transaction::<_, (), _>(&store, |_tx| panic!("body exploded"))
        }));
        assert!(result.is_err());
    });
    assert_eq!(counter.count(), 1);
}

#[test]
fn completion_runs_once_per_scope_across_scopes() {
    let counter = CompletionCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let store = MemoryStore::new();
        for _ in 0..3 {
            with_transaction(&store, |_tx| Ok(())).unwrap();
        }
    });
    assert_eq!(counter.count(), 3);
}

#[test]
fn completion_runs_when_async_scope_is_cancelled_mid_suspend() {
    let counter = CompletionCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let store = MemoryStore::new();
            let fut = with_async_transaction(&store, |_tx| {
                Box::pin(futures::future::pending::<Result<(), StoreError>>())
            });
            futures::pin_mut!(fut);
            // Poll once so the scope has acquired its transaction and is
            // suspended in the body, then drop it.
            assert!(futures::poll!(fut.as_mut()).is_pending());
        });
    });
    assert_eq!(counter.count(), 1);
}

#[test]
fn async_scope_matches_sync_semantics() {
    let counter = CompletionCounter::default();
    tracing::subscriber::with_default(counter.clone(), || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let store = MemoryStore::new();
            let out = with_async_transaction(&store, |_tx| Box::pin(async { Ok(41 + 1) }))
                .await
                .unwrap();
            assert_eq!(out, 42);
        });
    });
    assert_eq!(counter.count(), 1);
}
