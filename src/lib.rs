//! docstore - Typed access layer over a remote document store
//!
//! This crate is the document-store access core behind an HTTP service: the
//! pieces with a real contract, independent of any web framework.
//!
//! - **Path resolution** ([`path`]): normalize a slash-delimited string, a
//!   segment sequence, or an existing handle into a [`DocumentHandle`],
//!   enforcing the alternating collection/document shape.
//! - **Transaction scoping** ([`transaction`]): bracket a body with a
//!   store-issued [`Transaction`] and a completion step guaranteed to run on
//!   every exit path, in blocking and async flavors. The scope never commits;
//!   the caller decides the transaction's fate explicitly.
//! - **Model mapping** ([`model`]): map typed records to and from raw
//!   documents — location-derived identity, metadata stamping, update-time
//!   refresh on write, unset-field omission.
//! - **Partial argument binding** ([`binder`]): trim unknown fields from
//!   arbitrarily-shaped payloads against a statically declared parameter
//!   table, so records tolerate oversized webhook bodies.
//! - **Store clients** ([`client`]): the narrow capability traits the layer
//!   consumes, plus the in-process [`MemoryStore`].
//!
//! # Quick Start
//!
//! ```rust
//! use docstore::{from_snapshot, resolve, with_transaction, MemoryStore, StoreClient};
//! use serde_json::json;
//!
//! # use docstore::binder::{ParamSpec, Signature};
//! # use docstore::{Metadata, Record, METADATA_KEY};
//! # use once_cell::sync::Lazy;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Debug, Serialize, Deserialize)]
//! # #[serde(deny_unknown_fields)]
//! # struct Member {
//! #     #[serde(rename = "_metadata", default)]
//! #     metadata: Metadata,
//! #     name: String,
//! # }
//! # static SIG: Lazy<Signature> = Lazy::new(|| {
//! #     Signature::new(vec![ParamSpec::named(METADATA_KEY), ParamSpec::field("name")]).unwrap()
//! # });
//! # impl Record for Member {
//! #     fn signature() -> &'static Signature { &SIG }
//! #     fn metadata(&self) -> &Metadata { &self.metadata }
//! #     fn metadata_mut(&mut self) -> &mut Metadata { &mut self.metadata }
//! # }
//! let store = MemoryStore::new();
//! let at = resolve("members/m-1")?;
//!
//! // Seed a document, then read it back as a typed record inside a scope.
//! let mut fields = serde_json::Map::new();
//! fields.insert("name".to_string(), json!("Ada"));
//! store.set_document(&at, fields)?;
//!
//! let member: Member = with_transaction(&store, |_tx| {
//!     let snap = store.get_document(&at)?.expect("seeded above");
//!     from_snapshot(&snap)
//! })?;
//! assert_eq!(member.uid()?, "m-1");
//! # Ok::<(), docstore::StoreError>(())
//! ```

pub mod binder;
pub mod client;
pub mod error;
pub mod model;
pub mod path;
pub mod transaction;

pub use client::{AsyncStoreClient, MemoryStore, RawDocument, Snapshot, StoreClient};
pub use error::{StoreError, StoreResult};
pub use model::{from_snapshot, to_document, Metadata, Record, METADATA_KEY};
pub use path::{resolve, resolve_value, DocumentHandle, PathInput};
pub use transaction::{with_async_transaction, with_transaction, Transaction, WriteIntent};
