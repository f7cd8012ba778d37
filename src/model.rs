//! Typed-record mapping to and from raw documents.
//!
//! A typed record is a domain struct carrying a [`Metadata`] block under the
//! document key `_metadata`. Identity is derived, never stored: a record's
//! `uid` is the final segment of its metadata path, which is stamped in when
//! the record is read from a [`Snapshot`] and absent on a freshly constructed,
//! not-yet-persisted record.
//!
//! Reading tolerates payloads of unknown shape. [`from_snapshot`] normalizes
//! the metadata block to its structured form, stamps the snapshot's own
//! location into it, trims every top-level field the record type did not
//! declare (through [`bind`](crate::binder::bind) against the type's static
//! [`Signature`]), and only then deserializes. A webhook body with a hundred
//! extra fields still maps cleanly onto a two-field record.
//!
//! Writing is not pure: [`to_document`] refreshes the record's `updated_time`
//! before serializing, and omits unset fields from the output.

use crate::binder::{bind, Signature};
use crate::client::{RawDocument, Snapshot};
use crate::error::{StoreError, StoreResult};
use crate::path::DocumentHandle;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The document key the metadata block lives under.
pub const METADATA_KEY: &str = "_metadata";

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Bookkeeping attached to every typed record.
///
/// `created_time` is set once at construction and never overwritten;
/// `updated_time` is refreshed on every serialization-for-write; `path` is
/// set exactly when the record originated from, or has been synchronized to,
/// a concrete store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "now")]
    created_time: DateTime<Utc>,
    #[serde(default = "now")]
    updated_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<DocumentHandle>,
}

impl Metadata {
    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }

    pub fn updated_time(&self) -> DateTime<Utc> {
        self.updated_time
    }

    pub fn path(&self) -> Option<&DocumentHandle> {
        self.path.as_ref()
    }

    /// Synchronize this record to a concrete store location.
    pub fn set_path(&mut self, path: DocumentHandle) {
        self.path = Some(path);
    }

    /// Refresh `updated_time` to the current instant.
    pub fn touch(&mut self) {
        self.updated_time = now();
    }
}

impl Default for Metadata {
    fn default() -> Self {
        let at = now();
        Metadata {
            created_time: at,
            updated_time: at,
            path: None,
        }
    }
}

/// A domain struct mapped to and from raw documents.
///
/// Implementors carry a [`Metadata`] field serialized under
/// [`METADATA_KEY`], declare `#[serde(deny_unknown_fields)]` (field trimming
/// is the binder's job, not serde's), and publish their declared parameter
/// table as a static [`Signature`]:
///
/// ```rust
/// use docstore::binder::{ParamSpec, Signature};
/// use docstore::{Metadata, Record, METADATA_KEY};
/// use once_cell::sync::Lazy;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// #[serde(deny_unknown_fields)]
/// struct Member {
///     #[serde(rename = "_metadata", default)]
///     metadata: Metadata,
///     name: String,
/// }
///
/// static MEMBER_SIGNATURE: Lazy<Signature> = Lazy::new(|| {
///     Signature::new(vec![ParamSpec::named(METADATA_KEY), ParamSpec::field("name")])
///         .expect("well-formed declaration")
/// });
///
/// impl Record for Member {
///     fn signature() -> &'static Signature {
///         &MEMBER_SIGNATURE
///     }
///     fn metadata(&self) -> &Metadata {
///         &self.metadata
///     }
///     fn metadata_mut(&mut self) -> &mut Metadata {
///         &mut self.metadata
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned {
    /// The statically declared parameter table unknown fields are trimmed
    /// against.
    fn signature() -> &'static Signature;

    fn metadata(&self) -> &Metadata;

    fn metadata_mut(&mut self) -> &mut Metadata;

    /// The record's identity: the final segment of its metadata path.
    ///
    /// Fails with [`StoreError::NoPath`] on a record that has never been
    /// persisted or read from the store.
    fn uid(&self) -> StoreResult<&str> {
        self.metadata()
            .path()
            .map(DocumentHandle::id)
            .ok_or(StoreError::NoPath { wanted: "uid" })
    }

    /// The record's store location, under the same condition as [`uid`](Record::uid).
    fn doc_ref(&self) -> StoreResult<&DocumentHandle> {
        self.metadata()
            .path()
            .ok_or(StoreError::NoPath { wanted: "doc ref" })
    }
}

/// Construct a typed record from a snapshot.
///
/// The snapshot's metadata block — whatever raw shape it arrived in — is
/// parsed into [`Metadata`] first, then stamped with the snapshot's own
/// location, so the record always knows where it came from. Top-level fields
/// the record type did not declare are trimmed away before deserialization.
///
/// Fails with [`StoreError::MalformedSnapshot`] when a required domain field
/// is absent or a present field fails type coercion.
pub fn from_snapshot<R: Record>(snapshot: &Snapshot) -> StoreResult<R> {
    let record_type = std::any::type_name::<R>();
    let mut fields = snapshot.raw_fields().clone();

    // Normalize to the structured shape before stamping the path; the raw
    // shape never propagates past this point.
    let raw_metadata = fields
        .remove(METADATA_KEY)
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    let mut metadata: Metadata = serde_json::from_value(raw_metadata)
        .map_err(|e| StoreError::malformed(record_type, format!("bad {METADATA_KEY}: {e}")))?;
    metadata.set_path(snapshot.location().clone());

    let metadata_value = serde_json::to_value(&metadata)
        .map_err(|e| StoreError::malformed(record_type, e.to_string()))?;
    fields.insert(METADATA_KEY.to_string(), metadata_value);

    let bound = bind(R::signature(), Vec::new(), fields);
    serde_json::from_value(Value::Object(bound.named))
        .map_err(|e| StoreError::malformed(record_type, e.to_string()))
}

/// Serialize a typed record into a raw document ready for storage.
///
/// Refreshes the record's `updated_time` first — an observable side effect;
/// callers must not assume this is pure. Fields are emitted under their
/// document names and unset (`null`) fields are omitted at every level.
pub fn to_document<R: Record>(record: &mut R) -> StoreResult<RawDocument> {
    record.metadata_mut().touch();
    let value = serde_json::to_value(&*record)
        .map_err(|e| StoreError::malformed(std::any::type_name::<R>(), e.to_string()))?;
    match value {
        Value::Object(map) => Ok(prune_unset(map)),
        other => Err(StoreError::malformed(
            std::any::type_name::<R>(),
            format!("record serialized to non-object JSON ({})", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Drop `null` entries from objects, at every nesting level.
fn prune_unset(map: serde_json::Map<String, Value>) -> serde_json::Map<String, Value> {
    map.into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k, prune_value(v)))
        .collect()
}

fn prune_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(prune_unset(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_value).collect()),
        other => other,
    }
}
