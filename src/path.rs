//! Document path resolution.
//!
//! A document lives at a slash-delimited path of alternating collection and
//! document segments (`users/alice/orders/o-17`). [`resolve`] normalizes the
//! three accepted reference shapes — a slash-delimited string, a sequence of
//! segments, or an already-resolved [`DocumentHandle`] — into a handle.
//! Resolution is pure and idempotent: resolving a handle yields it back
//! unchanged.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque reference to a single document location in the store.
///
/// Invariant: the segment count is even and nonzero (collection, document,
/// collection, document, …), and no segment is empty. A handle can only be
/// obtained through [`resolve`] or [`resolve_value`], which enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentHandle {
    segments: Vec<String>,
}

impl DocumentHandle {
    fn from_segments(segments: Vec<String>) -> StoreResult<Self> {
        let joined = segments.join("/");
        if segments.is_empty() {
            return Err(StoreError::invalid_path(joined, "empty path"));
        }
        if segments.len() % 2 != 0 {
            return Err(StoreError::invalid_path(
                joined,
                format!(
                    "odd segment count {}; paths alternate collection/document",
                    segments.len()
                ),
            ));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(StoreError::invalid_path(joined, "empty path segment"));
        }
        // A segment with an embedded separator would make the slash-joined
        // path re-parse to a different segment count.
        if segments.iter().any(|s| s.contains('/')) {
            return Err(StoreError::invalid_path(
                joined,
                "path segment contains `/`",
            ));
        }
        Ok(DocumentHandle { segments })
    }

    /// Slash-joined path of this handle.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment: the document id within its collection.
    pub fn id(&self) -> &str {
        // Non-empty by construction.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// First `len - 1` segments: the collection (and any parent documents)
    /// this document sits under.
    pub fn collection(&self) -> String {
        self.segments[..self.segments.len() - 1].join("/")
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl TryFrom<String> for DocumentHandle {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        resolve(value.as_str())
    }
}

impl From<DocumentHandle> for String {
    fn from(handle: DocumentHandle) -> Self {
        handle.path()
    }
}

/// One of the three reference shapes [`resolve`] accepts.
///
/// Call sites rarely name this type; the `From` conversions let them pass a
/// `&str`, a `Vec<String>`, a `&[&str]`, or a handle directly.
#[derive(Debug, Clone)]
pub enum PathInput {
    /// Slash-delimited path, e.g. `"users/alice"`.
    Str(String),
    /// Path segments in order, e.g. `["users", "alice"]`.
    Segments(Vec<String>),
    /// An already-resolved handle; passed through unchanged.
    Handle(DocumentHandle),
}

impl From<&str> for PathInput {
    fn from(value: &str) -> Self {
        PathInput::Str(value.to_string())
    }
}

impl From<String> for PathInput {
    fn from(value: String) -> Self {
        PathInput::Str(value)
    }
}

impl From<Vec<String>> for PathInput {
    fn from(value: Vec<String>) -> Self {
        PathInput::Segments(value)
    }
}

impl From<&[&str]> for PathInput {
    fn from(value: &[&str]) -> Self {
        PathInput::Segments(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PathInput {
    fn from(value: [&str; N]) -> Self {
        PathInput::Segments(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<DocumentHandle> for PathInput {
    fn from(value: DocumentHandle) -> Self {
        PathInput::Handle(value)
    }
}

impl From<&DocumentHandle> for PathInput {
    fn from(value: &DocumentHandle) -> Self {
        PathInput::Handle(value.clone())
    }
}

/// Normalize a path reference into a [`DocumentHandle`].
///
/// # Examples
///
/// ```rust
/// use docstore::resolve;
///
/// let a = resolve("users/alice").unwrap();
/// let b = resolve(["users", "alice"]).unwrap();
/// assert_eq!(a, b);
///
/// // Idempotent on handles.
/// let again = resolve(a.clone()).unwrap();
/// assert_eq!(a, again);
///
/// // Odd segment counts name a collection, not a document.
/// assert!(resolve("users/alice/orders").is_err());
/// ```
pub fn resolve(input: impl Into<PathInput>) -> StoreResult<DocumentHandle> {
    match input.into() {
        PathInput::Str(s) => {
            if s.is_empty() {
                return Err(StoreError::invalid_path(s, "empty path"));
            }
            DocumentHandle::from_segments(s.split('/').map(str::to_string).collect())
        }
        PathInput::Segments(segments) => DocumentHandle::from_segments(segments),
        PathInput::Handle(handle) => Ok(handle),
    }
}

/// Resolve a dynamically-shaped JSON value into a [`DocumentHandle`].
///
/// Raw documents are untyped JSON maps, so a path stored in one arrives with
/// no static shape. Strings and arrays of strings resolve exactly as in
/// [`resolve`]; every other JSON type fails with
/// [`StoreError::UnsupportedPathType`] naming the kind.
pub fn resolve_value(value: &serde_json::Value) -> StoreResult<DocumentHandle> {
    match value {
        serde_json::Value::String(s) => resolve(s.as_str()),
        serde_json::Value::Array(items) => {
            let mut segments = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    serde_json::Value::String(s) => segments.push(s.clone()),
                    other => {
                        return Err(StoreError::UnsupportedPathType {
                            kind: json_kind(other),
                        })
                    }
                }
            }
            DocumentHandle::from_segments(segments)
        }
        other => Err(StoreError::UnsupportedPathType {
            kind: json_kind(other),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
