//! Error types produced by the store access layer.
//!
//! All errors here are local validation failures: none of them represent a
//! transient or network condition (those belong to whatever remote client sits
//! behind the [`StoreClient`](crate::StoreClient) trait), so nothing in this
//! crate retries. Every error surfaces unchanged to the immediate caller;
//! transaction-scope cleanup runs first but never swallows or rewrites one.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`InvalidPath`](StoreError::InvalidPath) | Validation | Path has an odd or zero segment count, or an empty segment |
//! | [`UnsupportedPathType`](StoreError::UnsupportedPathType) | Validation | Dynamic path value is neither a string nor a string array |
//! | [`NoPath`](StoreError::NoPath) | Validation | `uid`/`doc_ref` requested before the record was persisted |
//! | [`MalformedSnapshot`](StoreError::MalformedSnapshot) | Validation | Snapshot missing required fields or failing type coercion |
//! | [`Binding`](StoreError::Binding) | Defensive | Declared parameter signature is not well formed |
//! | [`Backend`](StoreError::Backend) | Internal | Store backend failure (e.g. poisoned lock) |
//!
//! # HTTP Status Code Mapping
//!
//! ```rust
//! use docstore::StoreError;
//!
//! fn to_http_status(error: &StoreError) -> u16 {
//!     match error {
//!         StoreError::Backend(_) => 500,
//!         _ => 422, // all validation errors
//!     }
//! }
//! ```
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while resolving paths, scoping transactions, or
/// mapping typed records to and from raw documents.
///
/// The enum is marked `#[non_exhaustive]` to allow future additions without
/// breaking existing code. Callers should always include a catch-all arm when
/// matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A slash-delimited or segmented path did not describe a document.
    ///
    /// Document paths alternate collection and document segments, so a valid
    /// path always has an even, nonzero segment count and no empty segments.
    /// `"users/alice"` resolves; `"users"` and `"users/alice/orders"` do not.
    #[error("invalid document path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A dynamically-shaped path value could not be interpreted at all.
    ///
    /// Raised by [`resolve_value`](crate::path::resolve_value) when a raw
    /// document carries a path that is neither a string nor an array of
    /// strings. The offending JSON type is named in the message.
    #[error("unsupported path value of type `{kind}`")]
    UnsupportedPathType { kind: &'static str },

    /// A record's identity was requested before it had a store location.
    ///
    /// `uid()` and `doc_ref()` derive identity from `Metadata::path`, which is
    /// only set once the record has originated from or been synchronized to a
    /// concrete store location.
    #[error("record has no path in metadata, cannot derive `{wanted}`")]
    NoPath { wanted: &'static str },

    /// A snapshot could not be mapped onto the target record type.
    ///
    /// Required domain fields were absent, or a present field failed type
    /// coercion. Unknown extra fields never cause this error; they are trimmed
    /// away by the argument binder before construction.
    #[error("malformed snapshot for `{record_type}`: {reason}")]
    MalformedSnapshot {
        record_type: &'static str,
        reason: String,
    },

    /// A declared parameter signature is not well formed.
    ///
    /// Defensive; signatures are statically declared per record type and a
    /// well-formed declaration never trips this. Raised for duplicate
    /// parameter names or parameters declared after a variadic of the same
    /// axis already claimed everything remaining.
    #[error("invalid parameter signature: {0}")]
    Binding(String),

    /// The storage backend failed internally.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(record_type: &'static str, reason: impl Into<String>) -> Self {
        StoreError::MalformedSnapshot {
            record_type,
            reason: reason.into(),
        }
    }

    /// Create a backend error from any displayable cause.
    pub fn backend(cause: impl std::fmt::Display) -> Self {
        StoreError::Backend(cause.to_string())
    }
}
