//! Error types for store operations.

use revconf_backend::BackendError;
use revconf_codec::CodecError;
use revconf_types::ValueKind;
use thiserror::Error;

/// Errors that can occur during store operations.
///
/// Every variant carries enough context to diagnose the failure without
/// re-querying the backend. Nothing is silently swallowed or retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The value could not be round-tripped to text. Fatal to that `set`;
    /// the backend was not touched.
    #[error("cannot encode value for property {name}: {source}")]
    Encoding {
        name: String,
        #[source]
        source: CodecError,
    },

    /// Stored text failed to decode during reload. Fatal to the whole
    /// reload; the last-good view is retained.
    #[error("corrupt property {name} with raw text {text:?}: {source}")]
    CorruptProperty {
        name: String,
        text: String,
        #[source]
        source: CodecError,
    },

    /// The key violates the naming invariants. No backend interaction was
    /// attempted.
    #[error("invalid property name {name:?}: {reason}")]
    InvalidPropertyName { name: String, reason: String },

    /// No schema table is registered for this version.
    #[error("unknown schema version {version}")]
    UnknownSchemaVersion { version: i64 },

    /// A write would contradict the kind the schema declares for the key.
    #[error("kind mismatch for property {name}: expected {expected}, got {actual}")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The backend refused the commit. Fatal to that `set`; the in-memory
    /// view is unchanged and the caller may retry.
    #[error("commit failed: {source}")]
    Commit {
        #[source]
        source: BackendError,
    },

    /// Backend failure on the read side.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
