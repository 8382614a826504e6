use revconf_types::Revision;
use thiserror::Error;

/// Errors from backend filesystem operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested revision does not exist.
    #[error("no such revision: {rev}")]
    NoSuchRevision { rev: Revision },

    /// The backend refused the commit.
    #[error("commit rejected: {reason}")]
    CommitRejected { reason: String },

    /// I/O error from the underlying filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
