//! Backend filesystem seam for revconf.
//!
//! The configuration store consumes the host version-control filesystem
//! exclusively through the [`VersionedFs`] trait: read the youngest
//! revision, list the root node's textual properties at a revision, and
//! commit a single property change as a new revision.
//!
//! # Backends
//!
//! - [`InMemoryRepo`] — snapshot-per-revision store for tests and embedding
//!
//! # Handle caching
//!
//! [`RepoCache`] is the process-scoped cache of opened handles, keyed by
//! normalized absolute path. It is explicit state owned by whoever composes
//! a store, not a hidden global.
//!
//! # Design Rules
//!
//! 1. Revisions are immutable once committed.
//! 2. Commits are serialized by the backend and numbered strictly upward.
//! 3. The backend never interprets property text.
//! 4. All failures are propagated, never silently ignored.

pub mod cache;
pub mod error;
pub mod memory;
pub mod traits;

pub use cache::{Opener, RepoCache};
pub use error::{BackendError, BackendResult};
pub use memory::{CommitRecord, InMemoryRepo};
pub use traits::VersionedFs;
