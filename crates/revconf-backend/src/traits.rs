use std::collections::BTreeMap;

use revconf_types::Revision;

use crate::error::BackendResult;

/// A revisioned filesystem with named textual properties on each revision's
/// root node.
///
/// All implementations must satisfy these invariants:
/// - Revisions are immutable once committed: `properties_at` for a given
///   revision always returns the same list.
/// - Commits are serialized by the backend and assigned strictly increasing
///   revision numbers.
/// - The backend never interprets property names or text.
/// - All failures are propagated, never silently ignored.
pub trait VersionedFs: Send + Sync {
    /// The youngest (most recently committed) revision.
    fn youngest_revision(&self) -> BackendResult<Revision>;

    /// The full textual property list of the root node at `rev`.
    ///
    /// Deleted properties remain in the list with empty text; interpreting
    /// the absence marker is the caller's concern.
    fn properties_at(&self, rev: Revision) -> BackendResult<BTreeMap<String, String>>;

    /// Commit a single property change against `base` and return the new
    /// revision.
    ///
    /// `None` writes the empty absence marker rather than removing the
    /// property name from the list. The backend performs no conflict check
    /// against `base` beyond requiring that it exists; racing commits are
    /// serialized in arrival order.
    fn commit_property_change(
        &self,
        name: &str,
        value: Option<&str>,
        base: Revision,
        identity: &str,
        message: &str,
    ) -> BackendResult<Revision>;
}
