//! In-memory revisioned filesystem for tests and embedding.

use std::collections::BTreeMap;
use std::sync::RwLock;

use revconf_types::Revision;
use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::traits::VersionedFs;

/// One committed property change, as recorded by [`InMemoryRepo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub revision: Revision,
    pub property: String,
    pub identity: String,
    pub message: String,
}

/// An in-memory implementation of [`VersionedFs`].
///
/// Each revision's root property list is held as a full snapshot: a commit
/// clones the youngest snapshot, applies one change, and appends. Revision 0
/// is the empty root that exists before any commit. All state lives behind
/// an `RwLock`; data is lost when the repo is dropped.
pub struct InMemoryRepo {
    inner: RwLock<RepoState>,
}

struct RepoState {
    snapshots: Vec<BTreeMap<String, String>>,
    log: Vec<CommitRecord>,
}

impl InMemoryRepo {
    /// Create a new repo at revision 0 with an empty root property list.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RepoState {
                snapshots: vec![BTreeMap::new()],
                log: Vec::new(),
            }),
        }
    }

    /// Number of commits made against this repo.
    pub fn commit_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").log.len()
    }

    /// The full commit log, oldest first.
    pub fn log(&self) -> Vec<CommitRecord> {
        self.inner.read().expect("lock poisoned").log.clone()
    }

    /// Raw property list at the youngest revision, absence markers included.
    pub fn head_properties(&self) -> BTreeMap<String, String> {
        let state = self.inner.read().expect("lock poisoned");
        state
            .snapshots
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionedFs for InMemoryRepo {
    fn youngest_revision(&self) -> BackendResult<Revision> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(Revision::new(state.snapshots.len() as u64 - 1))
    }

    fn properties_at(&self, rev: Revision) -> BackendResult<BTreeMap<String, String>> {
        let state = self.inner.read().expect("lock poisoned");
        state
            .snapshots
            .get(rev.number() as usize)
            .cloned()
            .ok_or(BackendError::NoSuchRevision { rev })
    }

    fn commit_property_change(
        &self,
        name: &str,
        value: Option<&str>,
        base: Revision,
        identity: &str,
        message: &str,
    ) -> BackendResult<Revision> {
        if identity.is_empty() {
            return Err(BackendError::CommitRejected {
                reason: "empty commit identity".to_string(),
            });
        }
        if message.is_empty() {
            return Err(BackendError::CommitRejected {
                reason: "empty commit message".to_string(),
            });
        }

        let mut state = self.inner.write().expect("lock poisoned");
        let youngest = state.snapshots.len() as u64 - 1;
        if base.number() > youngest {
            return Err(BackendError::NoSuchRevision { rev: base });
        }

        // Commits apply to the youngest snapshot regardless of base; the
        // backend serializes them in arrival order.
        let mut next = state.snapshots[youngest as usize].clone();
        next.insert(name.to_string(), value.unwrap_or_default().to_string());
        state.snapshots.push(next);

        let revision = Revision::new(youngest + 1);
        state.log.push(CommitRecord {
            revision,
            property: name.to_string(),
            identity: identity.to_string(),
            message: message.to_string(),
        });
        debug!(property = name, %revision, "committed property change");
        Ok(revision)
    }
}

impl std::fmt::Debug for InMemoryRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read().expect("lock poisoned");
        f.debug_struct("InMemoryRepo")
            .field("revisions", &state.snapshots.len())
            .field("commits", &state.log.len())
            .finish()
    }
}
