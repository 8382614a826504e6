//! Process-scoped cache of opened backend handles.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::BackendResult;
use crate::traits::VersionedFs;

/// Opens a backend handle for a normalized repository path.
pub type Opener = Box<dyn Fn(&Path) -> BackendResult<Arc<dyn VersionedFs>> + Send + Sync>;

/// Cache of opened backend handles, keyed by normalized absolute path.
///
/// Handles are opened once and kept for the remainder of the process. The
/// backend's own revisioning keeps a handle valid indefinitely, so there is
/// no eviction, expiry, or invalidation. The cache is explicit state owned
/// by whoever composes a store with its backend — not a hidden global.
///
/// Concurrent first opens for the same path may both run the opener; no
/// lock is held across that call, and the most recent open wins the cache
/// slot. The outcome is a duplicate handle, not corruption.
pub struct RepoCache {
    opener: Opener,
    handles: RwLock<HashMap<PathBuf, Arc<dyn VersionedFs>>>,
}

impl RepoCache {
    pub fn new(opener: Opener) -> Self {
        Self {
            opener,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Look up or open the handle for `path`.
    ///
    /// The path is normalized to an absolute form first, so spellings that
    /// name the same repository share one cache slot.
    pub fn open(&self, path: impl AsRef<Path>) -> BackendResult<Arc<dyn VersionedFs>> {
        let key = normalize(path.as_ref())?;
        if let Some(handle) = self.handles.read().expect("lock poisoned").get(&key) {
            return Ok(Arc::clone(handle));
        }

        let handle = (self.opener)(&key)?;
        debug!(path = %key.display(), "opened backend handle");
        self.handles
            .write()
            .expect("lock poisoned")
            .insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    /// Whether a handle is cached for `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        normalize(path.as_ref())
            .map(|key| {
                self.handles
                    .read()
                    .expect("lock poisoned")
                    .contains_key(&key)
            })
            .unwrap_or(false)
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.handles.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no handle has been opened yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RepoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoCache")
            .field("handle_count", &self.len())
            .finish()
    }
}

/// Lexical normalization: anchor relative paths at the current directory and
/// resolve `.`/`..` components without touching the filesystem.
fn normalize(path: &Path) -> BackendResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::memory::InMemoryRepo;

    fn counting_cache() -> (RepoCache, Arc<AtomicUsize>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opens);
        let cache = RepoCache::new(Box::new(move |_path| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(InMemoryRepo::new()) as Arc<dyn VersionedFs>)
        }));
        (cache, opens)
    }

    #[test]
    fn second_open_reuses_the_handle() {
        let (cache, opens) = counting_cache();
        let a = cache.open("/repos/alpha").unwrap();
        let b = cache.open("/repos/alpha").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn spellings_of_one_path_share_a_slot() {
        let (cache, opens) = counting_cache();
        let a = cache.open("/repos/alpha").unwrap();
        let b = cache.open("/repos/./alpha").unwrap();
        let c = cache.open("/repos/beta/../alpha").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_paths_get_distinct_handles() {
        let (cache, opens) = counting_cache();
        let a = cache.open("/repos/alpha").unwrap();
        let b = cache.open("/repos/beta").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(opens.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn relative_paths_anchor_at_the_current_directory() {
        let (cache, _) = counting_cache();
        let cwd = std::env::current_dir().unwrap();
        cache.open("alpha").unwrap();
        assert!(cache.contains(cwd.join("alpha")));
    }

    #[test]
    fn contains_and_len() {
        let (cache, _) = counting_cache();
        assert!(cache.is_empty());
        assert!(!cache.contains("/repos/alpha"));

        cache.open("/repos/alpha").unwrap();
        assert!(cache.contains("/repos/alpha"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn opener_failure_caches_nothing() {
        let cache = RepoCache::new(Box::new(|_path| {
            Err(crate::error::BackendError::CommitRejected {
                reason: "nope".to_string(),
            })
        }));
        assert!(cache.open("/repos/alpha").is_err());
        assert!(cache.is_empty());
    }
}
