//! Bound sub-views: mapping entries and branch scopes that proxy writes
//! back through the owning store.

use revconf_types::{ConfigMap, ConfigValue, Revision, ValueKind};

use crate::error::{StoreError, StoreResult};
use crate::schema::Scope;
use crate::store::{PropertyStore, Reload};

/// View over the mapping stored at one key, bound to the owning store.
///
/// Every mutation reads the parent mapping (or its schema default), applies
/// the change, and rewrites the whole mapping through the parent store as a
/// new revision — the sub-view never holds a detached copy.
pub struct BoundMapping<'a> {
    store: &'a PropertyStore,
    key: String,
}

impl<'a> BoundMapping<'a> {
    pub(crate) fn new(store: &'a PropertyStore, key: String) -> Self {
        Self { store, key }
    }

    /// The parent key this view is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The entry stored under `entry`, or [`ConfigValue::Unset`].
    pub fn get(&self, entry: &str) -> StoreResult<ConfigValue> {
        let mut map = self.load()?;
        Ok(map.remove(entry).unwrap_or(ConfigValue::Unset))
    }

    /// Whether the mapping holds `entry`.
    pub fn contains(&self, entry: &str) -> StoreResult<bool> {
        Ok(self.load()?.contains_key(entry))
    }

    /// Owned snapshot of the mapping contents.
    pub fn entries(&self) -> StoreResult<ConfigMap> {
        self.load()
    }

    /// Insert `entry` and rewrite the parent property.
    ///
    /// Writing [`ConfigValue::Unset`] removes the entry, as mappings cannot
    /// hold the absence sentinel.
    pub fn set(&self, entry: &str, value: ConfigValue) -> StoreResult<Revision> {
        if value.is_unset() {
            return self.delete(entry);
        }
        let mut map = self.load()?;
        map.insert(entry.to_string(), value);
        self.store.set(&self.key, ConfigValue::Map(map))
    }

    /// Remove `entry` and rewrite the parent property.
    pub fn delete(&self, entry: &str) -> StoreResult<Revision> {
        let mut map = self.load()?;
        map.remove(entry);
        self.store.set(&self.key, ConfigValue::Map(map))
    }

    fn load(&self) -> StoreResult<ConfigMap> {
        match self.store.get(&self.key)? {
            ConfigValue::Map(map) => Ok(map),
            ConfigValue::Unset => Ok(ConfigMap::new()),
            other => Err(StoreError::KindMismatch {
                name: self.store.namespace().qualify(&self.key)?,
                expected: ValueKind::Map,
                actual: other.kind().unwrap_or(ValueKind::Str),
            }),
        }
    }
}

/// The per-branch property set, stored under `<prefix>:<path>:<key>`.
///
/// Reads consult the branch-scope schema table for defaults; writes to
/// recognized keys are checked against their declared kind.
pub struct BranchConfig<'a> {
    store: &'a PropertyStore,
    path: String,
}

impl<'a> BranchConfig<'a> {
    pub(crate) fn new(store: &'a PropertyStore, path: String) -> Self {
        Self { store, path }
    }

    /// The branch path this view is scoped to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The value for `key` in this branch's scope: the stored value, else
    /// the branch-table default, else [`ConfigValue::Unset`].
    pub fn get(&self, key: &str) -> StoreResult<ConfigValue> {
        let name = self.store.namespace().qualify_scoped(&self.path, key)?;
        let flat = self.store.namespace().unqualify(&name)?;
        let stored = self.store.get(&flat)?;
        if !stored.is_unset() {
            return Ok(stored);
        }
        let defaults = self
            .store
            .registry()
            .defaults_for(self.store.schema_version(), Scope::Branch)?;
        Ok(defaults.get(key).cloned().unwrap_or(ConfigValue::Unset))
    }

    /// Write `key` in this branch's scope as a new revision.
    ///
    /// Values for keys the branch table recognizes must match the declared
    /// kind.
    pub fn set(&self, key: &str, value: ConfigValue) -> StoreResult<Revision> {
        let name = self.store.namespace().qualify_scoped(&self.path, key)?;
        let expected = self
            .store
            .registry()
            .kind_of(self.store.schema_version(), Scope::Branch, key)?;
        if let (Some(expected), Some(actual)) = (expected, value.kind()) {
            if expected != actual {
                return Err(StoreError::KindMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }
        self.store.commit_value(&name, &value, Reload::Eager)
    }

    /// Delete `key` in this branch's scope by writing the absence marker.
    pub fn delete(&self, key: &str) -> StoreResult<Revision> {
        let name = self.store.namespace().qualify_scoped(&self.path, key)?;
        self.store.commit_value(&name, &ConfigValue::Unset, Reload::Eager)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use revconf_backend::{InMemoryRepo, VersionedFs};

    use super::*;
    use crate::store::StoreOptions;

    fn repo() -> Arc<InMemoryRepo> {
        Arc::new(InMemoryRepo::new())
    }

    fn store(repo: &Arc<InMemoryRepo>) -> PropertyStore {
        PropertyStore::open(
            Arc::clone(repo) as Arc<dyn VersionedFs>,
            StoreOptions::default(),
        )
        .unwrap()
    }

    // ---- BoundMapping ----

    #[test]
    fn mapping_writes_proxy_to_the_parent_property() {
        let repo = repo();
        let store = store(&repo);
        let roots = store.mapping("roots").unwrap();

        roots.set("trunk", ConfigValue::Int(1)).unwrap();
        assert_eq!(roots.get("trunk").unwrap(), ConfigValue::Int(1));

        // The parent property was rewritten through the store.
        let parent = store.get("roots").unwrap();
        assert_eq!(
            parent.as_map().unwrap().get("trunk"),
            Some(&ConfigValue::Int(1))
        );
        assert!(repo.head_properties().contains_key("evn:roots"));
    }

    #[test]
    fn mapping_starts_from_the_schema_default() {
        let store = store(&repo());
        let roots = store.mapping("roots").unwrap();
        assert_eq!(roots.entries().unwrap(), ConfigMap::new());
        assert_eq!(roots.get("trunk").unwrap(), ConfigValue::Unset);
    }

    #[test]
    fn mapping_delete_keeps_an_explicit_empty_mapping() {
        let repo = repo();
        let store = store(&repo);
        let roots = store.mapping("roots").unwrap();
        roots.set("trunk", ConfigValue::Int(1)).unwrap();
        roots.delete("trunk").unwrap();

        assert_eq!(
            store.get("roots").unwrap(),
            ConfigValue::Map(ConfigMap::new())
        );
        assert!(!roots.contains("trunk").unwrap());
    }

    #[test]
    fn mapping_set_unset_removes_the_entry() {
        let store = store(&repo());
        let roots = store.mapping("roots").unwrap();
        roots.set("trunk", ConfigValue::Int(1)).unwrap();
        roots.set("trunk", ConfigValue::Unset).unwrap();
        assert_eq!(roots.get("trunk").unwrap(), ConfigValue::Unset);
    }

    #[test]
    fn mapping_over_a_scalar_is_a_kind_mismatch() {
        let store = store(&repo());
        store.set("notes", ConfigValue::from("text")).unwrap();

        let view = store.mapping("notes").unwrap();
        let err = view.set("x", ConfigValue::Int(1)).unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch { .. }));
    }

    #[test]
    fn sibling_entries_survive_a_mapping_write() {
        let store = store(&repo());
        let roots = store.mapping("roots").unwrap();
        roots.set("trunk", ConfigValue::Int(1)).unwrap();
        roots.set("branches/x", ConfigValue::Int(2)).unwrap();

        let entries = roots.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("trunk"), Some(&ConfigValue::Int(1)));
    }

    // ---- BranchConfig ----

    #[test]
    fn branch_reads_fall_back_to_branch_table_defaults() {
        let store = store(&repo());
        let branch = store.branch("branches/x").unwrap();
        assert_eq!(branch.get("last_rev").unwrap(), ConfigValue::Int(0));
        assert_eq!(branch.get("version").unwrap(), ConfigValue::Int(1));
        assert_eq!(branch.get("owner").unwrap(), ConfigValue::Unset);
    }

    #[test]
    fn branch_writes_land_under_the_scoped_name() {
        let repo = repo();
        let store = store(&repo);
        let branch = store.branch("branches/x").unwrap();
        branch.set("last_rev", ConfigValue::Int(42)).unwrap();

        assert_eq!(branch.get("last_rev").unwrap(), ConfigValue::Int(42));
        let head = repo.head_properties();
        assert_eq!(
            head.get("evn:branches/x:last_rev").map(String::as_str),
            Some("42")
        );

        // A fresh store sees the scoped entry in its flat view.
        let fresh = PropertyStore::open(
            Arc::clone(&repo) as Arc<dyn VersionedFs>,
            StoreOptions::default(),
        )
        .unwrap();
        assert_eq!(
            fresh.get("branches/x:last_rev").unwrap(),
            ConfigValue::Int(42)
        );
    }

    #[test]
    fn branch_scopes_are_independent() {
        let store = store(&repo());
        let x = store.branch("branches/x").unwrap();
        let y = store.branch("branches/y").unwrap();
        x.set("last_rev", ConfigValue::Int(7)).unwrap();

        assert_eq!(x.get("last_rev").unwrap(), ConfigValue::Int(7));
        assert_eq!(y.get("last_rev").unwrap(), ConfigValue::Int(0));
    }

    #[test]
    fn branch_recognized_keys_are_kind_checked() {
        let repo = repo();
        let store = store(&repo);
        let branch = store.branch("branches/x").unwrap();

        let err = branch
            .set("last_rev", ConfigValue::from("not a number"))
            .unwrap_err();
        assert!(matches!(err, StoreError::KindMismatch { .. }));
        assert_eq!(repo.commit_count(), 0);

        // Unrecognized keys carry no kind constraint.
        branch.set("owner", ConfigValue::from("alice")).unwrap();
        assert_eq!(branch.get("owner").unwrap(), ConfigValue::from("alice"));
    }

    #[test]
    fn branch_delete_restores_the_default() {
        let store = store(&repo());
        let branch = store.branch("branches/x").unwrap();
        branch.set("last_rev", ConfigValue::Int(42)).unwrap();
        branch.delete("last_rev").unwrap();
        assert_eq!(branch.get("last_rev").unwrap(), ConfigValue::Int(0));
    }

    #[test]
    fn invalid_branch_paths_are_rejected() {
        let store = store(&repo());
        assert!(store.branch("").is_err());
        assert!(store.branch("_internal").is_err());
    }
}
