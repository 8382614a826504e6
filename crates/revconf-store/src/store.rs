//! The versioned property store façade.

use std::sync::{Arc, RwLock};

use revconf_backend::VersionedFs;
use revconf_codec::{decode, encode};
use revconf_types::{ConfigMap, ConfigValue, Revision, ValueKind};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::namespace::PropertyNamespace;
use crate::schema::{SchemaRegistry, SchemaVersion, Scope};
use crate::subview::{BoundMapping, BranchConfig};

/// Construction options for [`PropertyStore`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Namespace prefix for every property this store owns.
    pub prefix: String,
    /// Identity that commits are attributed to. Opaque to the store.
    pub identity: String,
    /// Schema version assumed when the backend records none.
    pub schema_version: SchemaVersion,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            prefix: "evn".to_string(),
            identity: "revconf".to_string(),
            schema_version: SchemaVersion::CURRENT,
        }
    }
}

/// Whether a commit should refresh the view immediately. Bulk bootstrap
/// defers the refresh until its last commit has landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reload {
    Eager,
    Deferred,
}

struct ViewState {
    values: ConfigMap,
    version: SchemaVersion,
}

/// Mapping-like view of the configuration properties on a backend
/// repository's root node.
///
/// Construction performs a full load; every successful mutation commits one
/// new revision and reloads. The store holds no state that survives outside
/// the backend.
///
/// Concurrency: each operation is synchronous and blocking. `set` commits
/// against the youngest revision read within the same call and performs no
/// conflict check, so concurrent writers race last-writer-wins per property
/// value. Callers that need atomic read-modify-write must run their own
/// retry loop; no compare-and-swap primitive is offered.
pub struct PropertyStore {
    fs: Arc<dyn VersionedFs>,
    ns: PropertyNamespace,
    registry: SchemaRegistry,
    identity: String,
    configured_version: SchemaVersion,
    state: RwLock<ViewState>,
}

impl PropertyStore {
    /// Open a store bound to `fs` with the built-in schema registry and
    /// immediately load the current view.
    pub fn open(fs: Arc<dyn VersionedFs>, options: StoreOptions) -> StoreResult<Self> {
        Self::open_with_registry(fs, options, SchemaRegistry::builtin())
    }

    /// Open with a caller-supplied registry (e.g. one carrying newer schema
    /// versions).
    pub fn open_with_registry(
        fs: Arc<dyn VersionedFs>,
        options: StoreOptions,
        registry: SchemaRegistry,
    ) -> StoreResult<Self> {
        if !registry.contains(options.schema_version) {
            return Err(StoreError::UnknownSchemaVersion {
                version: i64::from(options.schema_version.number()),
            });
        }
        let ns = PropertyNamespace::new(&options.prefix)?;
        let store = Self {
            fs,
            ns,
            registry,
            identity: options.identity,
            configured_version: options.schema_version,
            state: RwLock::new(ViewState {
                values: ConfigMap::new(),
                version: options.schema_version,
            }),
        };
        store.reload()?;
        Ok(store)
    }

    // ---- Read side ----

    /// The value stored under `key`.
    ///
    /// Keys recognized by the active schema but absent from the backend
    /// yield the registry's default stub; unrecognized absent keys yield
    /// [`ConfigValue::Unset`]. Qualified names are accepted and treated as
    /// their raw key.
    pub fn get(&self, key: &str) -> StoreResult<ConfigValue> {
        let key = self.ns.unqualify(key)?;
        let state = self.state.read().expect("lock poisoned");
        Ok(state.values.get(&key).cloned().unwrap_or(ConfigValue::Unset))
    }

    /// Keys present in the merged view, sorted.
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.read().expect("lock poisoned");
        state.values.keys().cloned().collect()
    }

    /// Whether `key` is present in the merged view.
    pub fn contains(&self, key: &str) -> bool {
        let Ok(key) = self.ns.unqualify(key) else {
            return false;
        };
        let state = self.state.read().expect("lock poisoned");
        state.values.contains_key(&key)
    }

    /// Number of entries in the merged view.
    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").values.len()
    }

    /// Returns `true` if the merged view is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owned snapshot of the merged view.
    pub fn snapshot(&self) -> ConfigMap {
        self.state.read().expect("lock poisoned").values.clone()
    }

    /// The schema version governing the current view.
    pub fn schema_version(&self) -> SchemaVersion {
        self.state.read().expect("lock poisoned").version
    }

    /// The configured namespace prefix.
    pub fn prefix(&self) -> &str {
        self.ns.prefix()
    }

    /// The identity commits are attributed to.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    // ---- Write side ----

    /// Encode `value`, commit it under `key` as a new revision, and reload.
    ///
    /// The commit message is `"<qualified-name> -> <encoded-value>"`. On any
    /// failure the in-memory view is left at its prior state.
    pub fn set(&self, key: &str, value: ConfigValue) -> StoreResult<Revision> {
        let name = self.ns.qualify(key)?;
        self.commit_value(&name, &value, Reload::Eager)
    }

    /// Delete `key` by writing the absence marker.
    ///
    /// The property name stays in the backend's raw list with empty text;
    /// the decoded view drops it, so `get` falls back to the schema default
    /// or [`ConfigValue::Unset`].
    pub fn delete(&self, key: &str) -> StoreResult<Revision> {
        self.set(key, ConfigValue::Unset)
    }

    /// Commit several entries with the reload deferred until the last one
    /// has landed — the batched bootstrap path.
    ///
    /// Returns the final revision, or `None` for an empty batch. A failure
    /// part-way leaves earlier commits in the backend and the view at its
    /// prior state; the next reload observes them.
    pub fn apply<I>(&self, entries: I) -> StoreResult<Option<Revision>>
    where
        I: IntoIterator<Item = (String, ConfigValue)>,
    {
        let mut last = None;
        for (key, value) in entries {
            let name = self.ns.qualify(&key)?;
            last = Some(self.commit_value(&name, &value, Reload::Deferred)?);
        }
        if last.is_some() {
            self.reload()?;
        }
        Ok(last)
    }

    // ---- Sub-views ----

    /// Bound sub-view over the mapping stored at `key`.
    ///
    /// Mutating the sub-view rewrites the whole mapping through this store
    /// rather than a detached copy.
    pub fn mapping(&self, key: &str) -> StoreResult<BoundMapping<'_>> {
        let key = self.ns.unqualify(key)?;
        Ok(BoundMapping::new(self, key))
    }

    /// The per-branch property set stored under `<prefix>:<path>:<key>`.
    pub fn branch(&self, path: &str) -> StoreResult<BranchConfig<'_>> {
        crate::namespace::validate_key(path)?;
        Ok(BranchConfig::new(self, path.to_string()))
    }

    // ---- Reload ----

    /// Rebuild the in-memory view at the backend's youngest revision.
    ///
    /// All-or-nothing: a decode failure for any single property aborts the
    /// reload with [`StoreError::CorruptProperty`] and the prior view is
    /// retained. A partial view is never exposed.
    pub fn reload(&self) -> StoreResult<()> {
        let rev = self.fs.youngest_revision()?;
        let raw = self.fs.properties_at(rev)?;

        let mut values = ConfigMap::new();
        for (name, text) in &raw {
            if !self.ns.is_qualified(name) {
                continue;
            }
            let key = self.ns.unqualify(name)?;
            let value = decode(text).map_err(|source| StoreError::CorruptProperty {
                name: name.clone(),
                text: text.clone(),
                source,
            })?;
            if value.is_unset() {
                // Absence marker left behind by a delete.
                continue;
            }
            values.insert(key, value);
        }

        let version = self.active_version(&values)?;
        for (key, stub) in self.registry.defaults_for(version, Scope::Repository)? {
            values.entry(key).or_insert(stub);
        }

        let mut state = self.state.write().expect("lock poisoned");
        state.values = values;
        state.version = version;
        debug!(%rev, keys = state.values.len(), "view reloaded");
        Ok(())
    }

    /// The schema version governing `values`: the recorded `version`
    /// property when present, else the configured one. A recorded version
    /// the registry does not know is a hard error.
    fn active_version(&self, values: &ConfigMap) -> StoreResult<SchemaVersion> {
        match values.get("version") {
            None => Ok(self.configured_version),
            Some(ConfigValue::Int(n)) => {
                let version = SchemaVersion::from_recorded(*n)
                    .filter(|v| self.registry.contains(*v))
                    .ok_or(StoreError::UnknownSchemaVersion { version: *n })?;
                Ok(version)
            }
            Some(other) => Err(StoreError::KindMismatch {
                name: self.ns.qualify("version")?,
                expected: ValueKind::Int,
                actual: other.kind().unwrap_or(ValueKind::Str),
            }),
        }
    }

    // ---- Internal plumbing shared with the sub-views ----

    pub(crate) fn namespace(&self) -> &PropertyNamespace {
        &self.ns
    }

    pub(crate) fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub(crate) fn commit_value(
        &self,
        name: &str,
        value: &ConfigValue,
        reload: Reload,
    ) -> StoreResult<Revision> {
        let text = encode(value).map_err(|source| StoreError::Encoding {
            name: name.to_string(),
            source,
        })?;
        let base = self.fs.youngest_revision()?;
        let message = format!("{name} -> {text}");
        let payload = if value.is_unset() {
            None
        } else {
            Some(text.as_str())
        };
        let committed = self
            .fs
            .commit_property_change(name, payload, base, &self.identity, &message)
            .map_err(|source| StoreError::Commit { source })?;
        debug!(property = name, %committed, "property committed");
        if reload == Reload::Eager {
            self.reload()?;
        }
        Ok(committed)
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("lock poisoned");
        f.debug_struct("PropertyStore")
            .field("prefix", &self.ns.prefix())
            .field("schema_version", &state.version)
            .field("keys", &state.values.len())
            .finish()
    }
}
