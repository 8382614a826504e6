//! Versioned schema tables for the repository and branch property sets.

use std::collections::BTreeMap;
use std::fmt;

use revconf_types::{ConfigMap, ConfigValue, ValueKind};

use crate::error::{StoreError, StoreResult};

/// Integer tag selecting one fixed `{key -> kind}` table per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion(u32);

impl SchemaVersion {
    /// The version new stores write.
    pub const CURRENT: SchemaVersion = SchemaVersion(1);

    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    pub const fn number(&self) -> u32 {
        self.0
    }

    /// Interpret a recorded `version` property value. Out-of-range values
    /// name no version at all.
    pub fn from_recorded(number: i64) -> Option<Self> {
        u32::try_from(number).ok().map(Self)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which property set a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Repository,
    Branch,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Repository => write!(f, "repository"),
            Scope::Branch => write!(f, "branch"),
        }
    }
}

/// The key/kind tables of one schema version.
#[derive(Debug, Clone, Default)]
pub struct ScopeTables {
    pub repository: BTreeMap<String, ValueKind>,
    pub branch: BTreeMap<String, ValueKind>,
}

/// Registry of schema tables, one entry per known version.
///
/// Lookups for an unregistered version are hard errors; the registry never
/// falls back to another version.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    tables: BTreeMap<SchemaVersion, ScopeTables>,
}

impl SchemaRegistry {
    /// The built-in registry holding the version 1 tables.
    pub fn builtin() -> Self {
        let mut repository = BTreeMap::new();
        repository.insert("roots".to_string(), ValueKind::Map);
        repository.insert("notes".to_string(), ValueKind::Str);
        repository.insert("errors".to_string(), ValueKind::Str);
        repository.insert("warnings".to_string(), ValueKind::Str);
        repository.insert("version".to_string(), ValueKind::Int);

        let mut branch = BTreeMap::new();
        branch.insert("last_rev".to_string(), ValueKind::Int);
        branch.insert("version".to_string(), ValueKind::Int);

        let mut tables = BTreeMap::new();
        tables.insert(SchemaVersion::CURRENT, ScopeTables { repository, branch });
        Self { tables }
    }

    /// Register the tables for `version`, replacing any existing entry.
    pub fn register(&mut self, version: SchemaVersion, tables: ScopeTables) {
        self.tables.insert(version, tables);
    }

    /// Whether tables are registered for `version`.
    pub fn contains(&self, version: SchemaVersion) -> bool {
        self.tables.contains_key(&version)
    }

    /// Expected kind of `key` in `scope`, or `None` for unrecognized keys.
    pub fn kind_of(
        &self,
        version: SchemaVersion,
        scope: Scope,
        key: &str,
    ) -> StoreResult<Option<ValueKind>> {
        Ok(self.scope_table(version, scope)?.get(key).copied())
    }

    /// Recognized keys of `scope`, in sorted order.
    pub fn keys(&self, version: SchemaVersion, scope: Scope) -> StoreResult<Vec<&str>> {
        Ok(self
            .scope_table(version, scope)?
            .keys()
            .map(String::as_str)
            .collect())
    }

    /// Default stub values for every recognized key of `scope`.
    ///
    /// Strings default to empty, integers to zero (the `version` key to the
    /// version itself), booleans to false, mappings to an empty mapping.
    pub fn defaults_for(&self, version: SchemaVersion, scope: Scope) -> StoreResult<ConfigMap> {
        let table = self.scope_table(version, scope)?;
        Ok(table
            .iter()
            .map(|(key, kind)| {
                let stub = match kind {
                    ValueKind::Str => ConfigValue::Str(String::new()),
                    ValueKind::Int if key == "version" => {
                        ConfigValue::Int(i64::from(version.number()))
                    }
                    ValueKind::Int => ConfigValue::Int(0),
                    ValueKind::Bool => ConfigValue::Bool(false),
                    ValueKind::Map => ConfigValue::Map(ConfigMap::new()),
                };
                (key.clone(), stub)
            })
            .collect())
    }

    fn scope_table(
        &self,
        version: SchemaVersion,
        scope: Scope,
    ) -> StoreResult<&BTreeMap<String, ValueKind>> {
        let tables = self
            .tables
            .get(&version)
            .ok_or(StoreError::UnknownSchemaVersion {
                version: i64::from(version.number()),
            })?;
        Ok(match scope {
            Scope::Repository => &tables.repository,
            Scope::Branch => &tables.branch,
        })
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
