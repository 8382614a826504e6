//! Property name qualification under the configured namespace prefix.
//!
//! Valid raw keys:
//! - Must be non-empty
//! - Must not begin with the reserved marker `_`
//!
//! Qualification is idempotent: qualifying an already-qualified name is a
//! no-op, so a valid raw key never round-trips ambiguously.

use crate::error::{StoreError, StoreResult};

/// Separator between the prefix, optional scope, and key.
pub const SEPARATOR: char = ':';

/// Keys beginning with this marker are reserved for internal use.
pub const RESERVED_MARKER: char = '_';

/// Maps between raw configuration keys and fully-qualified property names.
///
/// The prefix is supplied at construction from external configuration, not
/// read from the store itself, which would be circular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNamespace {
    prefix: String,
}

impl PropertyNamespace {
    /// Create a namespace for `prefix`.
    ///
    /// The prefix must be non-empty, must not contain the separator, and
    /// must not begin with the reserved marker.
    pub fn new(prefix: &str) -> StoreResult<Self> {
        if prefix.is_empty() {
            return Err(invalid(prefix, "prefix must not be empty"));
        }
        if prefix.starts_with(RESERVED_MARKER) {
            return Err(invalid(prefix, "prefix must not begin with the reserved marker"));
        }
        if prefix.contains(SEPARATOR) {
            return Err(invalid(prefix, "prefix must not contain the separator"));
        }
        Ok(Self {
            prefix: prefix.to_string(),
        })
    }

    /// The bare prefix, without the separator.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `name` is already qualified under this namespace.
    pub fn is_qualified(&self, name: &str) -> bool {
        name.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
            .is_some()
    }

    /// Qualify a raw key as `<prefix>:<key>`.
    ///
    /// Qualifying an already-qualified name returns it unchanged.
    pub fn qualify(&self, key: &str) -> StoreResult<String> {
        if self.is_qualified(key) {
            // Idempotent, but the remainder must still be a valid key.
            self.unqualify(key)?;
            return Ok(key.to_string());
        }
        validate_key(key)?;
        Ok(format!("{}{}{}", self.prefix, SEPARATOR, key))
    }

    /// Qualify a key under a scope as `<prefix>:<scope>:<key>`.
    pub fn qualify_scoped(&self, scope: &str, key: &str) -> StoreResult<String> {
        validate_key(scope)?;
        validate_key(key)?;
        Ok(format!(
            "{}{sep}{}{sep}{}",
            self.prefix,
            scope,
            key,
            sep = SEPARATOR
        ))
    }

    /// Strip the namespace prefix from `name` if present.
    ///
    /// The result must itself be a valid raw key.
    pub fn unqualify(&self, name: &str) -> StoreResult<String> {
        let key = name
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
            .unwrap_or(name);
        validate_key(key)?;
        Ok(key.to_string())
    }
}

pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(invalid(key, "key must not be empty"));
    }
    if key.starts_with(RESERVED_MARKER) {
        return Err(invalid(key, "key must not begin with the reserved marker"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> StoreError {
    StoreError::InvalidPropertyName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
