//! The versioned property store.
//!
//! This crate is the heart of revconf. It provides:
//! - `PropertyNamespace` for qualifying raw keys under the configured prefix
//! - `SchemaRegistry` with versioned key/kind tables and default stubs
//! - `PropertyStore`, the mapping-like façade whose every mutation commits a
//!   new backend revision and reloads
//! - Bound sub-views (`BoundMapping`, `BranchConfig`) that proxy writes back
//!   through the owning store
//!
//! A store holds no state that survives outside the backend: reconnecting to
//! the same repository reproduces an identical view.

pub mod error;
pub mod namespace;
pub mod schema;
pub mod store;
pub mod subview;

pub use error::{StoreError, StoreResult};
pub use namespace::{PropertyNamespace, RESERVED_MARKER, SEPARATOR};
pub use schema::{SchemaRegistry, SchemaVersion, Scope, ScopeTables};
pub use store::{PropertyStore, StoreOptions};
pub use subview::{BoundMapping, BranchConfig};
