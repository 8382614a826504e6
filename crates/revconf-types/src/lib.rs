//! Foundation types for revconf.
//!
//! This crate provides the value and revision types used throughout the
//! revconf configuration store. Every other revconf crate depends on
//! `revconf-types`.
//!
//! # Key Types
//!
//! - [`ConfigValue`] — A configuration value drawn from a closed set of kinds
//! - [`ValueKind`] — The kind tag used by schema tables
//! - [`ConfigMap`] — Ordered string-keyed mapping of configuration values
//! - [`Revision`] — Monotonically increasing revision number assigned by the
//!   backend filesystem at commit time

pub mod revision;
pub mod value;

pub use revision::Revision;
pub use value::{ConfigMap, ConfigValue, ValueKind};
