//! Round-trip-verified textual encoding for revconf values.
//!
//! Every configuration value is persisted as text on the backend filesystem,
//! and a wrong encoding silently corrupts configuration that other processes
//! will trust. This crate therefore never trusts a rendering it has not
//! verified: [`encode`] walks a fixed, ordered ladder of candidate renderers
//! and accepts the first whose output decodes back to an equal value.
//!
//! # Encoding ladder
//!
//! 1. Natural literal — the value's own display form (scalars)
//! 2. Structural — pretty-printed JSON (containers)
//! 3. Fenced literal — raw text inside a `"""` multi-line marker
//! 4. Canonical — JSON-escaped single-line string
//! 5. String cast — the display form, unconditionally
//!
//! [`decode`] is the total inverse grammar. Malformed structured text is a
//! hard error, never silently defaulted; the store layer attaches the
//! property name when surfacing it.

pub mod decode;
pub mod encode;
pub mod error;

pub use decode::decode;
pub use encode::encode;
pub use error::{CodecError, CodecResult};
