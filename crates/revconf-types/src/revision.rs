use std::fmt;

use serde::{Deserialize, Serialize};

/// A revision number assigned by the backend filesystem.
///
/// Revisions are opaque to the store beyond their ordering: the backend
/// assigns the next number at commit time, and the store always reads and
/// writes against the youngest revision at the instant of the call.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Revision(u64);

impl Revision {
    /// Revision zero: the empty root that exists before any commit.
    pub const ZERO: Revision = Revision(0);

    pub const fn new(number: u64) -> Self {
        Self(number)
    }

    /// The raw revision number.
    pub const fn number(&self) -> u64 {
        self.0
    }

    /// The revision a successful commit against this base would create.
    pub const fn next(&self) -> Revision {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl From<u64> for Revision {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl From<Revision> for u64 {
    fn from(rev: Revision) -> Self {
        rev.0
    }
}
