use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of a genome a mutation or lineage node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenomeHalf {
    /// Mutations that raise division likelihood.
    Driver,
    /// Mutations that lower division likelihood.
    Passenger,
}

impl fmt::Display for GenomeHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver => write!(f, "driver"),
            Self::Passenger => write!(f, "passenger"),
        }
    }
}

/// Arena index of a [`GenomePart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub usize);

impl PartId {
    /// The sentinel root every lineage ends at.
    pub const ROOT: Self = Self(0);

    /// Root identity is decided by index, never by reference.
    #[inline]
    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

/// One immutable lineage node of a genome half.
///
/// A part records the locus hit by a single mutation and the part it was
/// derived from. Parts are created once per mutation event and live as long
/// as the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomePart {
    /// Mutated locus (offset into the half's region map); `None` only for the root.
    locus: Option<u32>,
    parent: PartId,
}

impl GenomePart {
    /// The sentinel root: no mutation, its own parent.
    pub const ROOT: Self = Self {
        locus: None,
        parent: PartId::ROOT,
    };

    pub fn mutated(locus: u32, parent: PartId) -> Self {
        Self {
            locus: Some(locus),
            parent,
        }
    }

    #[inline]
    pub fn locus(&self) -> Option<u32> {
        self.locus
    }

    #[inline]
    pub fn parent(&self) -> PartId {
        self.parent
    }
}
