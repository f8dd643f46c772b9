use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique, monotonically assigned cell identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u64);

/// Identifier of a clone group (a lineage founded by a driver mutation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CloneId(pub u64);

impl CloneId {
    /// Clone group shared by every seeded founder cell.
    pub const FOUNDER: Self = Self(0);
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell{}", self.0)
    }
}

impl fmt::Display for CloneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clone{}", self.0)
    }
}

/// Source of cell and clone-group ids for one simulation instance.
///
/// Owned by the coordinator and lent to every shard, so independent
/// simulations in the same process never share counters.
#[derive(Debug)]
pub struct IdGenerator {
    next_cell: AtomicU64,
    next_clone: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_cell: AtomicU64::new(0),
            next_clone: AtomicU64::new(CloneId::FOUNDER.0 + 1),
        }
    }

    #[inline]
    pub fn next_cell_id(&self) -> CellId {
        CellId(self.next_cell.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn next_clone_id(&self) -> CloneId {
        CloneId(self.next_clone.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of cell ids issued so far.
    pub fn cells_issued(&self) -> u64 {
        self.next_cell.load(Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_monotonic() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_cell_id(), CellId(0));
        assert_eq!(ids.next_cell_id(), CellId(1));
        assert_eq!(ids.next_clone_id(), CloneId(1));
        assert_eq!(ids.cells_issued(), 2);
    }

    #[test]
    fn test_generators_are_independent() {
        let a = IdGenerator::new();
        let b = IdGenerator::new();
        a.next_cell_id();
        a.next_cell_id();
        assert_eq!(b.next_cell_id(), CellId(0));
    }

    #[test]
    fn test_unique_across_threads() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..1000).map(|_| ids.next_cell_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
