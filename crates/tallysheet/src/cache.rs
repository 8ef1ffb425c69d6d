//! Value cache bookkeeping and invalidation
//!
//! Each stored cell owns one cache slot. Reads fill slots lazily; edits
//! clear the edited cell and everything that transitively reads it, without
//! recomputing anything until the next read.

use std::cell::Cell as Counter;

use ahash::AHashMap;
use tallysheet_core::CellAddress;

use crate::cell::Cell;
use crate::graph::DependencyGraph;

/// Cache activity since the sheet was created (or since the last reset)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    /// Reads answered from a cache slot
    pub hits: u64,
    /// Formula evaluations (reads of formula cells that missed the cache)
    pub evaluations: u64,
    /// Cache slots cleared by edits
    pub invalidations: u64,
}

/// Interior-mutable counters updated from `&self` reads
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: Counter<u64>,
    evaluations: Counter<u64>,
    invalidations: Counter<u64>,
}

impl CacheCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.set(self.hits.get() + 1);
    }

    pub(crate) fn record_evaluation(&self) {
        self.evaluations.set(self.evaluations.get() + 1);
    }

    pub(crate) fn record_invalidations(&self, count: usize) {
        self.invalidations.set(self.invalidations.get() + count as u64);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            evaluations: self.evaluations.get(),
            invalidations: self.invalidations.get(),
        }
    }

    pub(crate) fn reset(&self) {
        self.hits.set(0);
        self.evaluations.set(0);
        self.invalidations.set(0);
    }
}

/// Clear the cache of `origin` and of every cell that transitively reads it
///
/// Every reachable cell is visited exactly once, cached or not: a cell with
/// an empty slot may still have dependents holding stale values. Returns
/// the number of slots that held a value.
pub(crate) fn invalidate(
    cells: &mut AHashMap<CellAddress, Cell>,
    graph: &DependencyGraph,
    origin: CellAddress,
) -> usize {
    let mut cleared = 0;

    for addr in std::iter::once(origin).chain(graph.transitive_dependents(origin)) {
        if let Some(cell) = cells.get_mut(&addr) {
            if cell.cache.take().is_some() {
                cleared += 1;
            }
        }
    }

    cleared
}
