//! Dependency tracking between cells
//!
//! The graph keeps two indices that always mirror each other: the forward
//! index (cell to the cells it reads, sorted) and the reverse index (cell to
//! the cells reading it). Edits are validated with [`DependencyGraph::would_create_cycle`]
//! before [`DependencyGraph::replace_edges`] commits them, so the graph is
//! never cyclic, not even transiently.

use std::collections::hash_map::Entry;
use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use tallysheet_core::CellAddress;

/// Directed reference graph over cell addresses
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell → cells it reads (precedents), sorted and deduplicated
    precedents: AHashMap<CellAddress, Vec<CellAddress>>,
    /// Cell → cells that read it (dependents)
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells the given cell reads
    pub fn precedents(&self, cell: CellAddress) -> &[CellAddress] {
        self.precedents.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cells that read the given cell directly
    pub fn dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn has_dependents(&self, cell: CellAddress) -> bool {
        self.dependents.contains_key(&cell)
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(Vec::len).sum()
    }

    /// Check whether giving `cell` the outgoing edges `proposed` (in place of
    /// its current ones) would close a cycle.
    ///
    /// Runs a depth-first search from every proposed target along forward
    /// edges; the edit is cyclic exactly when `cell` is reachable. The
    /// search stops at `cell`, so its current edges never take part. Returns
    /// the offending path, `cell -> ... -> cell`.
    pub fn would_create_cycle(
        &self,
        cell: CellAddress,
        proposed: &[CellAddress],
    ) -> Option<Vec<CellAddress>> {
        // Node → node it was reached from; doubles as the visited set
        let mut parent: AHashMap<CellAddress, CellAddress> = AHashMap::new();
        let mut stack = Vec::new();

        for &target in proposed {
            if target == cell {
                return Some(vec![cell, cell]);
            }
            if let Entry::Vacant(entry) = parent.entry(target) {
                entry.insert(cell);
                stack.push(target);
            }
        }

        while let Some(node) = stack.pop() {
            for &next in self.precedents(node) {
                if next == cell {
                    return Some(Self::cycle_path(&parent, cell, node));
                }
                if let Entry::Vacant(entry) = parent.entry(next) {
                    entry.insert(node);
                    stack.push(next);
                }
            }
        }

        None
    }

    fn cycle_path(
        parent: &AHashMap<CellAddress, CellAddress>,
        cell: CellAddress,
        last: CellAddress,
    ) -> Vec<CellAddress> {
        let mut path = vec![cell, last];
        let mut node = last;
        while let Some(&prev) = parent.get(&node) {
            path.push(prev);
            if prev == cell {
                break;
            }
            node = prev;
        }
        path.reverse();
        path
    }

    /// Replace every outgoing edge of `cell`
    ///
    /// `refs` must be sorted and deduplicated. Callers check
    /// [`would_create_cycle`](Self::would_create_cycle) first.
    pub fn replace_edges(&mut self, cell: CellAddress, refs: Vec<CellAddress>) {
        debug_assert!(refs.windows(2).all(|pair| pair[0] < pair[1]));

        if let Some(old) = self.precedents.remove(&cell) {
            for precedent in old {
                if let Entry::Occupied(mut entry) = self.dependents.entry(precedent) {
                    entry.get_mut().remove(&cell);
                    if entry.get().is_empty() {
                        entry.remove();
                    }
                }
            }
        }

        for &precedent in &refs {
            self.dependents.entry(precedent).or_default().insert(cell);
        }
        if !refs.is_empty() {
            self.precedents.insert(cell, refs);
        }
    }

    /// Remove every outgoing edge of `cell`
    pub fn clear_edges(&mut self, cell: CellAddress) {
        self.replace_edges(cell, Vec::new());
    }

    /// Every cell whose value can depend on `origin`, breadth-first,
    /// each listed once and `origin` excluded
    pub fn transitive_dependents(&self, origin: CellAddress) -> Vec<CellAddress> {
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::new();
        let mut result = Vec::new();

        visited.insert(origin);
        queue.push_back(origin);

        while let Some(node) = queue.pop_front() {
            for dependent in self.dependents(node) {
                if visited.insert(dependent) {
                    result.push(dependent);
                    queue.push_back(dependent);
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn a(name: &str) -> CellAddress {
        CellAddress::parse(name).unwrap()
    }

    fn sorted(mut cells: Vec<CellAddress>) -> Vec<CellAddress> {
        cells.sort();
        cells
    }

    #[test]
    fn test_replace_edges_keeps_indices_mirrored() {
        let mut graph = DependencyGraph::new();
        graph.replace_edges(a("C1"), vec![a("A1"), a("B1")]);
        assert_eq!(graph.precedents(a("C1")), &[a("A1"), a("B1")]);
        assert_eq!(graph.dependents(a("A1")).collect::<Vec<_>>(), vec![a("C1")]);

        graph.replace_edges(a("C1"), vec![a("B1"), a("D1")]);
        assert!(!graph.has_dependents(a("A1")));
        assert_eq!(graph.dependents(a("D1")).collect::<Vec<_>>(), vec![a("C1")]);
        assert_eq!(graph.edge_count(), 2);

        graph.clear_edges(a("C1"));
        assert!(graph.precedents(a("C1")).is_empty());
        assert!(!graph.has_dependents(a("B1")));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let graph = DependencyGraph::new();
        assert_eq!(
            graph.would_create_cycle(a("A1"), &[a("A1"), a("B1")]),
            Some(vec![a("A1"), a("A1")])
        );
    }

    #[test]
    fn test_indirect_cycle_reports_path() {
        let mut graph = DependencyGraph::new();
        graph.replace_edges(a("A1"), vec![a("B1")]);
        graph.replace_edges(a("B1"), vec![a("C1")]);

        assert_eq!(
            graph.would_create_cycle(a("C1"), &[a("A1")]),
            Some(vec![a("C1"), a("A1"), a("B1"), a("C1")])
        );
        assert_eq!(graph.would_create_cycle(a("C1"), &[a("D1")]), None);
    }

    #[test]
    fn test_replacing_own_edges_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.replace_edges(a("B1"), vec![a("A1")]);
        // A1 already reads nothing; B1 switching targets cannot cycle through itself
        assert_eq!(graph.would_create_cycle(a("B1"), &[a("C1")]), None);
        // A1 reading B1 would: A1 -> B1 -> A1
        assert_eq!(
            graph.would_create_cycle(a("A1"), &[a("B1")]),
            Some(vec![a("A1"), a("B1"), a("A1")])
        );
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.replace_edges(a("B1"), vec![a("A1")]);
        graph.replace_edges(a("C1"), vec![a("A1")]);
        assert_eq!(graph.would_create_cycle(a("D1"), &[a("B1"), a("C1")]), None);
    }

    #[test]
    fn test_transitive_dependents_visits_each_once() {
        let mut graph = DependencyGraph::new();
        // Diamond: A1 <- B1, A1 <- C1, {B1, C1} <- D1, D1 <- E1
        graph.replace_edges(a("B1"), vec![a("A1")]);
        graph.replace_edges(a("C1"), vec![a("A1")]);
        graph.replace_edges(a("D1"), vec![a("B1"), a("C1")]);
        graph.replace_edges(a("E1"), vec![a("D1")]);

        let reached = graph.transitive_dependents(a("A1"));
        assert_eq!(reached.len(), 4);
        assert_eq!(sorted(reached), vec![a("B1"), a("C1"), a("D1"), a("E1")]);
        assert!(graph.transitive_dependents(a("E1")).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const SIDE: u32 = 4;

    fn addr(index: u32) -> CellAddress {
        CellAddress::new(index / SIDE, (index % SIDE) as u16)
    }

    /// Edits: a cell and the cells it should read
    fn arb_edits() -> impl Strategy<Value = Vec<(u32, Vec<u32>)>> {
        prop::collection::vec(
            (
                0..SIDE * SIDE,
                prop::collection::vec(0..SIDE * SIDE, 0..4),
            ),
            1..40,
        )
    }

    fn reaches(graph: &DependencyGraph, from: CellAddress, to: CellAddress) -> bool {
        let mut seen = AHashSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            for &next in graph.precedents(node) {
                if next == to {
                    return true;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn graph_stays_acyclic_and_mirrored(edits in arb_edits()) {
            let mut graph = DependencyGraph::new();

            for (cell, targets) in edits {
                let cell = addr(cell);
                let mut refs: Vec<CellAddress> = targets.into_iter().map(addr).collect();
                refs.sort();
                refs.dedup();

                match graph.would_create_cycle(cell, &refs) {
                    Some(path) => {
                        prop_assert_eq!(path.first(), Some(&cell));
                        prop_assert_eq!(path.last(), Some(&cell));
                    }
                    None => graph.replace_edges(cell, refs),
                }

                for (&cell, precedents) in graph.precedents.iter() {
                    prop_assert!(!precedents.is_empty());
                    prop_assert!(!reaches(&graph, cell, cell));
                    for precedent in precedents {
                        prop_assert!(graph
                            .dependents
                            .get(precedent)
                            .is_some_and(|set| set.contains(&cell)));
                    }
                }
                for (precedent, dependents) in graph.dependents.iter() {
                    prop_assert!(!dependents.is_empty());
                    for dependent in dependents {
                        prop_assert!(graph.precedents(*dependent).contains(precedent));
                    }
                }
            }
        }

        #[test]
        fn cycle_check_agrees_with_reachability(
            edits in arb_edits(),
            edge in (0..SIDE * SIDE, 0..SIDE * SIDE)
        ) {
            let mut graph = DependencyGraph::new();
            for (cell, targets) in edits {
                let cell = addr(cell);
                let mut refs: Vec<CellAddress> = targets.into_iter().map(addr).collect();
                refs.sort();
                refs.dedup();
                if graph.would_create_cycle(cell, &refs).is_none() {
                    graph.replace_edges(cell, refs);
                }
            }

            let (cell, target) = (addr(edge.0), addr(edge.1));
            let cyclic = cell == target || reaches(&graph, target, cell);
            prop_assert_eq!(graph.would_create_cycle(cell, &[target]).is_some(), cyclic);
        }
    }
}
