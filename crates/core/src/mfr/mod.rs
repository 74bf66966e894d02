//! Minimum Fragment Removal.
//!
//! Finding a smallest vertex set whose removal makes the conflict graph
//! bipartite is NP-hard; the solver branches on odd-cycle certificates
//! (every feasible removal set must hit every odd cycle) with an
//! incumbent bound and Zobrist-hashed memoization of removed sets, under
//! a configurable depth and wall-clock budget.

use std::time::Duration;

use hashbrown::{HashMap, HashSet};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::graph::ConflictGraph;
use crate::sequence::ReadId;

pub mod intersection;
pub mod solver;

pub use intersection::{fragment_intersection, IntersectionOutcome};
pub use solver::{MfrOutcome, MfrSolver, SolverStats};

/// A removed-vertex set under consideration during the search.
pub type Removed = HashSet<ReadId>;

/// The solver's deadline expired before any usable removal set existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MfrTimeout;

/// Budget and reproducibility knobs for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MfrOptions {
    /// Branch-and-bound recursion cap; beyond it the solver falls back to
    /// its incumbent.
    pub max_branch_depth: usize,
    /// Wall-clock budget for one fragment-intersection invocation.
    pub timeout: Duration,
    /// Fixed seed for the Zobrist table; `None` draws fresh keys.
    pub zobrist_seed: Option<u64>,
}

impl Default for MfrOptions {
    fn default() -> Self {
        Self {
            max_branch_depth: 64,
            timeout: Duration::from_secs(30),
            zobrist_seed: None,
        }
    }
}

/// Per-vertex random tags for O(1) incremental set hashing.
///
/// `hash(R) = XOR of key(v) for v in R`, so `hash(∅) = 0` and adding or
/// removing a vertex is a single XOR.
#[derive(Debug, Clone)]
pub struct ZobristTable {
    keys: HashMap<ReadId, u64>,
}

impl ZobristTable {
    /// Draw one 64-bit key per vertex of `graph`.
    #[must_use]
    pub fn new(graph: &ConflictGraph, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::rng().random()),
        };
        let keys = graph
            .vertices()
            .map(|vertex| (vertex, rng.random()))
            .collect();
        Self { keys }
    }

    /// The key for `vertex`.
    ///
    /// # Panics
    ///
    /// Asking for a vertex outside the table's graph is a bug.
    #[must_use]
    pub fn key(&self, vertex: ReadId) -> u64 {
        self.keys[&vertex]
    }

    /// Hash a whole removed set from scratch.
    #[must_use]
    pub fn hash(&self, removed: &Removed) -> u64 {
        removed.iter().fold(0, |acc, &v| acc ^ self.key(v))
    }
}

/// Memoized search results keyed by removed-set hash.
///
/// XOR collisions are possible, so each bucket keeps the exact sets and
/// lookups compare for set equality.
#[derive(Debug, Default)]
pub struct Memo {
    buckets: HashMap<u64, Vec<(Removed, usize)>>,
}

impl Memo {
    #[must_use]
    pub fn lookup(&self, hash: u64, removed: &Removed) -> Option<usize> {
        self.buckets
            .get(&hash)?
            .iter()
            .find(|(set, _)| set == removed)
            .map(|&(_, value)| value)
    }

    pub fn store(&mut self, hash: u64, removed: Removed, value: usize) {
        self.buckets.entry(hash).or_default().push((removed, value));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ConflictGraph {
        let mut graph = ConflictGraph::default();
        graph.connect(0, 1);
        graph.connect(1, 2);
        graph.connect(0, 2);
        graph
    }

    #[test]
    fn empty_set_hashes_to_zero() {
        let table = ZobristTable::new(&triangle(), Some(1));
        assert_eq!(table.hash(&Removed::new()), 0);
    }

    #[test]
    fn hash_is_incremental_under_xor() {
        let table = ZobristTable::new(&triangle(), Some(7));
        let mut removed = Removed::new();
        let mut hash = 0_u64;
        for vertex in [2, 0, 1] {
            removed.insert(vertex);
            hash ^= table.key(vertex);
            assert_eq!(table.hash(&removed), hash);
        }
        // Removing a vertex undoes its XOR contribution.
        removed.remove(&0);
        assert_eq!(table.hash(&removed), hash ^ table.key(0));
    }

    #[test]
    fn seeded_tables_are_reproducible() {
        let graph = triangle();
        let a = ZobristTable::new(&graph, Some(42));
        let b = ZobristTable::new(&graph, Some(42));
        for vertex in 0..3 {
            assert_eq!(a.key(vertex), b.key(vertex));
        }
    }

    #[test]
    fn memo_resolves_hash_collisions_by_set_equality() {
        let mut memo = Memo::default();
        let set_a: Removed = [1].into_iter().collect();
        let set_b: Removed = [2].into_iter().collect();
        // Force both sets into the same bucket.
        memo.store(99, set_a.clone(), 4);
        memo.store(99, set_b.clone(), 7);
        assert_eq!(memo.lookup(99, &set_a), Some(4));
        assert_eq!(memo.lookup(99, &set_b), Some(7));
        assert_eq!(memo.lookup(99, &Removed::new()), None);
        assert_eq!(memo.lookup(5, &set_a), None);
        assert_eq!(memo.len(), 2);
    }
}
