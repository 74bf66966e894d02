//! Branch-and-bound solver for minimum fragment removal.
//!
//! # Search
//!
//! Every feasible removal set must contain at least one vertex of every
//! odd cycle, so branching on the vertices of any single witness cycle is
//! complete:
//!
//! 1. If the current removed set already matches the incumbent bound,
//!    prune.
//! 2. Ask [`odd_cycle`] for a witness; none means the removed set is
//!    feasible and its size is the branch value.
//! 3. Otherwise look the removed set up in the memo, then branch on each
//!    cycle vertex in discovery order, tightening the bound as siblings
//!    report back, and finally store the result under the pre-branch key.
//!
//! # Budget
//!
//! The search carries a recursion-depth cap and a wall-clock deadline.
//! Once either trips, the search unwinds, and [`MfrSolver::solve`]
//! completes the best incumbent to feasibility by greedy odd-cycle
//! deletion instead of claiming optimality.

use std::time::Instant;

use super::{Memo, MfrOptions, MfrTimeout, Removed, ZobristTable};
use crate::graph::odd_cycle::odd_cycle;
use crate::graph::ConflictGraph;
use crate::sequence::ReadId;

/// Sentinel for a pruned branch.
const PRUNED: usize = usize::MAX;

/// Search counters, exposed for tests and diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolverStats {
    /// Total search invocations.
    pub invocations: usize,
    /// Invocations entered with at least one vertex already removed.
    pub removal_invocations: usize,
    /// Results answered from the memo.
    pub memo_hits: usize,
}

/// Result of one solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfrOutcome {
    /// A removal set that makes the graph bipartite.
    pub removed: Removed,
    /// Its size; the true minimum unless `heuristic` is set.
    pub optimum: usize,
    /// Whether the budget cut the search short.
    pub heuristic: bool,
}

/// One branch-and-bound run over a fixed graph state.
///
/// The memo persists across [`solve`](Self::solve) and any subsequent
/// [`solve_forced`](Self::solve_forced) probes, which is what makes the
/// per-vertex probing of fragment intersection affordable.
#[derive(Debug)]
pub struct MfrSolver<'g> {
    graph: &'g ConflictGraph,
    zobrist: ZobristTable,
    memo: Memo,
    options: MfrOptions,
    deadline: Instant,
    incumbent: Option<Removed>,
    budget_hit: bool,
    stats: SolverStats,
}

impl<'g> MfrSolver<'g> {
    #[must_use]
    pub fn new(graph: &'g ConflictGraph, options: MfrOptions) -> Self {
        Self {
            graph,
            zobrist: ZobristTable::new(graph, options.zobrist_seed),
            memo: Memo::default(),
            options,
            deadline: Instant::now() + options.timeout,
            incumbent: None,
            budget_hit: false,
            stats: SolverStats::default(),
        }
    }

    /// Find a minimum removal set.
    ///
    /// # Errors
    ///
    /// [`MfrTimeout`] when the deadline expired and even the greedy
    /// completion could not finish inside a second allowance.
    pub fn solve(&mut self) -> Result<MfrOutcome, MfrTimeout> {
        let mut removed = Removed::new();
        let value = self.search(&mut removed, 0, 0, usize::MAX);

        if !self.budget_hit {
            let removed = self.incumbent.clone().unwrap_or_default();
            debug_assert_eq!(removed.len(), value, "incumbent must realise the optimum");
            tracing::debug!(optimum = value, "exact minimum fragment removal");
            return Ok(MfrOutcome {
                removed,
                optimum: value,
                heuristic: false,
            });
        }

        let mut removed = self.incumbent.clone().unwrap_or_default();
        self.greedy_complete(&mut removed)?;
        tracing::debug!(
            size = removed.len(),
            "removal budget exhausted, falling back to greedy completion"
        );
        Ok(MfrOutcome {
            optimum: removed.len(),
            removed,
            heuristic: true,
        })
    }

    /// Value of the best removal set containing `forced`.
    ///
    /// This is the fragment-intersection probe: the search starts from
    /// `{forced}` and shares this solver's memo and deadline.
    pub fn solve_forced(&mut self, forced: ReadId) -> usize {
        let mut removed: Removed = [forced].into_iter().collect();
        let hash = self.zobrist.key(forced);
        self.search(&mut removed, hash, 0, usize::MAX)
    }

    #[must_use]
    pub const fn budget_exceeded(&self) -> bool {
        self.budget_hit
    }

    #[must_use]
    pub const fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Best feasible removal set seen so far, if any.
    #[must_use]
    pub const fn incumbent(&self) -> Option<&Removed> {
        self.incumbent.as_ref()
    }

    fn search(&mut self, removed: &mut Removed, hash: u64, depth: usize, best: usize) -> usize {
        if self.budget_hit {
            return PRUNED;
        }
        self.stats.invocations += 1;
        if !removed.is_empty() {
            self.stats.removal_invocations += 1;
        }

        if removed.len() >= best {
            return PRUNED;
        }

        let Some(cycle) = odd_cycle(self.graph, removed) else {
            // Feasible: the graph minus `removed` is bipartite.
            if self
                .incumbent
                .as_ref()
                .map_or(true, |incumbent| removed.len() < incumbent.len())
            {
                self.incumbent = Some(removed.clone());
            }
            return removed.len();
        };

        if depth >= self.options.max_branch_depth || Instant::now() >= self.deadline {
            self.budget_hit = true;
            return PRUNED;
        }

        if let Some(value) = self.memo.lookup(hash, removed) {
            self.stats.memo_hits += 1;
            return value;
        }

        let mut n = best;
        for vertex in cycle {
            removed.insert(vertex);
            n = n.min(self.search(removed, hash ^ self.zobrist.key(vertex), depth + 1, n));
            removed.remove(&vertex);
        }

        // Keyed by the pre-branch state, the same key the lookup used.
        if !self.budget_hit {
            self.memo.store(hash, removed.clone(), n);
        }
        n
    }

    /// Extend `removed` until no odd cycle survives, deleting the
    /// highest-degree vertex of each successive witness.
    fn greedy_complete(&self, removed: &mut Removed) -> Result<(), MfrTimeout> {
        let hard_deadline = self.deadline + self.options.timeout;
        for _ in 0..=self.graph.len() {
            if Instant::now() >= hard_deadline {
                return Err(MfrTimeout);
            }
            let Some(cycle) = odd_cycle(self.graph, removed) else {
                return Ok(());
            };
            let vertex = cycle
                .into_iter()
                .max_by_key(|&v| self.graph.degree(v))
                .expect("odd cycles are never empty");
            removed.insert(vertex);
        }
        unreachable!("odd-cycle deletion terminates within |V| rounds");
    }
}
