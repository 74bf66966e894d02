//! Fragment intersection.
//!
//! Repeatedly identifies reads that lie in some minimum removal set and
//! deletes them from the conflict graph. One round computes the optimum
//! `s = Optima(G, ∅)`, then probes `s_v = Optima(G, {v})` for every
//! vertex: forcing `v` into the removal set without raising the cost
//! means some optimum contains `v`. The probing round's deletion set is
//! removed wholesale and the procedure re-runs until the optimum reaches
//! zero, at which point the remaining graph is bipartite.
//!
//! When the solver budget trips, the feasible removal set the solver
//! already holds is deleted instead and the outcome is flagged heuristic.

use super::solver::MfrSolver;
use super::{MfrOptions, MfrTimeout};
use crate::graph::ConflictGraph;
use crate::sequence::ReadId;

/// Result of reducing a conflict graph to bipartiteness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionOutcome {
    /// Reads deleted from the graph, in deletion order.
    pub deleted: Vec<ReadId>,
    /// The initial removal optimum `Optima(G, ∅)`.
    pub optimum: usize,
    /// Whether any round fell back to a heuristic removal set.
    pub heuristic: bool,
}

/// Reduce `graph` to a bipartite remainder, returning the deleted reads.
///
/// # Errors
///
/// Propagates [`MfrTimeout`] from the solver.
pub fn fragment_intersection(
    graph: &mut ConflictGraph,
    options: MfrOptions,
) -> Result<IntersectionOutcome, MfrTimeout> {
    let mut deleted = Vec::new();
    let mut heuristic = false;
    let mut first_optimum = None;

    loop {
        let mut solver = MfrSolver::new(graph, options);
        let outcome = solver.solve()?;
        first_optimum.get_or_insert(outcome.optimum);

        if outcome.optimum == 0 {
            break;
        }

        let round: Vec<ReadId> = if outcome.heuristic {
            heuristic = true;
            sorted(outcome.removed.into_iter().collect())
        } else {
            let vertices: Vec<ReadId> = graph.vertices().collect();
            let (values, probes_cut_short) = probe_all(&mut solver, graph, &vertices, options);
            if probes_cut_short {
                // The probes ran out of budget; the exact removal set
                // from the initial solve is still a valid reduction.
                heuristic = true;
                sorted(outcome.removed.into_iter().collect())
            } else {
                let in_some_optimum: Vec<ReadId> = vertices
                    .into_iter()
                    .zip(values)
                    .filter(|&(_, value)| value == outcome.optimum)
                    .map(|(vertex, _)| vertex)
                    .collect();
                assert!(
                    !in_some_optimum.is_empty(),
                    "every vertex of a minimum removal set must probe at the optimum",
                );
                in_some_optimum
            }
        };

        drop(solver);
        tracing::debug!(
            optimum = outcome.optimum,
            deleting = round.len(),
            remaining = graph.len(),
            "fragment intersection round",
        );
        for &vertex in &round {
            graph.remove_vertex(vertex);
        }
        deleted.extend(round);

        if heuristic {
            break;
        }
    }

    debug_assert!(graph.is_symmetric());
    Ok(IntersectionOutcome {
        deleted,
        optimum: first_optimum.unwrap_or(0),
        heuristic,
    })
}

fn sorted(mut vertices: Vec<ReadId>) -> Vec<ReadId> {
    vertices.sort_unstable();
    vertices
}

/// Probe every vertex sequentially, sharing the round solver's memo.
#[cfg(not(feature = "parallel"))]
fn probe_all(
    solver: &mut MfrSolver<'_>,
    _graph: &ConflictGraph,
    vertices: &[ReadId],
    _options: MfrOptions,
) -> (Vec<usize>, bool) {
    let values = vertices
        .iter()
        .map(|&vertex| solver.solve_forced(vertex))
        .collect();
    (values, solver.budget_exceeded())
}

/// Probe every vertex in parallel. Each probe is pure over the shared
/// graph, with its own solver state, so the fan-out is deterministic.
#[cfg(feature = "parallel")]
fn probe_all(
    _solver: &mut MfrSolver<'_>,
    graph: &ConflictGraph,
    vertices: &[ReadId],
    options: MfrOptions,
) -> (Vec<usize>, bool) {
    use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

    let probes: Vec<(usize, bool)> = vertices
        .par_iter()
        .map(|&vertex| {
            let mut probe = MfrSolver::new(graph, options);
            let value = probe.solve_forced(vertex);
            (value, probe.budget_exceeded())
        })
        .collect();

    let cut_short = probes.iter().any(|&(_, over_budget)| over_budget);
    (probes.into_iter().map(|(value, _)| value).collect(), cut_short)
}
