//! Odd-cycle search.
//!
//! A depth-first search that either produces an odd cycle of the conflict
//! graph minus a removed set, or proves the remainder bipartite. Each
//! visited vertex records its DFS depth and parent; a non-tree edge whose
//! endpoints' depths differ by an even amount closes a cycle of odd
//! length (the edge itself plus an even tree path).
//!
//! # Extraction
//!
//! On a witness edge `(c, nb)` the search walks parents from `c` (giving
//! the path `c..root`) and from `nb`'s parent (`p(nb)..root`). In an
//! undirected DFS every non-tree edge joins a vertex to one of its
//! ancestors, so the shorter walk is a suffix of the longer one; dropping
//! that common suffix and reversing the rest yields the cycle
//! `nb, .., c` in traversal order.

use hashbrown::HashMap;
use hashbrown::HashSet;

use super::conflict::ConflictGraph;
use crate::sequence::ReadId;

/// An odd cycle as a vertex sequence; consecutive vertices (and the
/// last/first pair) are adjacent.
pub type Cycle = Vec<ReadId>;

/// Depth and parent of each visited vertex.
type Visited = HashMap<ReadId, (u32, Option<ReadId>)>;

/// Find an odd cycle in `graph` minus `removed`, or `None` if the
/// remainder is bipartite.
///
/// Roots are tried in ascending id order and neighbours are iterated in
/// ascending order, so the witness returned for a given graph/removed
/// pair is always the same one. Recursion depth is bounded by the number
/// of live vertices.
#[must_use]
pub fn odd_cycle(graph: &ConflictGraph, removed: &HashSet<ReadId>) -> Option<Cycle> {
    let mut visited = Visited::default();
    for root in graph.vertices() {
        if removed.contains(&root) || visited.contains_key(&root) {
            continue;
        }
        if let Some(cycle) = dfs(graph, &mut visited, removed, None, root, 0) {
            return Some(cycle);
        }
    }
    None
}

fn dfs(
    graph: &ConflictGraph,
    visited: &mut Visited,
    removed: &HashSet<ReadId>,
    parent: Option<ReadId>,
    current: ReadId,
    depth: u32,
) -> Option<Cycle> {
    if removed.contains(&current) {
        return None;
    }

    visited.insert(current, (depth, parent));
    let next_depth = depth + 1;

    let neighbours = graph
        .neighbours(current)
        .expect("DFS only visits graph vertices");
    for &nb in neighbours {
        if let Some(&(nb_depth, nb_parent)) = visited.get(&nb) {
            if (next_depth - nb_depth) % 2 == 1 {
                let down = walk_up(visited, Some(current));
                let up = walk_up(visited, nb_parent);
                return Some(merge(down, up));
            }
        } else if let Some(cycle) = dfs(graph, visited, removed, Some(current), nb, next_depth) {
            return Some(cycle);
        }
    }

    None
}

/// Parent chain from `start` up to the DFS root, inclusive.
fn walk_up(visited: &Visited, start: Option<ReadId>) -> Vec<ReadId> {
    let mut path = Vec::new();
    let mut cursor = start;
    while let Some(vertex) = cursor {
        path.push(vertex);
        cursor = visited[&vertex].1;
    }
    path
}

/// Strip the shared root-side suffix and reverse into cycle order.
fn merge(a: Vec<ReadId>, b: Vec<ReadId>) -> Cycle {
    let (longer, shorter_len) = if a.len() < b.len() {
        (b, a.len())
    } else {
        (a, b.len())
    };
    let keep = longer.len() - shorter_len;
    longer[..keep].iter().rev().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: &[(ReadId, ReadId)]) -> ConflictGraph {
        let mut graph = ConflictGraph::default();
        for &(u, v) in edges {
            graph.connect(u, v);
        }
        graph
    }

    fn assert_valid_odd_cycle(graph: &ConflictGraph, cycle: &[ReadId]) {
        assert!(cycle.len() >= 3);
        assert_eq!(cycle.len() % 2, 1, "cycle must have odd length");
        for i in 0..cycle.len() {
            let u = cycle[i];
            let v = cycle[(i + 1) % cycle.len()];
            assert!(graph.has_edge(u, v), "({u}, {v}) must be an edge");
        }
    }

    #[test]
    fn triangle_is_found() {
        let graph = graph_of(&[(0, 1), (1, 2), (0, 2)]);
        let cycle = odd_cycle(&graph, &HashSet::new()).expect("triangle has an odd cycle");
        assert_valid_odd_cycle(&graph, &cycle);
        assert_eq!(cycle.len(), 3);
    }

    #[test]
    fn even_cycle_is_bipartite() {
        let graph = graph_of(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert!(odd_cycle(&graph, &HashSet::new()).is_none());
    }

    #[test]
    fn five_cycle_with_chords_gives_a_valid_witness() {
        let graph = graph_of(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2)]);
        let cycle = odd_cycle(&graph, &HashSet::new()).expect("odd cycle expected");
        assert_valid_odd_cycle(&graph, &cycle);
    }

    #[test]
    fn removal_restores_bipartiteness() {
        let graph = graph_of(&[(0, 1), (1, 2), (0, 2)]);
        for v in 0..3 {
            let removed: HashSet<ReadId> = [v].into_iter().collect();
            assert!(
                odd_cycle(&graph, &removed).is_none(),
                "triangle minus {v} is an edge",
            );
        }
    }

    #[test]
    fn disjoint_components_are_all_searched() {
        // Square (bipartite) plus a far-away triangle.
        let graph = graph_of(&[(0, 1), (1, 2), (2, 3), (3, 0), (7, 8), (8, 9), (7, 9)]);
        let cycle = odd_cycle(&graph, &HashSet::new()).expect("triangle component");
        assert_valid_odd_cycle(&graph, &cycle);
        assert!(cycle.iter().all(|&v| v >= 7));
    }

    #[test]
    fn odd_cycle_through_a_tail() {
        // A path 0-1-2 feeding a triangle 2-3-4.
        let graph = graph_of(&[(0, 1), (1, 2), (2, 3), (3, 4), (2, 4)]);
        let cycle = odd_cycle(&graph, &HashSet::new()).expect("triangle behind the tail");
        assert_valid_odd_cycle(&graph, &cycle);
        assert_eq!(cycle.len(), 3);
    }

    #[test]
    fn empty_and_removed_graphs_are_bipartite() {
        let graph = ConflictGraph::default();
        assert!(odd_cycle(&graph, &HashSet::new()).is_none());

        let graph = graph_of(&[(0, 1), (1, 2), (0, 2)]);
        let removed: HashSet<ReadId> = (0..3).collect();
        assert!(odd_cycle(&graph, &removed).is_none());
    }
}
