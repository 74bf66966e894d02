//! Fragment conflict graph.
//!
//! Vertices are reads with at least one nonzero SNP entry; an undirected
//! edge connects two reads that carry opposite alleles at some
//! heterozygous column (`+1` against `-1`). Adjacency is kept in ordered
//! maps so every traversal of the graph is deterministic regardless of
//! build order.

// Ordered adjacency: traversal order must not depend on hasher state.
use std::collections::{BTreeMap, BTreeSet};

use crate::sequence::ReadId;
use crate::snp::SnpMatrix;

/// Undirected conflict graph over read ids.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConflictGraph {
    adj: BTreeMap<ReadId, BTreeSet<ReadId>>,
}

impl ConflictGraph {
    /// Insert a vertex with no incident edges.
    pub fn add_vertex(&mut self, vertex: ReadId) {
        self.adj.entry(vertex).or_default();
    }

    /// Insert the undirected edge `(u, v)`.
    ///
    /// # Panics
    ///
    /// Self-loops are meaningless here and abort.
    pub fn connect(&mut self, u: ReadId, v: ReadId) {
        assert_ne!(u, v, "conflict graph does not admit self-loops");
        self.adj.entry(u).or_default().insert(v);
        self.adj.entry(v).or_default().insert(u);
    }

    /// Delete a vertex and all its incident edges, keeping symmetry.
    pub fn remove_vertex(&mut self, vertex: ReadId) {
        if let Some(neighbours) = self.adj.remove(&vertex) {
            for neighbour in neighbours {
                if let Some(back) = self.adj.get_mut(&neighbour) {
                    back.remove(&vertex);
                }
            }
        }
    }

    #[must_use]
    pub fn contains(&self, vertex: ReadId) -> bool {
        self.adj.contains_key(&vertex)
    }

    #[must_use]
    pub fn has_edge(&self, u: ReadId, v: ReadId) -> bool {
        self.adj.get(&u).is_some_and(|n| n.contains(&v))
    }

    /// Neighbours of `vertex`, or `None` for an unknown vertex.
    #[must_use]
    pub fn neighbours(&self, vertex: ReadId) -> Option<&BTreeSet<ReadId>> {
        self.adj.get(&vertex)
    }

    #[must_use]
    pub fn degree(&self, vertex: ReadId) -> usize {
        self.adj.get(&vertex).map_or(0, BTreeSet::len)
    }

    /// Vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = ReadId> + '_ {
        self.adj.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adj.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adj.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Whether every edge has its mirror image.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.adj.iter().all(|(&u, neighbours)| {
            neighbours.iter().all(|&v| self.has_edge(v, u))
        })
    }

    /// Build the graph from a SNP matrix.
    ///
    /// Every read with allele signal becomes a vertex; each unordered
    /// pair is scanned in lockstep and connected on the first column
    /// where their entries cancel. One witness suffices, so the scan
    /// stops there.
    #[must_use]
    pub fn from_snp_matrix(matrix: &SnpMatrix) -> Self {
        let mut graph = Self::default();
        #[allow(clippy::cast_possible_truncation)]
        let informative: Vec<ReadId> = (0..matrix.n_reads() as ReadId)
            .filter(|&read| matrix.is_informative(read))
            .collect();

        for &read in &informative {
            graph.add_vertex(read);
        }

        for (u, v) in conflicting_pairs(matrix, &informative) {
            graph.connect(u, v);
        }

        debug_assert!(graph.is_symmetric());
        graph
    }
}

/// Whether two indicator rows cancel at some column.
fn conflicts(a: &[i8], b: &[i8]) -> bool {
    a.iter().zip(b).any(|(&x, &y)| x != 0 && x + y == 0)
}

#[cfg(not(feature = "parallel"))]
fn conflicting_pairs(matrix: &SnpMatrix, ids: &[ReadId]) -> Vec<(ReadId, ReadId)> {
    let mut edges = Vec::new();
    for (i, &u) in ids.iter().enumerate() {
        for &v in &ids[i + 1..] {
            if conflicts(matrix.row(u), matrix.row(v)) {
                edges.push((u, v));
            }
        }
    }
    edges
}

/// Pair scanning fans out one task per left-hand read; the per-task edge
/// lists are concatenated in task order, so the merged result is
/// identical to the sequential scan.
#[cfg(feature = "parallel")]
fn conflicting_pairs(matrix: &SnpMatrix, ids: &[ReadId]) -> Vec<(ReadId, ReadId)> {
    use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

    ids.par_iter()
        .enumerate()
        .map(|(i, &u)| {
            ids[i + 1..]
                .iter()
                .filter(|&&v| conflicts(matrix.row(u), matrix.row(v)))
                .map(|&v| (u, v))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_is_symmetric() {
        let mut graph = ConflictGraph::default();
        graph.connect(1, 2);
        graph.connect(2, 3);
        assert!(graph.has_edge(2, 1));
        assert!(graph.has_edge(3, 2));
        assert!(!graph.has_edge(1, 3));
        assert!(graph.is_symmetric());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn remove_vertex_clears_back_references() {
        let mut graph = ConflictGraph::default();
        graph.connect(0, 1);
        graph.connect(0, 2);
        graph.remove_vertex(0);
        assert!(!graph.contains(0));
        assert!(graph.contains(1));
        assert_eq!(graph.degree(1), 0);
        assert_eq!(graph.degree(2), 0);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn cancellation_is_the_edge_predicate() {
        // Reads 0/1 cancel at column 0; read 2 opposes nobody (zeros
        // never cancel); read 3 carries signal but agrees with read 0.
        let matrix = SnpMatrix::from_rows(vec![
            vec![1, 0],
            vec![-1, 0],
            vec![0, 0],
            vec![1, 1],
        ]);
        let graph = ConflictGraph::from_snp_matrix(&matrix);
        assert!(graph.has_edge(0, 1));
        assert!(!graph.has_edge(0, 3));
        assert!(!graph.contains(2));
        // Signal without conflicts still makes a vertex.
        assert!(graph.contains(3));
        assert_eq!(graph.degree(3), 0);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn clean_diploid_split_is_complete_bipartite() {
        let matrix = SnpMatrix::from_rows(vec![
            vec![1, 1, 1],
            vec![1, 1, 1],
            vec![-1, -1, -1],
            vec![-1, -1, -1],
        ]);
        let graph = ConflictGraph::from_snp_matrix(&matrix);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 4);
        for u in 0..2 {
            for v in 2..4 {
                assert!(graph.has_edge(u, v));
            }
        }
        assert!(!graph.has_edge(0, 1));
        assert!(!graph.has_edge(2, 3));
    }
}
