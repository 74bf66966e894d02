//! The partitioning pipeline.
//!
//! Drives the full chain: align reads through the external engine, build
//! the SNP matrix, assemble the conflict graph, reduce it to a bipartite
//! remainder via fragment intersection, and two-colour the result into
//! the two haplotype sets.
//!
//! # Data flow
//!
//! ```text
//! reads -> MSA rows -> SNP matrix -> conflict graph
//!       -> fragment intersection -> two-colouring -> (H0, H1)
//! ```
//!
//! MSA rows are dropped as soon as the SNP matrix exists, and the matrix
//! as soon as the conflict graph exists; only the graph lives through the
//! solver stages.

use std::collections::VecDeque;

use hashbrown::HashMap;
use hashbrown::HashSet;

use crate::column::SnpThresholds;
use crate::error::Error;
use crate::graph::ConflictGraph;
use crate::mfr::{fragment_intersection, MfrOptions, MfrTimeout};
use crate::msa::{check_rows, MsaEngine, MsaParams};
use crate::sequence::{ReadId, Sequence};
use crate::snp::SnpMatrix;

/// Where reads without any allele signal end up.
///
/// Which destination serves the surrounding pipeline best is not settled,
/// so it is a configuration point rather than a hard-coded rule.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UnphasedPolicy {
    /// Fold unphased reads into the first haplotype set.
    #[default]
    FirstHaplotype,
    /// Duplicate unphased reads into both haplotype sets.
    BothHaplotypes,
    /// Keep unphased reads in their own set.
    Separate,
}

/// Everything the pipeline needs besides the reads and the engine.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PartitionOptions {
    pub msa: MsaParams,
    pub thresholds: SnpThresholds,
    pub mfr: MfrOptions,
    pub unphased: UnphasedPolicy,
}

/// The partition at the read-id level, before any unphased policy is
/// applied.
///
/// The four id lists are pairwise disjoint, each in ascending id order,
/// and together cover `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPartition {
    /// Reads coloured 0.
    pub h0: Vec<ReadId>,
    /// Reads coloured 1.
    pub h1: Vec<ReadId>,
    /// Reads with no allele signal.
    pub unphased: Vec<ReadId>,
    /// Reads deleted by fragment intersection.
    pub ambiguous: Vec<ReadId>,
    /// The initial removal optimum.
    pub optimum: usize,
    /// Whether the solver fell back to a heuristic removal set.
    pub heuristic: bool,
}

/// The partition as owned sequences, with the unphased policy applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub h0: Vec<Sequence>,
    pub h1: Vec<Sequence>,
    pub unphased: Vec<Sequence>,
    pub ambiguous: Vec<Sequence>,
    pub optimum: usize,
    pub heuristic: bool,
}

/// Decide each read's haplotype at the id level.
///
/// Output order within every list equals input order. Reads keep their
/// dense ids, so callers can map the lists back onto their own records.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for zero sequences.
/// - [`Error::Msa`] when the engine fails.
/// - [`Error::MfrTimeout`] when the solver deadline expired without a
///   usable removal set.
///
/// # Panics
///
/// Panics when an internal invariant breaks (malformed MSA, asymmetric
/// adjacency, non-bipartite remainder); these indicate bugs, not input
/// conditions.
#[allow(clippy::cast_possible_truncation)]
pub fn partition_reads<E: MsaEngine>(
    sequences: &[Sequence],
    engine: &E,
    options: &PartitionOptions,
) -> Result<ReadPartition, Error<E::Error>> {
    if sequences.is_empty() {
        return Err(Error::EmptyInput);
    }

    tracing::info!(reads = sequences.len(), "aligning sequences");
    let rows = engine.align(sequences, &options.msa)?;
    check_rows(&rows, sequences.len());

    let matrix = SnpMatrix::build(&rows, &options.thresholds);
    drop(rows);
    tracing::info!(sites = matrix.width(), "built SNP matrix");

    let n_reads = sequences.len() as ReadId;
    if matrix.width() == 0 {
        tracing::debug!("no heterozygous columns; every read is unphased");
        return Ok(ReadPartition {
            h0: Vec::new(),
            h1: Vec::new(),
            unphased: (0..n_reads).collect(),
            ambiguous: Vec::new(),
            optimum: 0,
            heuristic: false,
        });
    }

    tracing::info!("building fragment conflict graph");
    let mut graph = ConflictGraph::from_snp_matrix(&matrix);
    drop(matrix);
    tracing::debug!(
        vertices = graph.len(),
        edges = graph.edge_count(),
        "conflict graph ready",
    );

    let reduction =
        fragment_intersection(&mut graph, options.mfr).map_err(|MfrTimeout| Error::MfrTimeout)?;
    tracing::info!(optimum = reduction.optimum, "MFR optimum");

    let colours = two_colour(&graph);
    let deleted: HashSet<ReadId> = reduction.deleted.iter().copied().collect();

    let mut h0 = Vec::new();
    let mut h1 = Vec::new();
    let mut unphased = Vec::new();
    let mut ambiguous = Vec::new();
    for id in 0..n_reads {
        if deleted.contains(&id) {
            ambiguous.push(id);
        } else if let Some(&colour) = colours.get(&id) {
            if colour == 0 {
                h0.push(id);
            } else {
                h1.push(id);
            }
        } else {
            unphased.push(id);
        }
    }

    Ok(ReadPartition {
        h0,
        h1,
        unphased,
        ambiguous,
        optimum: reduction.optimum,
        heuristic: reduction.heuristic,
    })
}

/// Partition owned sequences into haplotype sets.
///
/// Applies the configured [`UnphasedPolicy`] while materialising the
/// id-level result of [`partition_reads`]. Under the duplicating policy
/// unphased reads appear in both haplotype outputs; under every other
/// policy each read appears in exactly one list.
///
/// # Errors
///
/// Same as [`partition_reads`].
pub fn partition<E: MsaEngine>(
    sequences: Vec<Sequence>,
    engine: &E,
    options: &PartitionOptions,
) -> Result<Partition, Error<E::Error>> {
    let plan = partition_reads(&sequences, engine, options)?;

    enum Slot {
        H0,
        H1,
        Unphased,
        Ambiguous,
    }

    let mut slots: HashMap<ReadId, Slot> = HashMap::with_capacity(sequences.len());
    for &id in &plan.h0 {
        slots.insert(id, Slot::H0);
    }
    for &id in &plan.h1 {
        slots.insert(id, Slot::H1);
    }
    for &id in &plan.unphased {
        slots.insert(id, Slot::Unphased);
    }
    for &id in &plan.ambiguous {
        slots.insert(id, Slot::Ambiguous);
    }

    let mut h0 = Vec::new();
    let mut h1 = Vec::new();
    let mut unphased = Vec::new();
    let mut ambiguous = Vec::new();
    #[allow(clippy::cast_possible_truncation)]
    for (id, sequence) in sequences.into_iter().enumerate() {
        match slots[&(id as ReadId)] {
            Slot::H0 => h0.push(sequence),
            Slot::H1 => h1.push(sequence),
            Slot::Ambiguous => ambiguous.push(sequence),
            Slot::Unphased => match options.unphased {
                UnphasedPolicy::FirstHaplotype => h0.push(sequence),
                UnphasedPolicy::BothHaplotypes => {
                    h1.push(sequence.clone());
                    h0.push(sequence);
                }
                UnphasedPolicy::Separate => unphased.push(sequence),
            },
        }
    }

    Ok(Partition {
        h0,
        h1,
        unphased,
        ambiguous,
        optimum: plan.optimum,
        heuristic: plan.heuristic,
    })
}

/// Two-colour the bipartite remainder.
///
/// Components are explored from their lowest-id vertex, which is always
/// coloured 0, so the colouring is deterministic and idempotent.
fn two_colour(graph: &ConflictGraph) -> HashMap<ReadId, u8> {
    let mut colours: HashMap<ReadId, u8> = HashMap::with_capacity(graph.len());
    for root in graph.vertices() {
        if colours.contains_key(&root) {
            continue;
        }
        colours.insert(root, 0);
        let mut queue = VecDeque::from([root]);
        while let Some(vertex) = queue.pop_front() {
            let colour = colours[&vertex];
            let neighbours = graph
                .neighbours(vertex)
                .expect("queued vertices are in the graph");
            for &nb in neighbours {
                if let Some(&seen) = colours.get(&nb) {
                    assert_ne!(
                        seen, colour,
                        "conflict graph must be bipartite after fragment intersection",
                    );
                } else {
                    colours.insert(nb, 1 - colour);
                    queue.push_back(nb);
                }
            }
        }
    }
    colours
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Engine for reads that are already the same length: returns them
    /// unchanged as their own alignment rows.
    struct PreAligned;

    impl MsaEngine for PreAligned {
        type Error = core::convert::Infallible;

        fn align(
            &self,
            sequences: &[Sequence],
            _params: &MsaParams,
        ) -> Result<Vec<String>, Self::Error> {
            Ok(sequences.iter().map(|s| s.data.clone()).collect())
        }
    }

    fn reads(data: &[&str]) -> Vec<Sequence> {
        data.iter()
            .enumerate()
            .map(|(i, &d)| Sequence::new(format!("r{i}"), d.to_owned()))
            .collect()
    }

    fn options() -> PartitionOptions {
        PartitionOptions {
            mfr: MfrOptions {
                zobrist_seed: Some(23),
                ..MfrOptions::default()
            },
            ..PartitionOptions::default()
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = partition_reads(&[], &PreAligned, &options());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn single_read_folds_into_the_first_haplotype() {
        let partition = partition(reads(&["ACGTACGT"]), &PreAligned, &options())
            .expect("single read partitions");
        assert_eq!(partition.h0.len(), 1);
        assert!(partition.h1.is_empty());
        assert!(partition.unphased.is_empty());
        assert_eq!(partition.optimum, 0);
    }

    #[test]
    fn identical_reads_carry_no_signal() {
        let plan = partition_reads(&reads(&["ACGT"; 6]), &PreAligned, &options())
            .expect("identical reads partition");
        assert!(plan.h0.is_empty());
        assert!(plan.h1.is_empty());
        assert_eq!(plan.unphased, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(plan.optimum, 0);
    }

    #[test]
    fn unphased_policies_route_reads_as_configured() {
        let input = reads(&["ACGT"; 4]);

        let separate = partition(
            input.clone(),
            &PreAligned,
            &PartitionOptions {
                unphased: UnphasedPolicy::Separate,
                ..options()
            },
        )
        .expect("partition");
        assert!(separate.h0.is_empty() && separate.h1.is_empty());
        assert_eq!(separate.unphased.len(), 4);

        let both = partition(
            input,
            &PreAligned,
            &PartitionOptions {
                unphased: UnphasedPolicy::BothHaplotypes,
                ..options()
            },
        )
        .expect("partition");
        assert_eq!(both.h0.len(), 4);
        assert_eq!(both.h1.len(), 4);
        assert!(both.unphased.is_empty());
    }

    #[test]
    fn clean_diploid_signal_splits_two_versus_two() {
        // Two A-carriers and two T-carriers at three sites; depth 4
        // needs a lowered depth threshold.
        let input = reads(&[
            "AAACAAACAAAC",
            "AAACAAACAAAC",
            "ATACATACATAC",
            "ATACATACATAC",
        ]);
        let opts = PartitionOptions {
            thresholds: SnpThresholds {
                min_depth: 4,
                ..SnpThresholds::default()
            },
            ..options()
        };
        let plan = partition_reads(&input, &PreAligned, &opts).expect("partition");
        assert_eq!(plan.optimum, 0);
        assert_eq!(plan.h0, vec![0, 1]);
        assert_eq!(plan.h1, vec![2, 3]);
        assert!(plan.unphased.is_empty());
        assert!(plan.ambiguous.is_empty());
    }

    #[test]
    fn colouring_starts_each_component_at_its_lowest_id() {
        let mut graph = ConflictGraph::default();
        graph.connect(3, 5);
        graph.connect(5, 7);
        graph.connect(10, 11);
        let colours = two_colour(&graph);
        assert_eq!(colours[&3], 0);
        assert_eq!(colours[&5], 1);
        assert_eq!(colours[&7], 0);
        assert_eq!(colours[&10], 0);
        assert_eq!(colours[&11], 1);
    }

    #[test]
    #[should_panic(expected = "must be bipartite")]
    fn odd_remainder_aborts_colouring() {
        let mut graph = ConflictGraph::default();
        graph.connect(0, 1);
        graph.connect(1, 2);
        graph.connect(0, 2);
        let _ = two_colour(&graph);
    }
}
