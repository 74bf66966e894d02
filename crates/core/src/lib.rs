//! Diploid read partitioning.
//!
//! `haplopart_core` decides, for each noisy long read covering a diploid
//! region, which of the two haplotypes it came from. The pipeline:
//!
//! 1. **MSA** -- an external engine (behind the [`MsaEngine`] trait)
//!    aligns all reads into equal-length gapped rows.
//! 2. **SNP discovery** -- every column is reduced to base counts; the
//!    columns where a secondary allele is too common to be noise become
//!    heterozygous sites, and each read gets a signed indicator per site
//!    (`+1` primary, `-1` secondary, `0` neither).
//! 3. **Conflict graph** -- reads whose indicators cancel at some site
//!    carry opposite alleles and are joined by an edge.
//! 4. **Minimum fragment removal** -- a branch-and-bound search over
//!    odd-cycle certificates (with Zobrist-hashed memoization) finds the
//!    smallest vertex set whose removal makes the graph bipartite;
//!    fragment intersection deletes the reads that lie in some minimum
//!    removal set and iterates.
//! 5. **Bipartition** -- two-colouring the bipartite remainder assigns
//!    each surviving read to a haplotype set.
//!
//! # Entry points
//!
//! [`partition()`] consumes owned sequences and returns a [`Partition`]
//! of owned haplotype sets; [`partition_reads()`] is the id-level variant
//! for callers that keep ownership.
//!
//! ```rust,ignore
//! use haplopart_core::{partition, PartitionOptions};
//!
//! let result = partition(sequences, &engine, &PartitionOptions::default())?;
//! eprintln!("H0: {} reads, H1: {} reads", result.h0.len(), result.h1.len());
//! ```
//!
//! # Determinism
//!
//! Graph adjacency is ordered and search roots ascend by read id, so a
//! fixed Zobrist seed makes the whole pipeline reproducible; without a
//! seed only the choice among equally-sized removal sets may vary.
//!
//! # Crate features
//!
//! - **`serde`** -- `Serialize`/`Deserialize` on [`Sequence`].
//! - **`parallel`** -- rayon fan-out for conflict-pair scanning and the
//!   per-vertex probes of fragment intersection.

pub mod column;
pub mod error;
pub mod graph;
pub mod mfr;
pub mod msa;
pub mod partition;
pub mod sequence;
pub mod snp;

pub use error::Error;
pub use msa::{MsaEngine, MsaParams};
pub use partition::{partition, partition_reads, Partition, PartitionOptions, UnphasedPolicy};
pub use sequence::{ReadId, Sequence};
