//! Progressive multiple sequence alignment.
//!
//! [`ProgressiveAligner`] implements the core's `MsaEngine` seam: reads
//! are folded into a growing profile one at a time. Each new read is
//! globally aligned against the profile's column consensus; matches and
//! substitutions consume an existing column, deletions place a gap in
//! the new row, and insertions splice a fresh all-gap column through
//! every previously placed row. The result is the row-major MSA the
//! partitioner consumes: one gapped row per read, all the same length,
//! row `i` belonging to read `i`.
//!
//! Like the partial-order aligners it stands in for, the profile is
//! order-sensitive; the caller's read order is canonical.

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;
use haplopart_core::msa::{MsaEngine, MsaParams, GAP};
use haplopart_core::sequence::Sequence;
use std::collections::BTreeMap;

/// Engine failures. Alignment itself cannot fail; only unusable scoring
/// parameters are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The gap penalty must be negative.
    NonNegativeGap(i32),
    /// The match score must be positive.
    NonPositiveMatch(i32),
}

/// Profile-based progressive MSA engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressiveAligner;

impl ProgressiveAligner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MsaEngine for ProgressiveAligner {
    type Error = Error;

    fn align(
        &self,
        sequences: &[Sequence],
        params: &MsaParams,
    ) -> Result<Vec<String>, Self::Error> {
        if params.gap >= 0 {
            return Err(Error::NonNegativeGap(params.gap));
        }
        if params.match_score <= 0 {
            return Err(Error::NonPositiveMatch(params.match_score));
        }

        let mut rows: Vec<Vec<u8>> = Vec::with_capacity(sequences.len());
        for sequence in sequences {
            add_to_profile(&mut rows, sequence.data.as_bytes(), params);
        }
        tracing::debug!(
            reads = rows.len(),
            width = rows.first().map_or(0, Vec::len),
            "profile alignment complete",
        );

        Ok(rows
            .into_iter()
            .map(|row| String::from_utf8(row).expect("alignment rows are ASCII"))
            .collect())
    }
}

/// Align one read against the profile consensus and fold it in.
fn add_to_profile(rows: &mut Vec<Vec<u8>>, read: &[u8], params: &MsaParams) {
    if rows.is_empty() {
        rows.push(read.to_vec());
        return;
    }

    let profile = consensus(rows);
    let score = |a: u8, b: u8| {
        if a == b {
            params.match_score
        } else {
            params.mismatch
        }
    };
    let mut aligner =
        Aligner::with_capacity(read.len(), profile.len(), params.gap, params.gap, &score);
    let alignment = aligner.global(read, &profile);

    // Walk the operations once, building the new row in final column
    // order and noting where fresh columns must be spliced into the old
    // rows (keyed by the profile column they precede).
    let mut new_row = Vec::with_capacity(profile.len());
    let mut inserts: BTreeMap<usize, usize> = BTreeMap::new();
    let mut read_pos = 0;
    let mut profile_pos = 0;
    for op in &alignment.operations {
        match op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                new_row.push(read[read_pos]);
                read_pos += 1;
                profile_pos += 1;
            }
            AlignmentOperation::Del => {
                new_row.push(GAP);
                profile_pos += 1;
            }
            AlignmentOperation::Ins => {
                *inserts.entry(profile_pos).or_insert(0) += 1;
                new_row.push(read[read_pos]);
                read_pos += 1;
            }
            AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {
                unreachable!("global alignment does not clip")
            }
        }
    }

    if !inserts.is_empty() {
        let added: usize = inserts.values().sum();
        for row in rows.iter_mut() {
            let mut widened = Vec::with_capacity(row.len() + added);
            for (column, &base) in row.iter().enumerate() {
                if let Some(&count) = inserts.get(&column) {
                    widened.resize(widened.len() + count, GAP);
                }
                widened.push(base);
            }
            if let Some(&count) = inserts.get(&row.len()) {
                widened.resize(widened.len() + count, GAP);
            }
            *row = widened;
        }
    }

    debug_assert!(rows.iter().all(|row| row.len() == new_row.len()));
    rows.push(new_row);
}

/// Majority base per column, gaps excluded.
fn consensus(rows: &[Vec<u8>]) -> Vec<u8> {
    let width = rows.first().map_or(0, Vec::len);
    let mut profile = Vec::with_capacity(width);
    for column in 0..width {
        let mut counts = [0_u32; 4];
        for row in rows {
            match row[column] {
                b'A' => counts[0] += 1,
                b'C' => counts[1] += 1,
                b'G' => counts[2] += 1,
                b'T' => counts[3] += 1,
                _ => {}
            }
        }
        let best = (0..4).max_by_key(|&i| counts[i]).unwrap_or(0);
        profile.push(if counts[best] == 0 {
            GAP
        } else {
            [b'A', b'C', b'G', b'T'][best]
        });
    }
    profile
}
