//! The multiple-sequence-alignment seam.
//!
//! The core does not align reads itself; it drives an external engine
//! through the [`MsaEngine`] trait and consumes the row-major result. The
//! engine contract is narrow: one gapped row per input read, all rows the
//! same length, `-` as the gap character, row `i` corresponding to
//! `sequences[i]`. The engine is order-sensitive, so the core never
//! reorders reads before handing them over.

use crate::sequence::Sequence;

/// Gap character used in MSA rows.
pub const GAP: u8 = b'-';

/// Scoring parameters passed through to the alignment engine.
///
/// The core does not interpret these; defaults match the host assembler's
/// command line (`-m 3 -n -5 -g -4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsaParams {
    /// Score for matching bases.
    pub match_score: i32,
    /// Score for mismatching bases.
    pub mismatch: i32,
    /// Gap penalty. Must be negative.
    pub gap: i32,
}

impl Default for MsaParams {
    fn default() -> Self {
        Self {
            match_score: 3,
            mismatch: -5,
            gap: -4,
        }
    }
}

/// An external multiple-sequence-alignment engine.
///
/// Implementors align all `sequences` together and return one gapped row
/// per read, in input order, all of the same length.
pub trait MsaEngine {
    /// Engine-specific failure type, propagated verbatim through
    /// [`Error::Msa`](crate::error::Error::Msa).
    type Error: core::fmt::Debug;

    /// Align `sequences` and return the row-major MSA.
    ///
    /// # Errors
    ///
    /// Returns the engine's own error when alignment fails.
    fn align(
        &self,
        sequences: &[Sequence],
        params: &MsaParams,
    ) -> Result<Vec<String>, Self::Error>;
}

/// Validate the engine contract on a freshly produced MSA.
///
/// # Panics
///
/// A malformed MSA means a bug in the engine adapter, not a recoverable
/// input condition; violations abort with a diagnostic.
pub fn check_rows(rows: &[String], n_reads: usize) {
    assert_eq!(
        rows.len(),
        n_reads,
        "MSA engine returned {} rows for {n_reads} reads",
        rows.len(),
    );
    if let Some(first) = rows.first() {
        let width = first.len();
        assert!(
            rows.iter().all(|row| row.len() == width),
            "MSA rows must all have length {width}",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_match_host_cli() {
        let params = MsaParams::default();
        assert_eq!(params.match_score, 3);
        assert_eq!(params.mismatch, -5);
        assert_eq!(params.gap, -4);
    }

    #[test]
    fn uniform_rows_pass_the_contract_check() {
        let rows = vec!["AC-T".to_owned(), "ACGT".to_owned()];
        check_rows(&rows, 2);
    }

    #[test]
    #[should_panic(expected = "MSA rows must all have length")]
    fn ragged_rows_abort() {
        let rows = vec!["ACT".to_owned(), "ACGT".to_owned()];
        check_rows(&rows, 2);
    }

    #[test]
    #[should_panic(expected = "returned 1 rows for 2 reads")]
    fn missing_rows_abort() {
        let rows = vec!["ACGT".to_owned()];
        check_rows(&rows, 2);
    }
}
