//! SNP matrix construction.
//!
//! Scans the MSA column by column, keeps the columns that clear the
//! heterozygous thresholds, and encodes each read's allele at every kept
//! column as a signed indicator: `+1` for the primary base, `-1` for the
//! secondary, `0` for anything else (gap or third allele).

use crate::column::{analyze, BaseCounts, SnpThresholds};
use crate::msa::GAP;
use crate::sequence::ReadId;

/// Per-read signed indicator rows over the heterozygous columns.
///
/// Every row has the same width: the number of columns that survived
/// filtering, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnpMatrix {
    rows: Vec<Vec<i8>>,
    width: usize,
}

impl SnpMatrix {
    /// Build the matrix from row-major MSA rows.
    ///
    /// Rows must be non-ragged; [`crate::msa::check_rows`] is expected to
    /// have run first.
    #[must_use]
    pub fn build(msa: &[String], thresholds: &SnpThresholds) -> Self {
        let n_reads = msa.len();
        let width = msa.first().map_or(0, String::len);
        let mut rows = vec![Vec::new(); n_reads];
        // Running non-gap offset per read, for site-level tracing only.
        let mut offsets = vec![0_u32; n_reads];

        for col in 0..width {
            let mut counts = BaseCounts::default();
            for (row, offset) in msa.iter().zip(offsets.iter_mut()) {
                let cell = row.as_bytes()[col];
                counts.tally(cell);
                if cell != GAP {
                    *offset += 1;
                }
            }

            let info = analyze(&counts);
            if !thresholds.is_heterozygous(&info) {
                continue;
            }

            for (read, row) in msa.iter().enumerate() {
                let cell = row.as_bytes()[col];
                let entry: i8 = if cell == info.primary {
                    1
                } else if cell == info.secondary {
                    -1
                } else {
                    0
                };
                rows[read].push(entry);
                if entry != 0 {
                    tracing::trace!(
                        read,
                        offset = offsets[read],
                        base = %char::from(cell),
                        "snp site",
                    );
                }
            }
        }

        let width = rows.first().map_or(0, Vec::len);
        Self { rows, width }
    }

    /// Assemble a matrix from pre-encoded rows. All rows must share one
    /// width.
    ///
    /// # Panics
    ///
    /// Panics on ragged input.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<i8>>) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == width),
            "SNP rows must all have width {width}",
        );
        Self { rows, width }
    }

    /// Number of reads (rows).
    #[must_use]
    pub fn n_reads(&self) -> usize {
        self.rows.len()
    }

    /// Number of heterozygous columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn row(&self, read: ReadId) -> &[i8] {
        &self.rows[read as usize]
    }

    /// Whether the read carries any allele signal at all.
    #[must_use]
    pub fn is_informative(&self, read: ReadId) -> bool {
        self.row(read).iter().any(|&entry| entry != 0)
    }
}
