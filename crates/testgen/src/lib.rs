//! Synthetic diploid read sets with ground-truth haplotype labels.

pub mod generator;

pub use generator::{generate_mult_read_sets, generate_read_set, DiploidParams, ReadSet};
