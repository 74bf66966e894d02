//! haplopart CLI -- partition diploid read sets into haplotypes.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use haplopart_core::UnphasedPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "haplopart",
    about = "Diploid read partitioning for long-read assembly"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Partition reads into two haplotype sets
    Partition(PartitionArgs),
    /// Generate synthetic diploid read sets with ground truth
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
pub struct PartitionArgs {
    /// Input reads in FASTA/FASTQ format (optionally gzip-compressed)
    pub input: PathBuf,
    /// Score for matching bases
    #[arg(short = 'm', long = "match", default_value_t = 3)]
    pub match_score: i32,
    /// Score for mismatching bases
    #[arg(short = 'n', long, default_value_t = -5, allow_hyphen_values = true)]
    pub mismatch: i32,
    /// Gap penalty (must be negative)
    #[arg(short = 'g', long, default_value_t = -4, allow_hyphen_values = true)]
    pub gap: i32,
    /// Number of threads
    #[arg(short = 't', long, default_value_t = 1)]
    pub threads: usize,
    /// Minimum column depth for a heterozygous site
    #[arg(long, default_value_t = 5)]
    pub min_depth: u32,
    /// Maximum tolerated per-column error share
    #[arg(long, default_value_t = 0.10)]
    pub max_err: f64,
    /// Minimum secondary-allele share per column
    #[arg(long, default_value_t = 0.30)]
    pub min_secondary: f64,
    /// Branch-and-bound recursion cap
    #[arg(long, default_value_t = 64)]
    pub max_branch_depth: usize,
    /// Removal-solver wall-clock budget, in seconds
    #[arg(long, default_value_t = 30)]
    pub mfr_timeout: u64,
    /// Where reads without allele signal go
    #[arg(long, value_enum, default_value_t = UnphasedMode::H0)]
    pub unphased: UnphasedMode,
    /// Fixed Zobrist seed for reproducible runs
    #[arg(long)]
    pub zobrist_seed: Option<u64>,
    /// Output directory for the haplotype FASTA files
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnphasedMode {
    /// Fold into the first haplotype output
    H0,
    /// Duplicate into both haplotype outputs
    Both,
    /// Keep in a separate unphased output
    Separate,
}

impl From<UnphasedMode> for UnphasedPolicy {
    fn from(mode: UnphasedMode) -> Self {
        match mode {
            UnphasedMode::H0 => Self::FirstHaplotype,
            UnphasedMode::Both => Self::BothHaplotypes,
            UnphasedMode::Separate => Self::Separate,
        }
    }
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of read sets to generate
    #[arg(long)]
    pub n_sets: u64,
    /// Number of reads per set
    #[arg(long, default_value_t = 20)]
    pub n_reads: u64,
    /// Length of the covered region
    #[arg(long, default_value_t = 1000)]
    pub region_len: u64,
    /// Number of planted heterozygous sites
    #[arg(long, default_value_t = 5)]
    pub n_sites: u64,
    /// Per-base substitution error rate
    #[arg(long, default_value_t = 0.0)]
    pub error_rate: f64,
    /// Generation seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Output directory for the read sets and truth sidecars
    #[arg(long)]
    pub output_dir: PathBuf,
}
