use chrono::{DateTime, Local};
use haplopart_core::sequence::Sequence;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct DiploidParams {
    pub id: u64,
    pub n_reads: u64,
    pub region_len: u64,
    pub n_sites: u64,
    #[builder(default)]
    pub error_rate: f64,
    #[builder(default)]
    pub seed: u64,
}

/// A generated read set plus the ground truth needed to score a
/// partitioning run against it.
#[derive(Deserialize, Serialize, Debug)]
pub struct ReadSet {
    params: DiploidParams,
    generated: DateTime<Local>,
    /// Planted heterozygous positions, ascending.
    sites: Vec<u64>,
    /// Haplotype label (0 or 1) per read, in read order.
    truth: Vec<u8>,
    sequences: Vec<Sequence>,
}

impl ReadSet {
    #[must_use]
    pub const fn get_id(&self) -> u64 {
        self.params.id
    }

    #[must_use]
    pub const fn get_params(&self) -> &DiploidParams {
        &self.params
    }

    #[must_use]
    pub fn get_sites(&self) -> &[u64] {
        &self.sites
    }

    #[must_use]
    pub fn get_truth(&self) -> &[u8] {
        &self.truth
    }

    #[must_use]
    pub fn get_sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    #[must_use]
    pub fn into_sequences(self) -> Vec<Sequence> {
        self.sequences
    }
}

/// Generate one diploid read set.
///
/// A random reference of `region_len` bases is drawn, `n_sites` evenly
/// spaced positions get an alternate allele on the second haplotype, and
/// reads sample the two haplotypes alternately (so every site is
/// depth-balanced). Substitution errors are sprinkled at `error_rate`
/// per base, never on a planted site.
///
/// The same parameters always generate the same set.
///
/// # Panics
///
/// Panics when `region_len <= n_sites` (the sites could not be distinct).
#[must_use]
pub fn generate_read_set(params: &DiploidParams) -> ReadSet {
    assert!(
        params.region_len > params.n_sites,
        "region of {} bases cannot hold {} distinct sites",
        params.region_len,
        params.n_sites,
    );

    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(params.id));
    let base_idx = Uniform::new(0, BASES.len()).expect("non-empty base range");
    let offset = Uniform::new(1, BASES.len()).expect("non-empty offset range");

    let reference: Vec<u8> = (0..params.region_len)
        .map(|_| BASES[base_idx.sample(&mut rng)])
        .collect();

    let sites: Vec<u64> = (1..=params.n_sites)
        .map(|k| k * params.region_len / (params.n_sites + 1))
        .collect();

    // Haplotype 0 is the reference; haplotype 1 swaps in an alternate
    // allele at every site.
    let mut alternate = reference.clone();
    #[allow(clippy::cast_possible_truncation)]
    for &site in &sites {
        let current = position_of(alternate[site as usize]);
        alternate[site as usize] = BASES[(current + offset.sample(&mut rng)) % BASES.len()];
    }
    let haplotypes = [reference, alternate];

    let mut truth = Vec::with_capacity(params.n_reads as usize);
    let mut sequences = Vec::with_capacity(params.n_reads as usize);
    for read in 0..params.n_reads {
        let label = (read % 2) as u8;
        let mut bases = haplotypes[label as usize].clone();
        if params.error_rate > 0.0 {
            for (position, base) in bases.iter_mut().enumerate() {
                if sites.binary_search(&(position as u64)).is_err()
                    && rng.random::<f64>() < params.error_rate
                {
                    let current = position_of(*base);
                    *base = BASES[(current + offset.sample(&mut rng)) % BASES.len()];
                }
            }
        }
        truth.push(label);
        sequences.push(Sequence::new(
            format!("r{read:04}"),
            String::from_utf8(bases).expect("ASCII bases"),
        ));
    }

    ReadSet {
        params: params.clone(),
        generated: Local::now(),
        sites,
        truth,
        sequences,
    }
}

/// Generate `n_sets` read sets in parallel, with ids `0..n_sets`.
#[must_use]
pub fn generate_mult_read_sets(
    n_sets: u64,
    n_reads: u64,
    region_len: u64,
    n_sites: u64,
    error_rate: f64,
    seed: u64,
) -> Vec<ReadSet> {
    (0..n_sets)
        .into_par_iter()
        .map(|id| {
            let params = DiploidParams::builder()
                .id(id)
                .n_reads(n_reads)
                .region_len(region_len)
                .n_sites(n_sites)
                .error_rate(error_rate)
                .seed(seed)
                .build();
            generate_read_set(&params)
        })
        .collect()
}

fn position_of(base: u8) -> usize {
    BASES
        .iter()
        .position(|&b| b == base)
        .expect("haplotype bases stay within ACGT")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DiploidParams {
        DiploidParams::builder()
            .id(0)
            .n_reads(10)
            .region_len(200)
            .n_sites(3)
            .seed(99)
            .build()
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_read_set(&params());
        let b = generate_read_set(&params());
        assert_eq!(a.get_sequences(), b.get_sequences());
        assert_eq!(a.get_truth(), b.get_truth());
        assert_eq!(a.get_sites(), b.get_sites());
    }

    #[test]
    fn haplotypes_alternate_and_balance() {
        let set = generate_read_set(&params());
        assert_eq!(set.get_truth().len(), 10);
        let ones: usize = set.get_truth().iter().map(|&l| usize::from(l)).sum();
        assert_eq!(ones, 5);
    }

    #[test]
    fn error_free_reads_match_their_haplotype_exactly() {
        let set = generate_read_set(&params());
        let sequences = set.get_sequences();
        // Reads of the same label are identical copies of one haplotype.
        assert_eq!(sequences[0].data, sequences[2].data);
        assert_eq!(sequences[1].data, sequences[3].data);
        assert_ne!(sequences[0].data, sequences[1].data);
    }

    #[test]
    fn haplotypes_differ_exactly_at_the_sites() {
        let set = generate_read_set(&params());
        let sequences = set.get_sequences();
        let a = sequences[0].data.as_bytes();
        let b = sequences[1].data.as_bytes();
        let differing: Vec<u64> = (0..a.len())
            .filter(|&i| a[i] != b[i])
            .map(|i| i as u64)
            .collect();
        assert_eq!(differing, set.get_sites());
    }

    #[test]
    fn errors_avoid_the_planted_sites() {
        let noisy = DiploidParams {
            error_rate: 0.05,
            ..params()
        };
        let set = generate_read_set(&noisy);
        let sequences = set.get_sequences();
        // All label-0 reads still agree with each other at the sites.
        for &site in set.get_sites() {
            let site = site as usize;
            let reference = sequences[0].data.as_bytes()[site];
            for read in (2..10).step_by(2) {
                assert_eq!(sequences[read].data.as_bytes()[site], reference);
            }
        }
    }

    #[test]
    fn bulk_generation_assigns_sequential_ids() {
        let sets = generate_mult_read_sets(3, 4, 100, 2, 0.0, 7);
        let ids: Vec<u64> = sets.iter().map(ReadSet::get_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "cannot hold")]
    fn overcrowded_regions_are_rejected() {
        let bad = DiploidParams::builder()
            .id(0)
            .n_reads(2)
            .region_len(3)
            .n_sites(3)
            .build();
        let _ = generate_read_set(&bad);
    }
}
