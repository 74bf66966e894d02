use std::path::Path;
use std::time::Duration;
use std::{fs, process};

use clap::Parser;
use haplopart_cli::{App, Command, GenerateArgs, PartitionArgs};
use haplopart_core::column::SnpThresholds;
use haplopart_core::mfr::MfrOptions;
use haplopart_core::{Error, MsaParams, Partition, PartitionOptions, Sequence};
use haplopart_msa::ProgressiveAligner;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Exit code 1 for argument errors; help and version keep exiting 0.
    let app = match App::try_parse() {
        Ok(app) => app,
        Err(e) => {
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            process::exit(code);
        }
    };

    match &app.command {
        Command::Partition(args) => partition(args),
        Command::Generate(args) => generate(args),
    }
}

fn partition(args: &PartitionArgs) {
    if args.gap >= 0 {
        eprintln!("gap penalty must be negative");
        process::exit(1);
    }
    if args.match_score <= 0 {
        eprintln!("match score must be positive");
        process::exit(1);
    }

    let sequences = haplopart_parser::read_sequences(&args.input).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e:?}", args.input.display());
        process::exit(1);
    });

    let options = PartitionOptions {
        msa: MsaParams {
            match_score: args.match_score,
            mismatch: args.mismatch,
            gap: args.gap,
        },
        thresholds: SnpThresholds {
            min_depth: args.min_depth,
            max_err: args.max_err,
            min_secondary: args.min_secondary,
        },
        mfr: MfrOptions {
            max_branch_depth: args.max_branch_depth,
            timeout: Duration::from_secs(args.mfr_timeout),
            zobrist_seed: args.zobrist_seed,
        },
        unphased: args.unphased.into(),
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to build thread pool: {e}");
            process::exit(1);
        });

    let engine = ProgressiveAligner::new();
    let result = pool.install(|| haplopart_core::partition(sequences, &engine, &options));

    match result {
        Ok(partition) => report(args, &partition),
        Err(Error::MfrTimeout) => {
            eprintln!("Removal solver timed out without a usable removal set");
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Partitioning failed: {e:?}");
            process::exit(1);
        }
    }
}

fn report(args: &PartitionArgs, partition: &Partition) {
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    for (name, reads) in [
        ("hap0.fasta", &partition.h0),
        ("hap1.fasta", &partition.h1),
        ("unphased.fasta", &partition.unphased),
        ("ambiguous.fasta", &partition.ambiguous),
    ] {
        if reads.is_empty() && name != "hap0.fasta" && name != "hap1.fasta" {
            continue;
        }
        write_fasta(&args.output_dir.join(name), reads);
    }

    let flag = if partition.heuristic { ", heuristic" } else { "" };
    println!(
        "H0: {} reads, H1: {} reads, unphased: {}, ambiguous: {} (MFR optimum {}{flag})",
        partition.h0.len(),
        partition.h1.len(),
        partition.unphased.len(),
        partition.ambiguous.len(),
        partition.optimum,
    );
}

fn write_fasta(path: &Path, reads: &[Sequence]) {
    let mut writer = bio::io::fasta::Writer::to_file(path).unwrap_or_else(|e| {
        eprintln!("Failed to create {}: {e}", path.display());
        process::exit(1);
    });
    for read in reads {
        writer
            .write(&read.name, None, read.data.as_bytes())
            .unwrap_or_else(|e| {
                eprintln!("Failed to write {}: {e}", path.display());
                process::exit(1);
            });
    }
}

fn generate(args: &GenerateArgs) {
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    let read_sets = haplopart_testgen::generate_mult_read_sets(
        args.n_sets,
        args.n_reads,
        args.region_len,
        args.n_sites,
        args.error_rate,
        args.seed,
    );

    for set in &read_sets {
        write_fasta(
            &args.output_dir.join(format!("{}.fasta", set.get_id())),
            set.get_sequences(),
        );

        let path = args.output_dir.join(format!("{}.json", set.get_id()));
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", path.display());
            process::exit(1);
        });
        serde_json::to_writer_pretty(file, set).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        });
    }

    println!(
        "Generated {} read sets to {}",
        read_sets.len(),
        args.output_dir.display()
    );
}
