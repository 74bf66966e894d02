//! Sequence file input.
//!
//! Reads FASTA or FASTQ files, transparently gunzipping `.gz` variants.
//! The format is sniffed from the file extension, exactly the set the
//! host assembler accepts: `.fasta`, `.fa`, `.fastq`, `.fq`, each with an
//! optional `.gz` suffix. Bases are uppercased on the way in.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ::derive_more::From;
use bio::io::{fasta, fastq};
use flate2::bufread::MultiGzDecoder;
use haplopart_core::sequence::Sequence;

/// Input failures.
#[derive(Debug, From)]
pub enum Error {
    /// Underlying file I/O failed.
    #[from]
    Io(std::io::Error),
    /// The path carries none of the supported extensions.
    UnsupportedFormat(PathBuf),
    /// A record could not be parsed.
    Parse(String),
}

/// Supported sequence file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Fasta,
    Fastq,
}

/// Sniff the format from the file name, ignoring a trailing `.gz`.
#[must_use]
pub fn format_of(path: &Path) -> Option<Format> {
    let name = path.file_name()?.to_str()?;
    let name = name.strip_suffix(".gz").unwrap_or(name);
    if name.ends_with(".fasta") || name.ends_with(".fa") {
        Some(Format::Fasta)
    } else if name.ends_with(".fastq") || name.ends_with(".fq") {
        Some(Format::Fastq)
    } else {
        None
    }
}

/// Transparently open a file, decoding gzip when the name says so.
///
/// # Errors
///
/// Propagates the underlying `std::io::Error`.
pub fn open_read_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path)?;
    let bufreader = BufReader::new(file);
    if path.extension().is_some_and(|ext| ext == "gz") {
        tracing::trace!(?path, "opening as gzip");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(bufreader))))
    } else {
        tracing::trace!(?path, "opening as plain text");
        Ok(Box::new(bufreader))
    }
}

/// Read all sequences from `path`, in file order.
///
/// # Errors
///
/// - [`Error::UnsupportedFormat`] for an unrecognised extension.
/// - [`Error::Io`] / [`Error::Parse`] for unreadable or malformed files.
pub fn read_sequences(path: &Path) -> Result<Vec<Sequence>, Error> {
    let format = format_of(path).ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;
    let reader = open_read_maybe_gz(path)?;

    let sequences = match format {
        Format::Fasta => {
            let mut sequences = Vec::new();
            for record in fasta::Reader::new(reader).records() {
                let record = record.map_err(|e| Error::Parse(e.to_string()))?;
                sequences.push(to_sequence(record.id(), record.seq()));
            }
            sequences
        }
        Format::Fastq => {
            let mut sequences = Vec::new();
            for record in fastq::Reader::new(reader).records() {
                let record = record.map_err(|e| Error::Parse(e.to_string()))?;
                sequences.push(to_sequence(record.id(), record.seq()));
            }
            sequences
        }
    };

    tracing::debug!(?path, reads = sequences.len(), "loaded sequences");
    Ok(sequences)
}

fn to_sequence(id: &str, seq: &[u8]) -> Sequence {
    let data = String::from_utf8_lossy(&seq.to_ascii_uppercase()).into_owned();
    Sequence::new(id.to_owned(), data)
}
