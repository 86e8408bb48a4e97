//! Parsers for the inputs of a GenBank build.
//!
//! This module provides parsers for:
//!
//! - **FASTA files**: genome contigs and protein sequences (plain or gzip)
//! - **eggNOG-mapper tables**: per-gene GO terms and EC numbers
//! - **GO OBO files**: term namespaces and deprecated-id aliases
//! - **GFF3 files**: gene / RNA / pseudogene / exon / CDS structure
//!
//! ## Example
//!
//! ```rust,no_run
//! use eggnog2gbk::parsing::{annotation, fasta, obo};
//! use std::path::Path;
//!
//! let contigs = fasta::load_sequences(Path::new("genome.fna")).unwrap();
//! let proteins = fasta::load_sequences(Path::new("proteins.faa")).unwrap();
//! let annotations = annotation::parse_annotation_file(Path::new("sample.emapper.annotations")).unwrap();
//! let go_tables = obo::parse_obo_file(Path::new("go-basic.obo")).unwrap();
//! ```

use thiserror::Error;

pub mod annotation;
pub mod fasta;
pub mod gff;
pub mod obo;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Duplicate record identifier: {0}")]
    DuplicateId(String),
}

/// Open a file for buffered reading, decompressing gzip/bgzip by extension
pub(crate) fn open_text(path: &std::path::Path) -> Result<Box<dyn std::io::BufRead>, ParseError> {
    use flate2::read::MultiGzDecoder;
    use std::io::BufReader;

    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub(crate) fn is_gzipped(path: &std::path::Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}
