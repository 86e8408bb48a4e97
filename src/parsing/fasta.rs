//! Sequence loading for genome and protein FASTA files using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna`, `.faa` (uncompressed)
//! - any of the above with `.gz` or `.bgz` (compressed)

use std::ffi::OsStr;
use std::io::BufRead;
use std::path::Path;

use indexmap::IndexMap;
use noodles::fasta;
use tracing::debug;

use crate::parsing::{is_gzipped, open_text, ParseError};

/// Identifier -> sequence, in file order
pub type SequenceMap = IndexMap<String, String>;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let stripped;
    let path = if is_gzipped(path) {
        stripped = path.with_extension("");
        stripped.as_path()
    } else {
        path
    };

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna" | "faa" | "fas")
    )
}

/// Load every record of a FASTA file into an ordered id -> sequence map.
///
/// The record id is the header token before the first whitespace. Sequence
/// lines are concatenated verbatim; no alphabet check is made.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// a record is malformed, or `ParseError::DuplicateId` if an id occurs twice.
pub fn load_sequences(path: &Path) -> Result<SequenceMap, ParseError> {
    let reader = open_text(path)?;
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let sequences = load_from_reader(&mut fasta_reader)?;

    debug!(
        "Loaded {} sequences from {}",
        sequences.len(),
        path.display()
    );
    Ok(sequences)
}

/// Load sequences from FASTA text
///
/// # Errors
///
/// See [`load_sequences`].
pub fn load_sequences_text(text: &str) -> Result<SequenceMap, ParseError> {
    let mut fasta_reader = fasta::io::Reader::new(text.as_bytes());
    load_from_reader(&mut fasta_reader)
}

/// Load from a noodles FASTA reader
fn load_from_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<SequenceMap, ParseError> {
    let mut sequences = SequenceMap::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = String::from_utf8_lossy(record.sequence().as_ref()).to_string();

        if sequences.contains_key(&name) {
            return Err(ParseError::DuplicateId(name));
        }
        sequences.insert(name, sequence);
    }

    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("genome.fa")));
        assert!(is_fasta_file(Path::new("genome.fna")));
        assert!(is_fasta_file(Path::new("proteins.faa")));
        assert!(is_fasta_file(Path::new("genome.fasta.gz")));
        assert!(is_fasta_file(Path::new("/path/to/Genome.FNA.bgz")));

        assert!(!is_fasta_file(Path::new("annotations.tsv")));
        assert!(!is_fasta_file(Path::new("genome.gbk")));
        assert!(!is_fasta_file(Path::new("archive.gz")));
    }

    #[test]
    fn test_load_sequences_preserves_order() {
        let fasta_content = b">contig_2 second\nACGTACGT\nACGT\n>contig_1\nGGGG\n";

        let mut temp = NamedTempFile::with_suffix(".fna").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let seqs = load_sequences(temp.path()).unwrap();
        let ids: Vec<&str> = seqs.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["contig_2", "contig_1"]);
        assert_eq!(seqs["contig_2"], "ACGTACGTACGT");
        assert_eq!(seqs["contig_1"], "GGGG");
    }

    #[test]
    fn test_load_gzipped() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut temp = NamedTempFile::with_suffix(".faa.gz").unwrap();
        {
            let mut encoder = GzEncoder::new(&mut temp, Compression::default());
            encoder.write_all(b">p1\nMKV*\n").unwrap();
            encoder.finish().unwrap();
        }
        temp.flush().unwrap();

        let seqs = load_sequences(temp.path()).unwrap();
        assert_eq!(seqs["p1"], "MKV*");
    }

    #[test]
    fn test_load_empty_is_empty_map() {
        let seqs = load_sequences_text("").unwrap();
        assert!(seqs.is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = load_sequences_text(">a\nAC\n>a\nGT\n");
        assert!(matches!(result, Err(ParseError::DuplicateId(id)) if id == "a"));
    }
}
