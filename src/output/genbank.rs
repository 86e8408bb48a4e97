//! GenBank serialization of assembled records using gb-io.
//!
//! Records are converted to [`gb_io::seq::Seq`] values and written one after
//! another. [`write_genbank_file`] writes through a temporary file in the
//! destination directory and only renames it into place once every record has
//! been written, so a failed run leaves no output behind.

use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Datelike;
use gb_io::seq::{Date, Location as GbLocation, Seq, Source, Topology as GbTopology};
use gb_io::writer::SeqWriter;
use thiserror::Error;
use tracing::info;

use crate::core::metadata::{SpeciesMetadata, Topology};
use crate::core::record::{Feature, Location, OutputContigRecord, Strand};

/// Division written when the species has none
const UNKNOWN_DIVISION: &str = "UNK";

/// Lineage lines are wrapped to this width
const LINEAGE_WIDTH: usize = 68;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to move GenBank file into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Record date {0} cannot be written")]
    InvalidDate(chrono::NaiveDate),
}

/// Write records to `path`, replacing it only on success
///
/// # Errors
///
/// Returns `WriteError::Io` if writing fails or `WriteError::Persist` if the
/// finished file cannot be moved to `path`.
pub fn write_genbank_file(path: &Path, records: &[OutputContigRecord]) -> Result<(), WriteError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_genbank(&mut writer, records)?;
        writer.flush()?;
    }
    temp.persist(path)?;

    info!("Wrote {} GenBank records to {}", records.len(), path.display());
    Ok(())
}

/// Write records as GenBank to any writer
///
/// # Errors
///
/// Returns `WriteError::Io` if writing fails.
pub fn write_genbank<W: Write>(writer: W, records: &[OutputContigRecord]) -> Result<(), WriteError> {
    let mut seq_writer = SeqWriter::new(writer);
    for record in records {
        seq_writer.write(&to_gb_seq(record)?)?;
    }
    Ok(())
}

/// Convert an assembled record to a gb-io sequence
///
/// # Errors
///
/// Returns `WriteError::InvalidDate` if the record date is out of GenBank range.
pub fn to_gb_seq(record: &OutputContigRecord) -> Result<Seq, WriteError> {
    let metadata = &record.metadata;
    let date = Date::from_ymd(record.date.year(), record.date.month(), record.date.day())
        .map_err(|_| WriteError::InvalidDate(record.date))?;

    Ok(Seq {
        name: Some(record.id.clone()),
        topology: match metadata.topology.unwrap_or_default() {
            Topology::Linear => GbTopology::Linear,
            Topology::Circular => GbTopology::Circular,
        },
        date: Some(date),
        len: Some(record.sequence.len()),
        molecule_type: Some("DNA".to_string()),
        division: metadata
            .data_file_division
            .clone()
            .unwrap_or_else(|| UNKNOWN_DIVISION.to_string()),
        definition: metadata.description.clone(),
        accession: Some(record.id.clone()),
        source: source_of(metadata),
        keywords: if metadata.keywords.is_empty() {
            None
        } else {
            Some(metadata.keywords.join("; "))
        },
        seq: record.sequence.as_bytes().to_vec(),
        features: record.features.iter().map(to_gb_feature).collect(),
        ..Seq::empty()
    })
}

/// SOURCE / ORGANISM block; the lineage follows the organism name
fn source_of(metadata: &SpeciesMetadata) -> Option<Source> {
    let source = metadata
        .source
        .clone()
        .or_else(|| metadata.organism.clone())?;

    let organism = metadata.organism.as_ref().map(|name| {
        if metadata.taxonomy.is_empty() {
            name.clone()
        } else {
            let mut lines = vec![name.clone()];
            lines.extend(wrap_lineage(&metadata.taxonomy));
            lines.join("\n")
        }
    });

    Some(Source { source, organism })
}

/// Join lineage ranks with "; ", end with ".", and wrap to `LINEAGE_WIDTH`
fn wrap_lineage(taxonomy: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for (i, rank) in taxonomy.iter().enumerate() {
        let sep = if i + 1 == taxonomy.len() { "." } else { ";" };
        let piece = format!("{rank}{sep}");

        if !current.is_empty() && current.len() + 1 + piece.len() > LINEAGE_WIDTH {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn to_gb_feature(feature: &Feature) -> gb_io::seq::Feature {
    gb_io::seq::Feature {
        kind: feature.kind.as_str().into(),
        location: to_gb_location(&feature.location),
        qualifiers: feature
            .qualifiers
            .iter()
            .map(|(key, value)| (key.as_str().into(), value.clone()))
            .collect(),
    }
}

/// 1-based inclusive -> gb-io's 0-based half-open ranges
fn to_gb_location(location: &Location) -> GbLocation {
    match location {
        Location::Range { start, end, strand } => {
            let range = GbLocation::simple_range(start.saturating_sub(1) as i64, *end as i64);
            if *strand == Strand::Reverse {
                GbLocation::Complement(Box::new(range))
            } else {
                range
            }
        }
        Location::Join(parts) => {
            let all_reverse = parts
                .iter()
                .all(|p| matches!(p, Location::Range { strand: Strand::Reverse, .. }));
            if all_reverse {
                // complement(join(a..b,c..d)) rather than join(complement(..),..)
                let forward = parts
                    .iter()
                    .map(|p| GbLocation::simple_range(p.start().saturating_sub(1) as i64, p.end() as i64))
                    .collect();
                GbLocation::Complement(Box::new(GbLocation::Join(forward)))
            } else {
                GbLocation::Join(parts.iter().map(to_gb_location).collect())
            }
        }
    }
}
