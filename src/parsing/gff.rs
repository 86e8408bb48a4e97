//! Parser for GFF3 gene models.
//!
//! Reads the nine-column GFF3 layout and keeps the feature types needed to
//! build GenBank gene structure: `gene`, RNA types, `pseudogene`, `exon` and
//! `CDS`. Features are linked through their `ID` and `Parent` attributes.
//!
//! Coordinates are kept 1-based and inclusive, as in the file.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::record::Strand;
use crate::parsing::{open_text, ParseError};

/// RNA feature types carried over to GenBank
pub const RNA_TYPES: &[&str] = &[
    "mRNA", "tRNA", "rRNA", "ncRNA", "lnc_RNA", "snRNA", "snoRNA",
];

/// One GFF3 feature line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GffFeature {
    pub seqid: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub id: Option<String>,
    pub parents: Vec<String>,
}

/// Indexed GFF3 features
#[derive(Debug, Default)]
pub struct GeneModelDb {
    features: Vec<GffFeature>,

    /// Index: parent ID -> indices of child features, in file order
    children: HashMap<String, Vec<usize>>,

    /// Index: seqid -> indices of gene features
    genes_by_seqid: HashMap<String, Vec<usize>>,
}

impl GeneModelDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature(&mut self, feature: GffFeature) {
        let idx = self.features.len();

        for parent in &feature.parents {
            self.children.entry(parent.clone()).or_default().push(idx);
        }
        if feature.feature_type == "gene" {
            self.genes_by_seqid
                .entry(feature.seqid.clone())
                .or_default()
                .push(idx);
        }

        self.features.push(feature);
    }

    /// Genes on a sequence, ordered by start
    pub fn genes_on(&self, seqid: &str) -> Vec<&GffFeature> {
        let mut genes: Vec<&GffFeature> = self
            .genes_by_seqid
            .get(seqid)
            .map(|idxs| idxs.iter().map(|&i| &self.features[i]).collect())
            .unwrap_or_default();
        genes.sort_by_key(|g| (g.start, g.end));
        genes
    }

    /// Children of `parent_id` with the given type, ordered by start
    pub fn children(&self, parent_id: &str, feature_type: &str) -> Vec<&GffFeature> {
        let mut kids: Vec<&GffFeature> = self
            .children
            .get(parent_id)
            .map(|idxs| {
                idxs.iter()
                    .map(|&i| &self.features[i])
                    .filter(|f| f.feature_type == feature_type)
                    .collect()
            })
            .unwrap_or_default();
        kids.sort_by_key(|f| (f.start, f.end));
        kids
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Parse a GFF3 file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` for malformed lines.
pub fn parse_gff_file(path: &Path) -> Result<GeneModelDb, ParseError> {
    let reader = open_text(path)?;
    let db = parse_gff_reader(reader)?;
    if db.is_empty() {
        warn!("No gene model features in {}", path.display());
    } else {
        debug!("Indexed {} GFF features from {}", db.len(), path.display());
    }
    Ok(db)
}

/// Parse GFF3 text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for lines with fewer than 9 columns or
/// non-numeric coordinates.
pub fn parse_gff_text(text: &str) -> Result<GeneModelDb, ParseError> {
    parse_gff_reader(text.as_bytes())
}

fn parse_gff_reader<R: BufRead>(reader: R) -> Result<GeneModelDb, ParseError> {
    let mut db = GeneModelDb::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = i + 1;

        if line.starts_with("##FASTA") {
            break;
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            return Err(ParseError::InvalidFormat(format!(
                "GFF line {line_num} has fewer than 9 fields"
            )));
        }

        let feature_type = fields[2];
        if !is_kept_type(feature_type) {
            continue;
        }

        let start = parse_coordinate(fields[3], line_num)?;
        let end = parse_coordinate(fields[4], line_num)?;
        if start > end {
            warn!("GFF line {line_num}: start {start} is after end {end}");
        }

        let (id, parents) = parse_attributes(fields[8]);

        db.add_feature(GffFeature {
            seqid: fields[0].to_string(),
            feature_type: feature_type.to_string(),
            start,
            end,
            strand: Strand::parse(fields[6]),
            id,
            parents,
        });
    }

    Ok(db)
}

fn is_kept_type(feature_type: &str) -> bool {
    matches!(feature_type, "gene" | "pseudogene" | "exon" | "CDS")
        || RNA_TYPES.contains(&feature_type)
}

fn parse_coordinate(s: &str, line_num: usize) -> Result<u64, ParseError> {
    s.trim().parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid coordinate on GFF line {line_num}: '{s}'"))
    })
}

/// Extract `ID` and `Parent` (comma separated) from a GFF3 attribute column
fn parse_attributes(column: &str) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut parents = Vec::new();

    for pair in column.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        match key {
            "ID" => id = Some(value.to_string()),
            "Parent" => parents.extend(value.split(',').map(str::to_string)),
            _ => {}
        }
    }

    (id, parents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GFF: &str = "##gff-version 3
ctg1\tsrc\tgene\t100\t900\t.\t+\t.\tID=g1;Name=abc
ctg1\tsrc\tmRNA\t100\t900\t.\t+\t.\tID=g1.t1;Parent=g1
ctg1\tsrc\texon\t100\t300\t.\t+\t.\tID=g1.e1;Parent=g1.t1
ctg1\tsrc\texon\t500\t900\t.\t+\t.\tID=g1.e2;Parent=g1.t1
ctg1\tsrc\tCDS\t150\t300\t.\t+\t0\tID=g1.cds;Parent=g1.t1
ctg1\tsrc\tCDS\t500\t800\t.\t+\t0\tID=g1.cds;Parent=g1.t1
ctg1\tsrc\tgene\t10\t50\t.\t-\t.\tID=g0
ctg1\tsrc\tregion\t1\t1000\t.\t.\t.\tID=ctg1
ctg2\tsrc\tgene\t1\t60\t.\t?\t.\tID=g2
";

    #[test]
    fn test_genes_ordered_by_start() {
        let db = parse_gff_text(GFF).unwrap();
        let ids: Vec<&str> = db
            .genes_on("ctg1")
            .iter()
            .filter_map(|g| g.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["g0", "g1"]);
        assert_eq!(db.genes_on("ctg2")[0].strand, Strand::Unknown);
        assert!(db.genes_on("missing").is_empty());
    }

    #[test]
    fn test_children_by_type() {
        let db = parse_gff_text(GFF).unwrap();
        assert_eq!(db.children("g1", "mRNA").len(), 1);
        let exons = db.children("g1.t1", "exon");
        assert_eq!(exons.len(), 2);
        assert_eq!((exons[0].start, exons[0].end), (100, 300));
        assert_eq!(db.children("g1.t1", "CDS").len(), 2);
    }

    #[test]
    fn test_unused_types_skipped() {
        let db = parse_gff_text(GFF).unwrap();
        // the `region` line is dropped
        assert_eq!(db.len(), 8);
        assert_eq!(db.genes_on("ctg1")[0].strand, Strand::Reverse);
    }

    #[test]
    fn test_short_line_rejected() {
        let result = parse_gff_text("ctg1\tsrc\tgene\t1\t10\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_multiple_parents() {
        let (id, parents) = parse_attributes("ID=e1;Parent=t1,t2");
        assert_eq!(id.as_deref(), Some("e1"));
        assert_eq!(parents, vec!["t1".to_string(), "t2".to_string()]);
    }
}
