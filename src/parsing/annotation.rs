//! Parser for eggNOG-mapper annotation tables.
//!
//! eggNOG-mapper writes a tab-separated table with `##` comment lines and a
//! header line starting with `#query` (v2) or `#query_name` (v1). The columns
//! used here are:
//!
//! - query: gene / protein identifier
//! - GOs: GO terms, separated by `,` (`GO_terms` in v1 tables)
//! - EC: EC numbers, separated by `,`
//!
//! Empty cells are written as `-` and are read back as empty strings.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, warn};

use crate::parsing::{open_text, ParseError};

/// Default column positions of eggNOG-mapper v2 when no header is present
const DEFAULT_ID_COLUMN: usize = 0;
const DEFAULT_GOS_COLUMN: usize = 9;
const DEFAULT_EC_COLUMN: usize = 10;

/// Raw GO / EC annotation for one gene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// GO terms as written in the table, `;` or `,` separated (may be empty)
    pub gos: String,
    /// EC numbers as written in the table, `;` or `,` separated (may be empty)
    pub ec: String,
}

impl AnnotationRecord {
    pub fn new(gos: impl Into<String>, ec: impl Into<String>) -> Self {
        Self {
            gos: gos.into(),
            ec: ec.into(),
        }
    }
}

/// Gene id -> annotation
pub type AnnotationTable = HashMap<String, AnnotationRecord>;

/// Column positions resolved from the header line.
///
/// Positional defaults apply only to tables without a header; a header that
/// does not name a GO or EC column leaves that annotation empty.
#[derive(Debug, Clone, Copy)]
struct Columns {
    id: usize,
    gos: Option<usize>,
    ec: Option<usize>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_COLUMN,
            gos: Some(DEFAULT_GOS_COLUMN),
            ec: Some(DEFAULT_EC_COLUMN),
        }
    }
}

impl Columns {
    /// Resolve from a header line, or `None` if the line is not a header
    fn from_header(line: &str) -> Option<Self> {
        let header_line = line.trim_start_matches('#').trim_end();
        let header_map: HashMap<String, usize> = header_line
            .split('\t')
            .enumerate()
            .map(|(idx, col)| (col.trim().to_lowercase(), idx))
            .collect();

        let id = header_map
            .get("query")
            .or_else(|| header_map.get("query_name"))
            .copied()?;

        // v2 writes `GOs`, v1 writes `GO_terms`
        let gos = header_map
            .get("gos")
            .or_else(|| header_map.get("go_terms"))
            .copied();
        let ec = header_map.get("ec").copied();

        if gos.is_none() {
            warn!("Annotation header has no GOs column, GO terms left empty");
        }
        if ec.is_none() {
            warn!("Annotation header has no EC column, EC numbers left empty");
        }

        Some(Self { id, gos, ec })
    }
}

/// Parse an eggNOG-mapper annotation file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_annotation_file(path: &Path) -> Result<AnnotationTable, ParseError> {
    let reader = open_text(path)?;
    let table = parse_annotation_reader(reader)?;
    debug!(
        "Read annotations for {} genes from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Parse eggNOG-mapper annotation text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a data line has no identifier or a
/// gene is listed twice.
pub fn parse_annotation_text(text: &str) -> Result<AnnotationTable, ParseError> {
    parse_annotation_reader(text.as_bytes())
}

fn parse_annotation_reader<R: BufRead>(reader: R) -> Result<AnnotationTable, ParseError> {
    let mut table = AnnotationTable::new();
    let mut columns = Columns::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if line.trim().is_empty() || line.starts_with("##") {
            continue;
        }

        if let Some(header) = Columns::from_header(&line) {
            columns = header;
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let id = fields
            .get(columns.id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!("Line {line_num} has no gene identifier"))
            })?;

        let record = AnnotationRecord::new(
            cell(&fields, columns.gos),
            cell(&fields, columns.ec),
        );

        if table.insert(id.to_string(), record).is_some() {
            warn!("Gene {id} is annotated more than once, keeping line {line_num}");
        }
    }

    Ok(table)
}

/// Read a cell, mapping missing columns and eggNOG's `-` placeholder to ""
fn cell(fields: &[&str], idx: Option<usize>) -> String {
    match idx.and_then(|i| fields.get(i)).map(|s| s.trim()) {
        Some("-") | None => String::new(),
        Some(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAPPER_V2: &str = "## emapper-2.1.12\n\
## command: emapper.py -i proteins.faa\n\
#query\tseed_ortholog\tevalue\tscore\teggNOG_OGs\tmax_annot_lvl\tCOG_category\tDescription\tPreferred_name\tGOs\tEC\tKEGG_ko\n\
g1\t3702.AT1G01010.1\t1e-50\t200.0\tKOG0001@1|root\t33090|Viridiplantae\tK\tNAC domain\tNAC001\tGO:0005575,GO:0003674\t1.1.1.1\t-\n\
g2\t3702.AT1G01020.1\t1e-20\t90.0\tKOG0002@1|root\t33090|Viridiplantae\tS\tunknown\t-\t-\t-\t-\n\
## 2 queries scanned\n";

    #[test]
    fn test_parse_emapper_v2() {
        let table = parse_annotation_text(EMAPPER_V2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["g1"].gos, "GO:0005575,GO:0003674");
        assert_eq!(table["g1"].ec, "1.1.1.1");
        assert_eq!(table["g2"], AnnotationRecord::default());
    }

    #[test]
    fn test_header_columns_by_name() {
        let tsv = "query\tEC\tGOs\nc1\tec:2.7.1.1\tGO:0008150\n";
        let table = parse_annotation_text(tsv).unwrap();
        assert_eq!(table["c1"].gos, "GO:0008150");
        assert_eq!(table["c1"].ec, "ec:2.7.1.1");
    }

    #[test]
    fn test_no_header_uses_default_positions() {
        let row = "c1\ta\tb\tc\td\te\tf\tg\th\tGO:0005575;GO:0003674\t1.1.1.1";
        let table = parse_annotation_text(row).unwrap();
        assert_eq!(table["c1"].gos, "GO:0005575;GO:0003674");
        assert_eq!(table["c1"].ec, "1.1.1.1");
    }

    #[test]
    fn test_v1_header_without_ec_column() {
        let tsv = "# emapper version: emapper-1.0.3\n\
#query_name\tseed_eggNOG_ortholog\tseed_ortholog_evalue\tseed_ortholog_score\tpredicted_gene_name\tGO_terms\tKEGG_KOs\tBiGG_reactions\tAnnotation_tax_scope\tOGs\tbestOG|evalue|score\tCOG cat\teggNOG annot\n\
g1\t3702.AT1G01010.1\t1e-50\t200.0\tNAC001\tGO:0005575,GO:0003674\t\t\tNOG\tCOG0001@1|root\tNOG1|1e-5|50\tK\tNAC domain\n";
        let table = parse_annotation_text(tsv).unwrap();
        assert_eq!(table["g1"].gos, "GO:0005575,GO:0003674");
        assert_eq!(table["g1"].ec, "");
    }

    #[test]
    fn test_header_without_go_column_reads_empty() {
        let row_tail = "\tx".repeat(12);
        let tsv = format!("#query\tEC\nc1\t1.1.1.1{row_tail}\n");
        let table = parse_annotation_text(&tsv).unwrap();
        assert_eq!(table["c1"].gos, "");
        assert_eq!(table["c1"].ec, "1.1.1.1");
    }

    #[test]
    fn test_short_row_reads_empty() {
        let tsv = "#query\tGOs\tEC\nc1\tGO:0005575\n";
        let table = parse_annotation_text(tsv).unwrap();
        assert_eq!(table["c1"].gos, "GO:0005575");
        assert_eq!(table["c1"].ec, "");
    }

    #[test]
    fn test_missing_identifier() {
        let tsv = "#query\tGOs\tEC\n\tGO:0005575\t1.1.1.1\n";
        assert!(matches!(
            parse_annotation_text(tsv),
            Err(ParseError::InvalidFormat(_))
        ));
    }
}
