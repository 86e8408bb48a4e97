//! Parser for Gene Ontology OBO files (`go-basic.obo`).
//!
//! Only `[Term]` stanzas are read, and from each only:
//!
//! - `id`: the current GO id
//! - `namespace`: one of `cellular_component`, `molecular_function`, `biological_process`
//! - `alt_id`: deprecated ids merged into this term (zero or more)
//!
//! The result is a [`GoTables`] with the namespace table and the
//! `alt_id -> id` alias table.

use std::io::BufRead;
use std::path::Path;

use tracing::{info, warn};

use crate::core::go::{GoNamespace, GoTables};
use crate::parsing::{open_text, ParseError};

/// Fields collected from one `[Term]` stanza
#[derive(Debug, Default)]
struct TermStanza {
    id: Option<String>,
    namespace: Option<String>,
    alt_ids: Vec<String>,
}

impl TermStanza {
    fn flush_into(self, tables: &mut GoTables) {
        let Some(id) = self.id else {
            warn!("Skipping [Term] stanza without an id");
            return;
        };

        match self.namespace.as_deref().map(GoNamespace::parse) {
            Some(Some(ns)) => tables.insert_term(id.clone(), ns),
            Some(None) => warn!(
                "Term {id} has unknown namespace '{}'",
                self.namespace.as_deref().unwrap_or_default()
            ),
            None => warn!("Term {id} has no namespace"),
        }

        for alt_id in self.alt_ids {
            tables.insert_alternative(alt_id, id.clone());
        }
    }
}

/// Parse an OBO file into GO lookup tables
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if it contains no terms.
pub fn parse_obo_file(path: &Path) -> Result<GoTables, ParseError> {
    let reader = open_text(path)?;
    let tables = parse_obo_reader(reader)?;
    info!(
        "Loaded {} GO terms and {} alternative ids from {}",
        tables.term_count(),
        tables.alternative_count(),
        path.display()
    );
    Ok(tables)
}

/// Parse OBO text into GO lookup tables
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the text contains no terms.
pub fn parse_obo_text(text: &str) -> Result<GoTables, ParseError> {
    parse_obo_reader(text.as_bytes())
}

fn parse_obo_reader<R: BufRead>(reader: R) -> Result<GoTables, ParseError> {
    let mut tables = GoTables::new();
    let mut current: Option<TermStanza> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        // A new stanza header ends the previous one
        if line.starts_with('[') {
            if let Some(stanza) = current.take() {
                stanza.flush_into(&mut tables);
            }
            if line == "[Term]" {
                current = Some(TermStanza::default());
            }
            continue;
        }

        let Some(stanza) = current.as_mut() else {
            continue;
        };

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        // Trailing modifiers and comments ("GO:0000001 ! name") are not part of the value
        let value = value.split('!').next().unwrap_or_default().trim();

        match key.trim() {
            "id" => stanza.id = Some(value.to_string()),
            "namespace" => stanza.namespace = Some(value.to_string()),
            "alt_id" => stanza.alt_ids.push(value.to_string()),
            _ => {}
        }
    }

    if let Some(stanza) = current.take() {
        stanza.flush_into(&mut tables);
    }

    if tables.term_count() == 0 {
        return Err(ParseError::InvalidFormat(
            "No GO terms found in OBO file".to_string(),
        ));
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const GO_BASIC: &str = "format-version: 1.2
data-version: releases/2024-01-17
ontology: go

[Term]
id: GO:0000001
name: mitochondrion inheritance
namespace: biological_process
def: \"The distribution of mitochondria.\" [GOC:mcc]
is_a: GO:0048308 ! organelle inheritance

[Term]
id: GO:0005575
name: cellular_component
namespace: cellular_component
alt_id: GO:0008372

[Term]
id: GO:0003674
name: molecular_function
namespace: molecular_function
alt_id: GO:0005554
alt_id: GO:0005555

[Typedef]
id: part_of
name: part of
namespace: external
";

    #[test]
    fn test_parse_terms_and_alt_ids() {
        let tables = parse_obo_text(GO_BASIC).unwrap();
        assert_eq!(tables.term_count(), 3);
        assert_eq!(tables.alternative_count(), 3);
        assert_eq!(
            tables.namespace("GO:0000001"),
            Some(GoNamespace::BiologicalProcess)
        );
        assert_eq!(tables.alternative("GO:0008372"), Some("GO:0005575"));
        assert_eq!(tables.alternative("GO:0005555"), Some("GO:0003674"));
    }

    #[test]
    fn test_typedef_ignored() {
        let tables = parse_obo_text(GO_BASIC).unwrap();
        assert_eq!(tables.namespace("part_of"), None);
    }

    #[test]
    fn test_empty_obo_rejected() {
        assert!(parse_obo_text("format-version: 1.2\n").is_err());
    }

    #[test]
    fn test_parse_obo_file() {
        let mut temp = NamedTempFile::with_suffix(".obo").unwrap();
        temp.write_all(GO_BASIC.as_bytes()).unwrap();
        temp.flush().unwrap();

        let tables = parse_obo_file(temp.path()).unwrap();
        assert_eq!(
            tables.resolve("GO:0005554").and_then(|r| r.namespace()),
            Some(GoNamespace::MolecularFunction)
        );
    }
}
