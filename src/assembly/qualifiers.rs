//! GO and EC qualifiers for CDS features.

use tracing::warn;

use crate::assembly::AssemblyError;
use crate::core::go::{GoNamespace, GoTables};
use crate::core::record::Feature;
use crate::parsing::annotation::AnnotationRecord;

/// Separators accepted between GO terms or EC numbers
const TERM_SEPARATORS: [char; 2] = [';', ','];

/// Split a raw annotation cell on `;` and `,`.
///
/// Returns an empty list when the cell holds no terms at all, i.e. when
/// splitting yields a single empty element.
pub fn split_terms(raw: &str) -> Vec<&str> {
    let terms: Vec<&str> = raw.split(TERM_SEPARATORS).map(str::trim).collect();
    if terms.len() == 1 && terms[0].is_empty() {
        Vec::new()
    } else {
        terms
    }
}

/// Remove the `ec:` prefix eggNOG puts on some EC numbers
pub fn strip_ec_prefix(ec: &str) -> &str {
    ec.strip_prefix("ec:").unwrap_or(ec)
}

/// GO terms of one gene, bucketed by namespace
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GoBuckets<'a> {
    pub component: Vec<&'a str>,
    pub function: Vec<&'a str>,
    pub process: Vec<&'a str>,
}

impl<'a> GoBuckets<'a> {
    fn push(&mut self, namespace: GoNamespace, go_id: &'a str) {
        match namespace {
            GoNamespace::CellularComponent => self.component.push(go_id),
            GoNamespace::MolecularFunction => self.function.push(go_id),
            GoNamespace::BiologicalProcess => self.process.push(go_id),
        }
    }
}

/// Classify raw GO ids by namespace.
///
/// Each id is resolved on its own: directly when it is a current term, through
/// the alias table when it is deprecated. The id as written in the annotation
/// is what lands in the bucket. Aliases whose replacement carries no namespace
/// are dropped with a warning.
///
/// # Errors
///
/// Returns `AssemblyError::UnknownGoTerm` for an id found in neither table.
pub fn classify_go_terms<'a>(
    go_ids: &[&'a str],
    tables: &GoTables,
) -> Result<GoBuckets<'a>, AssemblyError> {
    let mut buckets = GoBuckets::default();

    for &go_id in go_ids {
        let resolution = tables
            .resolve(go_id)
            .ok_or_else(|| AssemblyError::UnknownGoTerm {
                go_id: go_id.to_string(),
            })?;

        match resolution.namespace() {
            Some(ns) => buckets.push(ns, go_id),
            None => warn!("GO term {go_id} has no namespace, dropping it"),
        }
    }

    Ok(buckets)
}

/// Attach `go_component` / `go_function` / `go_process` and `EC_number`
/// qualifiers to a CDS feature. Empty annotation cells add nothing.
///
/// # Errors
///
/// Returns `AssemblyError::MissingGoTables` when GO terms are present but no
/// GO tables were loaded, or `AssemblyError::UnknownGoTerm` for an
/// unresolvable id.
pub fn annotate_cds(
    feature: &mut Feature,
    annotation: &AnnotationRecord,
    go_tables: Option<&GoTables>,
) -> Result<(), AssemblyError> {
    let go_ids = split_terms(&annotation.gos);
    if !go_ids.is_empty() {
        let tables = go_tables.ok_or(AssemblyError::MissingGoTables)?;
        let buckets = classify_go_terms(&go_ids, tables)?;
        feature.add_qualifiers(GoNamespace::CellularComponent.qualifier(), buckets.component);
        feature.add_qualifiers(GoNamespace::MolecularFunction.qualifier(), buckets.function);
        feature.add_qualifiers(GoNamespace::BiologicalProcess.qualifier(), buckets.process);
    }

    let ecs = split_terms(&annotation.ec);
    if !ecs.is_empty() {
        feature.add_qualifiers("EC_number", ecs.into_iter().map(strip_ec_prefix));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Location;

    fn tables() -> GoTables {
        GoTables::new()
            .with_term("GO:0005575", GoNamespace::CellularComponent)
            .with_term("GO:0003674", GoNamespace::MolecularFunction)
            .with_term("GO:0008150", GoNamespace::BiologicalProcess)
            .with_alternative("GO:0008372", "GO:0005575")
    }

    #[test]
    fn test_split_terms() {
        assert!(split_terms("").is_empty());
        assert_eq!(split_terms("GO:1;GO:2,GO:3"), vec!["GO:1", "GO:2", "GO:3"]);
        assert_eq!(split_terms("1.1.1.1"), vec!["1.1.1.1"]);
    }

    #[test]
    fn test_strip_ec_prefix() {
        assert_eq!(strip_ec_prefix("ec:2.2.2.2"), "2.2.2.2");
        assert_eq!(strip_ec_prefix("1.1.1.1"), "1.1.1.1");
    }

    #[test]
    fn test_classify_direct_and_alias() {
        let ids = ["GO:0008372", "GO:0003674", "GO:0008150"];
        let buckets = classify_go_terms(&ids, &tables()).unwrap();
        // Deprecated id is kept as written, classified by its replacement
        assert_eq!(buckets.component, vec!["GO:0008372"]);
        assert_eq!(buckets.function, vec!["GO:0003674"]);
        assert_eq!(buckets.process, vec!["GO:0008150"]);
    }

    #[test]
    fn test_classify_unknown_aborts() {
        let ids = ["GO:0005575", "GO:7777777"];
        let err = classify_go_terms(&ids, &tables()).unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownGoTerm { go_id } if go_id == "GO:7777777"));
    }

    #[test]
    fn test_annotate_cds_ec_only() {
        let mut cds = Feature::new("CDS", Location::span(30));
        let annotation = AnnotationRecord::new("", "1.1.1.1;ec:2.2.2.2");
        annotate_cds(&mut cds, &annotation, None).unwrap();

        assert_eq!(cds.qualifier_values("EC_number"), vec!["1.1.1.1", "2.2.2.2"]);
        assert!(!cds.has_qualifier("go_component"));
        assert!(!cds.has_qualifier("go_function"));
        assert!(!cds.has_qualifier("go_process"));
    }

    #[test]
    fn test_annotate_cds_requires_go_tables() {
        let mut cds = Feature::new("CDS", Location::span(30));
        let annotation = AnnotationRecord::new("GO:0005575", "");
        let err = annotate_cds(&mut cds, &annotation, None).unwrap_err();
        assert!(matches!(err, AssemblyError::MissingGoTables));
    }
}
