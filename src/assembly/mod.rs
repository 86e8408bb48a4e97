//! Joins sequences, annotations and species metadata into GenBank records.
//!
//! ## Algorithm
//!
//! For every contig, in lexicographic id order:
//!
//! 1. **Contig record**: sequence, id and every species metadata field that is set
//! 2. **Source feature**: whole-contig span with `scaffold`, `isolate`, `db_xref`, ...
//! 3. **Gene features**: delegated to a [`FeatureStrategy`]
//!
//! The default [`SingleGeneStrategy`] treats each contig as one gene: a `gene`
//! and a `CDS` feature spanning the whole contig, the CDS carrying the protein
//! translation, GO qualifiers split by namespace and EC numbers.
//!
//! A contig without a protein, or a GO id absent from both GO tables, aborts
//! the whole assembly. No partial output is returned.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::go::GoTables;
use crate::core::metadata::SpeciesMetadata;
use crate::core::record::{Feature, Location, OutputContigRecord};
use crate::parsing::annotation::AnnotationTable;
use crate::parsing::fasta::SequenceMap;

pub mod qualifiers;
pub mod strategy;

pub use strategy::{FeatureStrategy, GeneModelStrategy, SingleGeneStrategy};

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("No protein sequence for '{contig}'")]
    MissingProtein { contig: String },

    #[error("GO term {go_id} is neither a current term nor a known alternative id")]
    UnknownGoTerm { go_id: String },

    #[error("Genes carry GO annotations but no GO ontology file was provided")]
    MissingGoTables,
}

/// Per-gene lookups shared by every strategy
pub struct AnnotationContext<'a> {
    proteins: &'a SequenceMap,
    annotations: &'a AnnotationTable,
    go_tables: Option<&'a GoTables>,
}

impl<'a> AnnotationContext<'a> {
    pub fn new(
        proteins: &'a SequenceMap,
        annotations: &'a AnnotationTable,
        go_tables: Option<&'a GoTables>,
    ) -> Self {
        Self {
            proteins,
            annotations,
            go_tables,
        }
    }

    pub fn has_protein(&self, id: &str) -> bool {
        self.proteins.contains_key(id)
    }

    /// Protein sequence for a gene
    ///
    /// # Errors
    ///
    /// Returns `AssemblyError::MissingProtein` if there is none.
    pub fn translation(&self, id: &str) -> Result<&'a str, AssemblyError> {
        self.proteins
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| AssemblyError::MissingProtein {
                contig: id.to_string(),
            })
    }

    /// Add GO and EC qualifiers for `gene_id`, if it is annotated
    ///
    /// # Errors
    ///
    /// Returns an error if GO classification fails.
    pub fn annotate_cds(&self, cds: &mut Feature, gene_id: &str) -> Result<(), AssemblyError> {
        match self.annotations.get(gene_id) {
            Some(annotation) => qualifiers::annotate_cds(cds, annotation, self.go_tables),
            None => Ok(()),
        }
    }
}

/// Builds one [`OutputContigRecord`] per contig
pub struct Assembler<'a> {
    ctx: AnnotationContext<'a>,
    metadata: &'a SpeciesMetadata,
    strategy: Box<dyn FeatureStrategy + 'a>,
    date: NaiveDate,
}

impl<'a> Assembler<'a> {
    /// Create an assembler using the one-gene-per-contig model, dated today
    pub fn new(ctx: AnnotationContext<'a>, metadata: &'a SpeciesMetadata) -> Self {
        Self {
            ctx,
            metadata,
            strategy: Box::new(SingleGeneStrategy),
            date: chrono::Local::now().date_naive(),
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: impl FeatureStrategy + 'a) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Assemble every contig, sorted by id
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure; nothing is returned for other contigs.
    pub fn assemble(&self, contigs: &SequenceMap) -> Result<Vec<OutputContigRecord>, AssemblyError> {
        let mut ids: Vec<&String> = contigs.keys().collect();
        ids.sort();

        info!("Assembling GenBank records for {} contigs", ids.len());

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.assemble_contig(id, &contigs[id])?);
        }
        Ok(records)
    }

    /// Assemble one contig
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy cannot build the contig's features.
    pub fn assemble_contig(
        &self,
        contig_id: &str,
        sequence: &str,
    ) -> Result<OutputContigRecord, AssemblyError> {
        let mut record =
            OutputContigRecord::new(contig_id, sequence, self.metadata.clone(), self.date);

        record.features.push(self.source_feature(contig_id, sequence));
        record
            .features
            .extend(self.strategy.build_features(contig_id, sequence, &self.ctx)?);

        debug!(
            "Contig {contig_id}: {} bp, {} features",
            record.len(),
            record.features.len()
        );
        Ok(record)
    }

    fn source_feature(&self, contig_id: &str, sequence: &str) -> Feature {
        let mut source = Feature::new("source", Location::span(sequence.len() as u64));
        source.add_qualifier("scaffold", contig_id);

        let optional = [
            ("isolate", &self.metadata.isolate),
            ("db_xref", &self.metadata.db_xref),
            ("cell_type", &self.metadata.cell_type),
            ("dev_stage", &self.metadata.dev_stage),
            ("mol_type", &self.metadata.mol_type),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                source.add_qualifier(key, value.as_str());
            }
        }
        source
    }
}
