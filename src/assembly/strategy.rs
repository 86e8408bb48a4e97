//! Feature construction strategies.
//!
//! - [`SingleGeneStrategy`]: one gene and one CDS spanning the whole contig,
//!   used when no gene models are supplied
//! - [`GeneModelStrategy`]: gene / RNA / CDS / pseudogene features placed from
//!   a GFF3 gene model database

use tracing::debug;

use crate::assembly::{AnnotationContext, AssemblyError};
use crate::core::record::{Feature, Location, Strand};
use crate::parsing::gff::{GeneModelDb, GffFeature, RNA_TYPES};

/// Builds the gene-level features of one contig
pub trait FeatureStrategy {
    /// Features to append after the contig's `source` feature, in output order
    ///
    /// # Errors
    ///
    /// Returns an error if a protein or GO lookup fails.
    fn build_features(
        &self,
        contig_id: &str,
        sequence: &str,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Vec<Feature>, AssemblyError>;
}

/// Locus tag for a contig: the contig id itself, or `gene_<id>` for purely
/// numeric ids
pub fn locus_tag_for(contig_id: &str) -> String {
    if !contig_id.is_empty() && contig_id.chars().all(|c| c.is_ascii_digit()) {
        format!("gene_{contig_id}")
    } else {
        contig_id.to_string()
    }
}

/// One gene per contig: the contig is the gene and its protein is keyed by
/// the contig id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleGeneStrategy;

impl FeatureStrategy for SingleGeneStrategy {
    fn build_features(
        &self,
        contig_id: &str,
        sequence: &str,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Vec<Feature>, AssemblyError> {
        let locus_tag = locus_tag_for(contig_id);
        let span = Location::span(sequence.len() as u64);

        let mut gene = Feature::new("gene", span.clone());
        gene.add_qualifier("locus_tag", locus_tag.as_str());

        let mut cds = Feature::new("CDS", span);
        cds.add_qualifier("translation", ctx.translation(contig_id)?);
        cds.add_qualifier("locus_tag", locus_tag.as_str());
        ctx.annotate_cds(&mut cds, contig_id)?;

        Ok(vec![gene, cds])
    }
}

/// Gene structure taken from a GFF3 gene model database
pub struct GeneModelStrategy<'a> {
    db: &'a GeneModelDb,
}

impl<'a> GeneModelStrategy<'a> {
    pub fn new(db: &'a GeneModelDb) -> Self {
        Self { db }
    }

    fn gene_features(
        &self,
        gene: &GffFeature,
        gene_id: &str,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Vec<Feature>, AssemblyError> {
        let gene_location = Location::range(gene.start, gene.end, gene.strand);
        let mut features = Vec::new();

        let mut gene_feature = Feature::new("gene", gene_location.clone());
        gene_feature.add_qualifier("locus_tag", gene_id);
        features.push(gene_feature);

        // RNA features share the gene's extent
        for &rna_type in RNA_TYPES {
            for _ in self.db.children(gene_id, rna_type) {
                let mut rna = Feature::new(rna_type, gene_location.clone());
                rna.add_qualifier("locus_tag", gene_id);
                features.push(rna);
            }
        }

        for pseudogene in self.db.children(gene_id, "pseudogene") {
            features.push(self.pseudogene_cds(gene, gene_id, pseudogene, ctx)?);
        }

        if let Some(mrna) = self.db.children(gene_id, "mRNA").first() {
            features.push(self.coding_cds(gene, gene_id, mrna, ctx)?);
        }

        Ok(features)
    }

    /// CDS flagged `pseudo`, on the joined exons when there are two or more
    fn pseudogene_cds(
        &self,
        gene: &GffFeature,
        gene_id: &str,
        pseudogene: &GffFeature,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Feature, AssemblyError> {
        let pseudo_id = pseudogene.id.as_deref().unwrap_or(gene_id);
        let exons = self.db.children(pseudo_id, "exon");

        let location = if exons.len() >= 2 {
            Location::Join(exons.iter().map(|e| range_of(e)).collect())
        } else {
            range_of(gene)
        };

        let mut cds = Feature::new("CDS", location);
        cds.add_qualifier("translation", ctx.translation(pseudo_id)?);
        cds.add_qualifier("locus_tag", format!("{gene_id}_0002"));
        cds.add_flag("pseudo");
        Ok(cds)
    }

    /// CDS of a protein-coding gene, on its mRNA's CDS segments
    fn coding_cds(
        &self,
        gene: &GffFeature,
        gene_id: &str,
        mrna: &GffFeature,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Feature, AssemblyError> {
        let mrna_id = mrna.id.as_deref().unwrap_or(gene_id);
        let segments = self.db.children(mrna_id, "CDS");

        let location = if segments.is_empty() {
            range_of(gene)
        } else {
            Location::join(segments.iter().map(|s| range_of(s)).collect())
        };

        // Proteins are named after either the gene or its transcript
        let protein_id = if ctx.has_protein(gene_id) {
            gene_id
        } else {
            mrna_id
        };

        let mut cds = Feature::new("CDS", location);
        cds.add_qualifier("translation", ctx.translation(protein_id)?);
        cds.add_qualifier("locus_tag", gene_id);
        ctx.annotate_cds(&mut cds, protein_id)?;
        Ok(cds)
    }
}

impl FeatureStrategy for GeneModelStrategy<'_> {
    fn build_features(
        &self,
        contig_id: &str,
        _sequence: &str,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Vec<Feature>, AssemblyError> {
        let genes = self.db.genes_on(contig_id);
        if genes.is_empty() {
            debug!("No gene models on contig {contig_id}");
        }

        let mut features = Vec::new();
        for gene in genes {
            let Some(gene_id) = gene.id.as_deref() else {
                debug!(
                    "Skipping gene without ID at {contig_id}:{}-{}",
                    gene.start, gene.end
                );
                continue;
            };
            features.extend(self.gene_features(gene, gene_id, ctx)?);
        }
        Ok(features)
    }
}

fn range_of(feature: &GffFeature) -> Location {
    Location::range(feature.start, feature.end, feature.strand)
}
