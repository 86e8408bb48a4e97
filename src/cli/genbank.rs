use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::assembly::{AnnotationContext, Assembler, GeneModelStrategy};
use crate::cli::MetadataArgs;
use crate::core::go::GoTables;
use crate::core::metadata::SpeciesMetadata;
use crate::parsing::{annotation, fasta, gff, obo};
use crate::output::genbank::write_genbank_file;
use crate::taxonomy::TaxonomyClient;
use crate::utils::validation::validate_input_files;

#[derive(Args)]
pub struct GenbankArgs {
    /// Genome FASTA (contigs / scaffolds / chromosomes)
    #[arg(short = 'g', long = "genome", required = true)]
    pub genome_fasta: PathBuf,

    /// Protein FASTA, one protein per contig id
    #[arg(short = 'p', long = "proteins", required = true)]
    pub protein_fasta: PathBuf,

    /// eggNOG-mapper annotation table
    #[arg(short = 'a', long = "annotations", required = true)]
    pub annotations: PathBuf,

    /// Species scientific name (must be known to the EBI taxonomy)
    #[arg(short = 's', long = "species", required = true)]
    pub species: String,

    /// Output GenBank file
    #[arg(short = 'o', long = "output", required = true)]
    pub output: PathBuf,

    /// GO ontology file (go-basic.obo); required when genes carry GO terms
    #[arg(short = 'b', long = "go-basic")]
    pub go_basic: Option<PathBuf>,

    /// GFF3 gene models; when given, gene structure is taken from it
    #[arg(long)]
    pub gff: Option<PathBuf>,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

/// Paths for one genome conversion
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub genome_fasta: PathBuf,
    pub protein_fasta: PathBuf,
    pub annotations: PathBuf,
    pub gff: Option<PathBuf>,
    pub output: PathBuf,
}

impl ConversionJob {
    /// Input files of this job, in the order they are validated
    pub fn input_paths(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.genome_fasta.as_path(),
            self.protein_fasta.as_path(),
            self.annotations.as_path(),
        ];
        if let Some(gff) = &self.gff {
            paths.push(gff.as_path());
        }
        paths
    }
}

/// Execute genbank subcommand
///
/// # Errors
///
/// Returns an error if an input is invalid, cannot be parsed, or assembly fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenbankArgs, verbose: bool) -> anyhow::Result<()> {
    let job = ConversionJob {
        genome_fasta: args.genome_fasta,
        protein_fasta: args.protein_fasta,
        annotations: args.annotations,
        gff: args.gff,
        output: args.output,
    };

    // Validate every path before doing any work
    validate_input_files(job.input_paths())?;
    if let Some(go_basic) = &args.go_basic {
        validate_input_files([go_basic.as_path()])?;
    }

    let go_tables = load_go_tables(args.go_basic.as_deref())?;
    let metadata = resolve_species_metadata(&args.species, &args.metadata)?;

    let count = convert(&job, &metadata, go_tables.as_ref())?;

    if verbose {
        eprintln!(
            "Wrote {count} contig records to {}",
            job.output.display()
        );
    }

    Ok(())
}

/// Load GO tables when an OBO file is given
///
/// # Errors
///
/// Returns an error if the OBO file cannot be parsed.
pub fn load_go_tables(go_basic: Option<&Path>) -> anyhow::Result<Option<GoTables>> {
    go_basic
        .map(|path| {
            obo::parse_obo_file(path)
                .with_context(|| format!("Failed to read GO ontology {}", path.display()))
        })
        .transpose()
}

/// Species metadata from a JSON file, the EBI taxonomy, or the name alone,
/// with command-line fields applied on top
///
/// # Errors
///
/// Returns an error if the metadata file is invalid or the lookup fails.
pub fn resolve_species_metadata(
    species: &str,
    args: &MetadataArgs,
) -> anyhow::Result<SpeciesMetadata> {
    let base = if let Some(path) = &args.species_metadata {
        let from_file = SpeciesMetadata::load_from_file(path)
            .with_context(|| format!("Failed to read species metadata {}", path.display()))?;
        SpeciesMetadata::for_species(species).merged_with(from_file)
    } else if args.no_taxonomy_lookup {
        SpeciesMetadata::for_species(species)
    } else {
        TaxonomyClient::new()?
            .fetch(species)
            .with_context(|| format!("Failed to fetch taxonomy for '{species}'"))?
    };

    Ok(base.merged_with(args.overrides()))
}

/// Run one conversion: load inputs, assemble every contig, write the GenBank file.
///
/// Nothing is written unless every contig assembles.
///
/// # Errors
///
/// Returns an error if an input cannot be parsed, assembly fails, or the
/// output cannot be written.
pub fn convert(
    job: &ConversionJob,
    metadata: &SpeciesMetadata,
    go_tables: Option<&GoTables>,
) -> anyhow::Result<usize> {
    info!("Formatting fasta and annotation files");

    let contigs = fasta::load_sequences(&job.genome_fasta)
        .with_context(|| format!("Failed to read genome {}", job.genome_fasta.display()))?;
    let proteins = fasta::load_sequences(&job.protein_fasta)
        .with_context(|| format!("Failed to read proteins {}", job.protein_fasta.display()))?;
    let annotations = annotation::parse_annotation_file(&job.annotations).with_context(|| {
        format!("Failed to read annotations {}", job.annotations.display())
    })?;
    let gene_models = job
        .gff
        .as_deref()
        .map(|path| {
            gff::parse_gff_file(path)
                .with_context(|| format!("Failed to read gene models {}", path.display()))
        })
        .transpose()?;

    info!(
        "Loaded {} contigs, {} proteins, {} annotated genes",
        contigs.len(),
        proteins.len(),
        annotations.len()
    );

    let ctx = AnnotationContext::new(&proteins, &annotations, go_tables);
    let mut assembler = Assembler::new(ctx, metadata);
    if let Some(db) = &gene_models {
        assembler = assembler.with_strategy(GeneModelStrategy::new(db));
    }

    let records = assembler
        .assemble(&contigs)
        .with_context(|| format!("Failed to assemble {}", job.genome_fasta.display()))?;

    write_genbank_file(&job.output, &records)
        .with_context(|| format!("Failed to write {}", job.output.display()))?;

    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn job(dir: &TempDir, proteins: &str) -> ConversionJob {
        ConversionJob {
            genome_fasta: write(dir, "genome.fna", ">c2\nACGTACGT\n>c1\nGGGGCCCC\n"),
            protein_fasta: write(dir, "proteins.faa", proteins),
            annotations: write(
                dir,
                "annotations.tsv",
                "#query\tGOs\tEC\nc1\t-\t1.1.1.1;ec:2.2.2.2\nc2\t-\t-\n",
            ),
            gff: None,
            output: dir.path().join("out.gbk"),
        }
    }

    #[test]
    fn test_convert_writes_sorted_records() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir, ">c1\nMK\n>c2\nMV\n");
        let metadata = SpeciesMetadata::for_species("Escherichia coli");

        let count = convert(&job, &metadata, None).unwrap();
        assert_eq!(count, 2);

        let text = std::fs::read_to_string(&job.output).unwrap();
        let names: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("LOCUS"))
            .filter_map(|l| l.split_whitespace().nth(1))
            .collect();
        assert_eq!(names, vec!["c1", "c2"]);
        assert!(text.contains("2.2.2.2"));
        assert!(!text.contains("ec:2.2.2.2"));
    }

    #[test]
    fn test_convert_missing_protein_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(&dir, ">c2\nMV\n");
        let metadata = SpeciesMetadata::default();

        let err = convert(&job, &metadata, None).unwrap_err();
        assert!(format!("{err:#}").contains("No protein sequence for 'c1'"));
        assert!(!job.output.exists());
    }

    #[test]
    fn test_input_paths_include_gff() {
        let job = ConversionJob {
            genome_fasta: PathBuf::from("g.fna"),
            protein_fasta: PathBuf::from("p.faa"),
            annotations: PathBuf::from("a.tsv"),
            gff: Some(PathBuf::from("m.gff3")),
            output: PathBuf::from("o.gbk"),
        };
        assert_eq!(job.input_paths().len(), 4);
    }

    #[test]
    fn test_resolve_metadata_offline_with_overrides() {
        let args = MetadataArgs {
            no_taxonomy_lookup: true,
            isolate: Some("Ec32".to_string()),
            ..MetadataArgs::default()
        };
        let meta = resolve_species_metadata("Ectocarpus siliculosus", &args).unwrap();
        assert_eq!(meta.organism.as_deref(), Some("Ectocarpus siliculosus"));
        assert_eq!(meta.isolate.as_deref(), Some("Ec32"));
        assert!(meta.db_xref.is_none());
    }
}
