use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::cli::genbank::{convert, load_go_tables, resolve_species_metadata, ConversionJob};
use crate::cli::MetadataArgs;
use crate::core::metadata::SpeciesMetadata;
use crate::parsing::fasta::is_fasta_file;
use crate::utils::validation::{validate_directory, validate_input_files};

#[derive(Args)]
pub struct MultipleArgs {
    /// Directory of genome FASTA files
    #[arg(long, required = true)]
    pub genomes: PathBuf,

    /// Directory of protein FASTA files, named like the genomes
    #[arg(long, required = true)]
    pub proteins: PathBuf,

    /// Directory of eggNOG-mapper annotation tables, named like the genomes
    #[arg(long, required = true)]
    pub annotations: PathBuf,

    /// Two-column TSV: genome name, species name
    #[arg(long, required = true)]
    pub species: PathBuf,

    /// Output directory for GenBank files
    #[arg(short = 'o', long = "output", required = true)]
    pub output: PathBuf,

    /// GO ontology file (go-basic.obo)
    #[arg(short = 'b', long = "go-basic")]
    pub go_basic: Option<PathBuf>,

    #[command(flatten)]
    pub metadata: MetadataArgs,
}

/// Execute genbank-multiple subcommand
///
/// # Errors
///
/// Returns an error if an input directory is invalid or any genome fails to convert.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MultipleArgs, verbose: bool) -> anyhow::Result<()> {
    validate_directory(&args.genomes)?;
    validate_directory(&args.proteins)?;
    validate_directory(&args.annotations)?;
    validate_input_files([args.species.as_path()])?;
    if let Some(go_basic) = &args.go_basic {
        validate_input_files([go_basic.as_path()])?;
    }
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let species_names = parse_species_file(&args.species)?;
    let genomes = files_by_name(&args.genomes, is_fasta_file)?;
    let proteins = files_by_name(&args.proteins, is_fasta_file)?;
    let annotations = files_by_name(&args.annotations, |p| p.is_file())?;

    let go_tables = load_go_tables(args.go_basic.as_deref())?;
    // Several genomes may share a species; look each one up once
    let mut metadata_cache: HashMap<String, SpeciesMetadata> = HashMap::new();
    let mut converted = 0usize;

    for (name, genome_fasta) in &genomes {
        let (Some(protein_fasta), Some(annotation_table), Some(species)) = (
            proteins.get(name),
            annotations.get(name),
            species_names.get(name),
        ) else {
            warn!("Skipping {name}: missing protein FASTA, annotation table or species name");
            continue;
        };

        let metadata = match metadata_cache.get(species) {
            Some(metadata) => metadata.clone(),
            None => {
                let metadata = resolve_species_metadata(species, &args.metadata)?;
                metadata_cache.insert(species.clone(), metadata.clone());
                metadata
            }
        };

        let job = ConversionJob {
            genome_fasta: genome_fasta.clone(),
            protein_fasta: protein_fasta.clone(),
            annotations: annotation_table.clone(),
            gff: None,
            output: args.output.join(format!("{name}.gbk")),
        };

        info!("Converting {name} ({species})");
        let count = convert(&job, &metadata, go_tables.as_ref())?;
        converted += 1;

        if verbose {
            eprintln!("{name}: {count} contig records");
        }
    }

    if verbose {
        eprintln!(
            "Wrote {converted} GenBank files to {}",
            args.output.display()
        );
    }

    Ok(())
}

/// Compression suffixes removed before the file type suffix
const COMPRESSION_SUFFIXES: &[&str] = &[".gz", ".bgz"];

/// File type suffixes of genome, protein and annotation files, longest first
const KNOWN_SUFFIXES: &[&str] = &[
    ".emapper.annotations",
    ".annotations",
    ".fasta",
    ".fna",
    ".faa",
    ".fas",
    ".fa",
    ".tsv",
];

/// Genome name of a file: its file name without compression and file type
/// suffixes (`E.coli_K12.emapper.annotations` -> `E.coli_K12`). Unknown
/// file types lose their last extension only.
pub fn genome_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;

    let mut name = file_name;
    if let Some(stripped) = strip_suffix_ignore_case(name, COMPRESSION_SUFFIXES) {
        name = stripped;
    }
    let name = match strip_suffix_ignore_case(name, KNOWN_SUFFIXES) {
        Some(stripped) => stripped,
        None => name.rsplit_once('.').map_or(name, |(stem, _)| stem),
    };

    Some(name.to_string()).filter(|n| !n.is_empty())
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffixes: &[&str]) -> Option<&'a str> {
    let lower = name.to_ascii_lowercase();
    suffixes
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map(|suffix| &name[..name.len() - suffix.len()])
}

/// Files of a directory accepted by `keep`, keyed by genome name
fn files_by_name(
    dir: &Path,
    keep: impl Fn(&Path) -> bool,
) -> anyhow::Result<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || !keep(&path) {
            continue;
        }
        if let Some(name) = genome_name(&path) {
            if let Some(previous) = files.insert(name.clone(), path.clone()) {
                warn!(
                    "Two files for genome {name} in {}: {} and {}, using the latter",
                    dir.display(),
                    previous.display(),
                    path.display()
                );
            }
        }
    }

    Ok(files)
}

/// Parse the genome name -> species name table
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line has no species name.
pub fn parse_species_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_species_text(&content)
}

/// Parse genome name -> species name text
///
/// # Errors
///
/// Returns an error if a line has no species name.
pub fn parse_species_text(text: &str) -> anyhow::Result<HashMap<String, String>> {
    let mut species = HashMap::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, species_name) = line
            .split_once('\t')
            .map(|(a, b)| (a.trim(), b.trim()))
            .filter(|(a, b)| !a.is_empty() && !b.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Line {} of species table has no species name", i + 1))?;

        species.insert(name.to_string(), species_name.to_string());
    }

    Ok(species)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_name() {
        assert_eq!(genome_name(Path::new("/d/sample.fna")).as_deref(), Some("sample"));
        assert_eq!(
            genome_name(Path::new("sample.emapper.annotations")).as_deref(),
            Some("sample")
        );
        assert_eq!(genome_name(Path::new(".fna")), None);
        assert_eq!(genome_name(Path::new("sample.FNA.gz")).as_deref(), Some("sample"));
        assert_eq!(genome_name(Path::new("sample.txt")).as_deref(), Some("sample"));
    }

    #[test]
    fn test_genome_name_keeps_dotted_names() {
        let names: Vec<Option<String>> = [
            "E.coli_K12.fna",
            "E.coli_K12.faa.gz",
            "E.coli_K12.emapper.annotations",
            "E.faecalis.fna",
        ]
        .iter()
        .map(|f| genome_name(Path::new(f)))
        .collect();
        assert_eq!(names[0].as_deref(), Some("E.coli_K12"));
        assert_eq!(names[1].as_deref(), Some("E.coli_K12"));
        assert_eq!(names[2].as_deref(), Some("E.coli_K12"));
        assert_eq!(names[3].as_deref(), Some("E.faecalis"));
    }

    #[test]
    fn test_parse_species_text() {
        let text = "# genome\tspecies\nsample_a\tEscherichia coli\n\nsample_b\tBacillus subtilis 168\n";
        let species = parse_species_text(text).unwrap();
        assert_eq!(species.len(), 2);
        assert_eq!(species["sample_b"], "Bacillus subtilis 168");
    }

    #[test]
    fn test_parse_species_text_missing_name() {
        assert!(parse_species_text("sample_a\n").is_err());
    }

    #[test]
    fn test_files_by_name_pairs_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.fna"), ">c\nA\n").unwrap();
        std::fs::write(dir.path().join("b.fasta"), ">c\nA\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = files_by_name(dir.path(), is_fasta_file).unwrap();
        let names: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
