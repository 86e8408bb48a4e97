//! Command-line interface for eggnog2gbk.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **genbank**: Build one GenBank file from a genome, its proteins and their eggNOG annotations
//! - **genbank-multiple**: Do the same for every genome in a directory
//!
//! ## Usage
//!
//! ```text
//! # One genome, species metadata fetched from EBI
//! eggnog2gbk genbank -g genome.fna -p proteins.faa -a genome.emapper.annotations \
//!     -s "Escherichia coli" -b go-basic.obo -o genome.gbk
//!
//! # Offline, with metadata from a JSON file
//! eggnog2gbk genbank -g genome.fna -p proteins.faa -a annotations.tsv \
//!     -s "Escherichia coli" --species-metadata ecoli.json -o genome.gbk
//!
//! # Gene structure from a GFF3 file
//! eggnog2gbk genbank -g genome.fna -p proteins.faa -a annotations.tsv \
//!     -s "Ectocarpus siliculosus" --gff genes.gff3 -b go-basic.obo -o genome.gbk
//!
//! # Many genomes, paired by file name
//! eggnog2gbk genbank-multiple --genomes fna/ --proteins faa/ --annotations annot/ \
//!     --species species.tsv -b go-basic.obo -o gbk/
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::metadata::{SpeciesMetadata, Topology};

pub mod genbank;
pub mod multiple;

#[derive(Parser)]
#[command(name = "eggnog2gbk")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Create GenBank files from FASTA and eggNOG-mapper annotations")]
#[command(
    long_about = "eggnog2gbk builds GenBank files from a genome FASTA, a protein FASTA and an eggNOG-mapper annotation table.\n\nEach CDS receives:\n- its protein translation\n- GO terms split into go_component / go_function / go_process\n- EC numbers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a GenBank file for one genome
    Genbank(genbank::GenbankArgs),

    /// Build GenBank files for every genome in a directory
    GenbankMultiple(multiple::MultipleArgs),
}

/// Options controlling species metadata, shared by both commands
#[derive(Args, Clone, Debug, Default)]
pub struct MetadataArgs {
    /// JSON file with species metadata (skips the EBI taxonomy lookup)
    #[arg(long)]
    pub species_metadata: Option<PathBuf>,

    /// Do not query EBI; derive metadata from the species name only
    #[arg(long)]
    pub no_taxonomy_lookup: bool,

    /// Isolate name for the source feature
    #[arg(long)]
    pub isolate: Option<String>,

    /// Cell type for the source feature
    #[arg(long)]
    pub cell_type: Option<String>,

    /// Developmental stage for the source feature
    #[arg(long)]
    pub dev_stage: Option<String>,

    /// Molecule type for the source feature (e.g. "genomic DNA")
    #[arg(long)]
    pub mol_type: Option<String>,

    /// Molecule topology
    #[arg(long, value_enum)]
    pub topology: Option<Topology>,
}

impl MetadataArgs {
    /// Metadata fields set explicitly on the command line
    pub fn overrides(&self) -> SpeciesMetadata {
        SpeciesMetadata {
            isolate: self.isolate.clone(),
            cell_type: self.cell_type.clone(),
            dev_stage: self.dev_stage.clone(),
            mol_type: self.mol_type.clone(),
            topology: self.topology,
            ..SpeciesMetadata::default()
        }
    }
}
