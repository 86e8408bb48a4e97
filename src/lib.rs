//! # eggnog2gbk
//!
//! A library for building GenBank files from eggNOG-mapper functional annotations.
//!
//! Genome assemblies annotated with eggNOG-mapper end up as three loose files: the
//! contig sequences, the predicted proteins, and a table of orthology-derived
//! functions. Tools such as Pathway Tools expect all of that in one GenBank file.
//!
//! `eggnog2gbk` joins them: each contig becomes a GenBank record whose CDS carries
//! the protein translation, GO terms split by namespace and EC numbers.
//!
//! ## Features
//!
//! - **GO namespace resolution**: terms are sorted into `go_component`,
//!   `go_function` and `go_process`, deprecated ids resolved through `alt_id`
//! - **EC numbers**: `ec:` prefixes stripped, `;` and `,` separators accepted
//! - **Species metadata**: lineage, division and taxon id from the EBI taxonomy,
//!   or from a local JSON file
//! - **Gene models**: optional GFF3 input for real gene / RNA / CDS / pseudogene structure
//! - **All-or-nothing output**: the GenBank file only appears if every contig assembles
//!
//! ## Example
//!
//! ```rust,no_run
//! use eggnog2gbk::assembly::{AnnotationContext, Assembler};
//! use eggnog2gbk::core::metadata::SpeciesMetadata;
//! use eggnog2gbk::output::genbank::write_genbank_file;
//! use eggnog2gbk::parsing::{annotation, fasta, obo};
//! use std::path::Path;
//!
//! let contigs = fasta::load_sequences(Path::new("genome.fna")).unwrap();
//! let proteins = fasta::load_sequences(Path::new("proteins.faa")).unwrap();
//! let annotations = annotation::parse_annotation_file(Path::new("genome.emapper.annotations")).unwrap();
//! let go_tables = obo::parse_obo_file(Path::new("go-basic.obo")).unwrap();
//! let metadata = SpeciesMetadata::for_species("Escherichia coli");
//!
//! let ctx = AnnotationContext::new(&proteins, &annotations, Some(&go_tables));
//! let records = Assembler::new(ctx, &metadata).assemble(&contigs).unwrap();
//! write_genbank_file(Path::new("genome.gbk"), &records).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`assembly`]: Record assembly and feature construction strategies
//! - [`core`]: Species metadata, GO tables and the output record model
//! - [`parsing`]: Parsers for FASTA, eggNOG-mapper tables, GO OBO and GFF3
//! - [`taxonomy`]: EBI taxonomy client
//! - [`output`]: GenBank writer
//! - [`cli`]: Command-line interface implementation

pub mod assembly;
pub mod cli;
pub mod core;
pub mod output;
pub mod parsing;
pub mod taxonomy;
pub mod utils;

// Re-export commonly used types for convenience
pub use assembly::{AnnotationContext, Assembler, AssemblyError};
pub use core::go::{GoNamespace, GoTables};
pub use core::metadata::SpeciesMetadata;
pub use core::record::{Feature, Location, OutputContigRecord, Strand};
