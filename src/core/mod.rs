//! Core data types for GenBank assembly.
//!
//! - [`SpeciesMetadata`](metadata::SpeciesMetadata): organism information attached to every record
//! - [`GoTables`](go::GoTables): GO namespace and deprecated-id lookup tables
//! - [`OutputContigRecord`](record::OutputContigRecord), [`Feature`](record::Feature),
//!   [`Location`](record::Location): the assembled output model
//!
//! ## Coordinates
//!
//! Every [`Location`](record::Location) is 1-based and inclusive, the way GFF and
//! GenBank present them. Conversion to zero-based half-open ranges only happens
//! in the writer.

pub mod go;
pub mod metadata;
pub mod record;
