use serde::{Deserialize, Serialize};
use std::path::Path;

/// Molecule topology written on the LOCUS line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Linear,
    Circular,
}

/// Descriptive information about the organism a genome comes from.
///
/// Attached to every contig record. Every field is optional: absent fields are
/// left out of the output rather than filled with a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesMetadata {
    /// DEFINITION line, e.g. "Arabidopsis thaliana genome"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// ORGANISM name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,

    /// Taxonomic lineage, root first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxonomy: Vec<String>,

    /// SOURCE line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Taxon cross reference, e.g. "taxon:3702"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_xref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_stage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mol_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<Topology>,

    /// GenBank division code (PLN, BCT, INV, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file_division: Option<String>,
}

impl SpeciesMetadata {
    /// Minimal metadata derived from a species name alone
    pub fn for_species(species_name: &str) -> Self {
        let name = compatible_species_name(species_name);
        Self {
            description: Some(format!("{name} genome")),
            organism: Some(name.clone()),
            source: Some(name.clone()),
            keywords: vec![name],
            ..Self::default()
        }
    }

    /// Load metadata from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid metadata JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse metadata from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Parse` if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fill fields from `other` that are set there, keeping everything else
    #[must_use]
    pub fn merged_with(mut self, other: SpeciesMetadata) -> Self {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.description, other.description);
        take(&mut self.organism, other.organism);
        take(&mut self.source, other.source);
        take(&mut self.db_xref, other.db_xref);
        take(&mut self.isolate, other.isolate);
        take(&mut self.cell_type, other.cell_type);
        take(&mut self.dev_stage, other.dev_stage);
        take(&mut self.mol_type, other.mol_type);
        take(&mut self.topology, other.topology);
        take(&mut self.data_file_division, other.data_file_division);
        if !other.taxonomy.is_empty() {
            self.taxonomy = other.taxonomy;
        }
        if !other.keywords.is_empty() {
            self.keywords = other.keywords;
        }
        self
    }
}

/// Species names end up in file-like fields, so '/' is not allowed
pub fn compatible_species_name(species_name: &str) -> String {
    species_name.trim().replace('/', "_")
}

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read species metadata: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse species metadata: {0}")]
    Parse(#[from] serde_json::Error),
}
