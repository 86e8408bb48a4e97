//! Species metadata lookup against the EBI ENA taxonomy service.
//!
//! The service is queried by scientific name:
//!
//! ```text
//! GET https://www.ebi.ac.uk/ena/taxonomy/rest/scientific-name/Arabidopsis%20thaliana
//! ```
//!
//! and answers with a JSON array of matching taxa. The first entry is used to
//! fill lineage, GenBank division and the `taxon:` cross reference.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::metadata::{compatible_species_name, SpeciesMetadata};

pub const EBI_TAXONOMY_URL: &str = "https://www.ebi.ac.uk/ena/taxonomy/rest/scientific-name";

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Taxonomy request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Taxonomy service returned status {status} for '{species}'")]
    Status { species: String, status: u16 },

    #[error("Species '{0}' not found in EBI taxonomy")]
    NotFound(String),

    #[error("Failed to parse taxonomy response: {0}")]
    Json(#[from] serde_json::Error),
}

/// One taxon as returned by the ENA taxonomy REST API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbiTaxon {
    pub tax_id: String,
    pub scientific_name: String,
    #[serde(default)]
    pub lineage: String,
    #[serde(default)]
    pub division: Option<String>,
}

impl EbiTaxon {
    /// Lineage as a list, root first ("Eukaryota; Viridiplantae; " -> ["Eukaryota", "Viridiplantae"])
    pub fn lineage_list(&self) -> Vec<String> {
        self.lineage
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Build species metadata for `species_name` from this taxon
    pub fn to_metadata(&self, species_name: &str) -> SpeciesMetadata {
        let mut metadata = SpeciesMetadata::for_species(species_name);
        metadata.taxonomy = self.lineage_list();
        metadata.data_file_division = self.division.clone();
        metadata.db_xref = Some(format!("taxon:{}", self.tax_id));
        metadata
    }
}

/// Parse the JSON body returned by the taxonomy service
///
/// # Errors
///
/// Returns `TaxonomyError::Json` for invalid JSON or `TaxonomyError::NotFound`
/// if the array is empty.
pub fn parse_taxonomy_response(
    body: &str,
    species_name: &str,
) -> Result<SpeciesMetadata, TaxonomyError> {
    let taxa: Vec<EbiTaxon> = serde_json::from_str(body)?;
    let taxon = taxa
        .first()
        .ok_or_else(|| TaxonomyError::NotFound(species_name.to_string()))?;

    debug!(
        "Species '{species_name}' resolved to taxon {} ({})",
        taxon.tax_id, taxon.scientific_name
    );
    Ok(taxon.to_metadata(species_name))
}

/// Blocking client for the EBI taxonomy service
pub struct TaxonomyClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl TaxonomyClient {
    /// Create a client against the public EBI endpoint
    ///
    /// # Errors
    ///
    /// Returns `TaxonomyError::Http` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, TaxonomyError> {
        Self::with_base_url(EBI_TAXONOMY_URL)
    }

    /// Create a client against a custom endpoint
    ///
    /// # Errors
    ///
    /// Returns `TaxonomyError::Http` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, TaxonomyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("eggnog2gbk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Lookup URL for a species, the name encoded as one path segment
    pub fn species_url(&self, species_name: &str) -> String {
        let name = compatible_species_name(species_name);
        format!("{}/{}", self.base_url, urlencoding::encode(&name))
    }

    /// Fetch species metadata by scientific name
    ///
    /// # Errors
    ///
    /// Returns `TaxonomyError::Http` on transport failure, `TaxonomyError::Status`
    /// on a non-success response, or `TaxonomyError::NotFound` if no taxon matches.
    pub fn fetch(&self, species_name: &str) -> Result<SpeciesMetadata, TaxonomyError> {
        let url = self.species_url(species_name);
        info!("Querying EBI taxonomy for '{species_name}'");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(TaxonomyError::NotFound(species_name.to_string()));
        }
        if !status.is_success() {
            return Err(TaxonomyError::Status {
                species: species_name.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        parse_taxonomy_response(&body, species_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_url_encodes_reserved_characters() {
        let client = TaxonomyClient::with_base_url("https://example.org/taxonomy/").unwrap();

        let url = reqwest::Url::parse(&client.species_url("Bacterium sp. #12")).unwrap();
        assert_eq!(url.path(), "/taxonomy/Bacterium%20sp.%20%2312");
        assert_eq!(url.fragment(), None);

        let url = reqwest::Url::parse(&client.species_url("Vibrio sp. strain?A")).unwrap();
        assert_eq!(url.path(), "/taxonomy/Vibrio%20sp.%20strain%3FA");
        assert_eq!(url.query(), None);

        assert_eq!(
            client.species_url("Escherichia coli"),
            "https://example.org/taxonomy/Escherichia%20coli"
        );
    }

    const RESPONSE: &str = r#"[{"taxId":"3702","scientificName":"Arabidopsis thaliana","formalName":"true","rank":"species","division":"PLN","lineage":"Eukaryota; Viridiplantae; Streptophyta; Embryophyta; Tracheophyta; Spermatophyta; Magnoliopsida; eudicotyledons; Gunneridae; Pentapetalae; rosids; malvids; Brassicales; Brassicaceae; Camelineae; Arabidopsis; ","geneticCode":"1","mitochondrialGeneticCode":"1","submittable":"true"}]"#;

    #[test]
    fn test_parse_response() {
        let meta = parse_taxonomy_response(RESPONSE, "Arabidopsis thaliana").unwrap();
        assert_eq!(meta.db_xref.as_deref(), Some("taxon:3702"));
        assert_eq!(meta.data_file_division.as_deref(), Some("PLN"));
        assert_eq!(meta.taxonomy.first().map(String::as_str), Some("Eukaryota"));
        assert_eq!(meta.taxonomy.last().map(String::as_str), Some("Arabidopsis"));
        assert_eq!(meta.taxonomy.len(), 16);
        assert_eq!(meta.organism.as_deref(), Some("Arabidopsis thaliana"));
        assert_eq!(
            meta.description.as_deref(),
            Some("Arabidopsis thaliana genome")
        );
    }

    #[test]
    fn test_empty_response_is_not_found() {
        let result = parse_taxonomy_response("[]", "Nothing here");
        assert!(matches!(result, Err(TaxonomyError::NotFound(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_taxonomy_response("<html>", "x");
        assert!(matches!(result, Err(TaxonomyError::Json(_))));
    }
}
