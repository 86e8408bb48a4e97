use chrono::NaiveDate;

use crate::core::metadata::SpeciesMetadata;

/// Strand of a feature location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    /// Parse a GFF strand column (`+`, `-`, `.`, `?`)
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

/// A feature location in 1-based, inclusive coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Range { start: u64, end: u64, strand: Strand },
    /// Compound location made of disjoint ranges (exons), in genomic order
    Join(Vec<Location>),
}

impl Location {
    pub fn range(start: u64, end: u64, strand: Strand) -> Self {
        Location::Range { start, end, strand }
    }

    /// Whole-sequence span with no strand information
    pub fn span(length: u64) -> Self {
        Location::range(1, length, Strand::Unknown)
    }

    /// Join a list of ranges; a single range collapses to itself
    pub fn join(mut parts: Vec<Location>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Location::Join(parts)
        }
    }

    pub fn start(&self) -> u64 {
        match self {
            Location::Range { start, .. } => *start,
            Location::Join(parts) => parts.iter().map(Location::start).min().unwrap_or(0),
        }
    }

    pub fn end(&self) -> u64 {
        match self {
            Location::Range { end, .. } => *end,
            Location::Join(parts) => parts.iter().map(Location::end).max().unwrap_or(0),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Location::Join(_))
    }
}

/// One feature of a contig record (source, gene, CDS, mRNA, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub kind: String,
    pub location: Location,
    /// Ordered qualifiers; a `None` value is a flag qualifier such as `/pseudo`
    pub qualifiers: Vec<(String, Option<String>)>,
}

impl Feature {
    pub fn new(kind: impl Into<String>, location: Location) -> Self {
        Self {
            kind: kind.into(),
            location,
            qualifiers: Vec::new(),
        }
    }

    pub fn add_qualifier(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.qualifiers.push((key.into(), Some(value.into())));
    }

    pub fn add_flag(&mut self, key: impl Into<String>) {
        self.qualifiers.push((key.into(), None));
    }

    /// Add one qualifier per value, in order
    pub fn add_qualifiers<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add_qualifier(key, value);
        }
    }

    /// All values of a qualifier, in order
    pub fn qualifier_values(&self, key: &str) -> Vec<&str> {
        self.qualifiers
            .iter()
            .filter(|(k, _)| k == key)
            .filter_map(|(_, v)| v.as_deref())
            .collect()
    }

    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifier_values(key).into_iter().next()
    }

    pub fn has_qualifier(&self, key: &str) -> bool {
        self.qualifiers.iter().any(|(k, _)| k == key)
    }
}

/// A fully assembled contig, ready to be written
#[derive(Debug, Clone)]
pub struct OutputContigRecord {
    pub id: String,
    pub sequence: String,
    pub metadata: SpeciesMetadata,
    pub date: NaiveDate,
    pub features: Vec<Feature>,
}

impl OutputContigRecord {
    pub fn new(
        id: impl Into<String>,
        sequence: impl Into<String>,
        metadata: SpeciesMetadata,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
            metadata,
            date,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> u64 {
        self.sequence.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Features of a given kind, in order
    pub fn features_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features.iter().filter(move |f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_parse() {
        assert_eq!(Strand::parse("+"), Strand::Forward);
        assert_eq!(Strand::parse("-"), Strand::Reverse);
        assert_eq!(Strand::parse("."), Strand::Unknown);
        assert_eq!(Strand::parse("?"), Strand::Unknown);
    }

    #[test]
    fn test_join_bounds() {
        let loc = Location::join(vec![
            Location::range(10, 20, Strand::Forward),
            Location::range(40, 55, Strand::Forward),
        ]);
        assert!(loc.is_compound());
        assert_eq!(loc.start(), 10);
        assert_eq!(loc.end(), 55);
    }

    #[test]
    fn test_join_single_collapses() {
        let loc = Location::join(vec![Location::range(3, 9, Strand::Reverse)]);
        assert_eq!(loc, Location::range(3, 9, Strand::Reverse));
    }

    #[test]
    fn test_feature_qualifiers() {
        let mut f = Feature::new("CDS", Location::span(90));
        f.add_qualifier("locus_tag", "c1");
        f.add_qualifiers("EC_number", ["1.1.1.1", "2.2.2.2"]);
        f.add_flag("pseudo");

        assert_eq!(f.qualifier("locus_tag"), Some("c1"));
        assert_eq!(f.qualifier_values("EC_number"), vec!["1.1.1.1", "2.2.2.2"]);
        assert!(f.has_qualifier("pseudo"));
        assert!(f.qualifier_values("pseudo").is_empty());
    }
}
