use std::collections::HashMap;

/// One of the three Gene Ontology sub-ontologies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoNamespace {
    CellularComponent,
    MolecularFunction,
    BiologicalProcess,
}

impl GoNamespace {
    /// Parse a namespace as written in OBO files (`namespace: cellular_component`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "cellular_component" => Some(GoNamespace::CellularComponent),
            "molecular_function" => Some(GoNamespace::MolecularFunction),
            "biological_process" => Some(GoNamespace::BiologicalProcess),
            _ => None,
        }
    }

    /// GenBank qualifier carrying terms of this namespace
    pub fn qualifier(self) -> &'static str {
        match self {
            GoNamespace::CellularComponent => "go_component",
            GoNamespace::MolecularFunction => "go_function",
            GoNamespace::BiologicalProcess => "go_process",
        }
    }
}

impl std::fmt::Display for GoNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CellularComponent => write!(f, "cellular_component"),
            Self::MolecularFunction => write!(f, "molecular_function"),
            Self::BiologicalProcess => write!(f, "biological_process"),
        }
    }
}

/// Outcome of looking up a GO id against the namespace and alias tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoResolution<'a> {
    /// The id is a current term
    Direct(GoNamespace),
    /// The id is a deprecated alternative of `current`
    Alias {
        current: &'a str,
        namespace: GoNamespace,
    },
    /// The id is an alias whose replacement carries no namespace
    Unclassified { current: &'a str },
}

impl GoResolution<'_> {
    pub fn namespace(&self) -> Option<GoNamespace> {
        match self {
            Self::Direct(ns) | Self::Alias { namespace: ns, .. } => Some(*ns),
            Self::Unclassified { .. } => None,
        }
    }
}

/// GO namespace and deprecated-id lookup tables.
///
/// Built once per run (usually from `go-basic.obo`) and shared read-only
/// with the assembler.
#[derive(Debug, Clone, Default)]
pub struct GoTables {
    /// GO id -> namespace
    namespaces: HashMap<String, GoNamespace>,

    /// Deprecated (alt) GO id -> current GO id
    alternatives: HashMap<String, String>,
}

impl GoTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_term(&mut self, go_id: impl Into<String>, namespace: GoNamespace) {
        self.namespaces.insert(go_id.into(), namespace);
    }

    pub fn insert_alternative(&mut self, alt_id: impl Into<String>, current: impl Into<String>) {
        self.alternatives.insert(alt_id.into(), current.into());
    }

    #[must_use]
    pub fn with_term(mut self, go_id: impl Into<String>, namespace: GoNamespace) -> Self {
        self.insert_term(go_id, namespace);
        self
    }

    #[must_use]
    pub fn with_alternative(mut self, alt_id: impl Into<String>, current: impl Into<String>) -> Self {
        self.insert_alternative(alt_id, current);
        self
    }

    pub fn namespace(&self, go_id: &str) -> Option<GoNamespace> {
        self.namespaces.get(go_id).copied()
    }

    pub fn alternative(&self, alt_id: &str) -> Option<&str> {
        self.alternatives.get(alt_id).map(String::as_str)
    }

    /// Resolve a GO id to its namespace.
    ///
    /// Ids present in the namespace table resolve to their own namespace.
    /// Otherwise the alias table is consulted and the replacement's namespace
    /// is used. Returns `None` when the id is in neither table.
    pub fn resolve(&self, go_id: &str) -> Option<GoResolution<'_>> {
        if let Some(ns) = self.namespace(go_id) {
            return Some(GoResolution::Direct(ns));
        }

        let current = self.alternative(go_id)?;
        Some(match self.namespace(current) {
            Some(namespace) => GoResolution::Alias { current, namespace },
            None => GoResolution::Unclassified { current },
        })
    }

    pub fn term_count(&self) -> usize {
        self.namespaces.len()
    }

    pub fn alternative_count(&self) -> usize {
        self.alternatives.len()
    }
}
