//! CURIE prefix map (the `prefix` relation).
//!
//! Statements are stored in CURIE form whenever the IRI falls under a known
//! base, so `http://www.w3.org/2002/07/owl#Class` and `owl:Class` are the same
//! term once ingested.

use serde::{Deserialize, Serialize};

/// One `prefix` row: a CURIE prefix and the IRI base it abbreviates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prefix {
    pub prefix: String,
    pub base: String,
}

/// Ordered set of prefix declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixMap {
    entries: Vec<Prefix>,
}

impl PrefixMap {
    /// An empty map without even the W3C prefixes.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The vocabularies the classifier depends on.
    pub fn standard() -> Self {
        let mut map = Self::empty();
        map.declare("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        map.declare("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        map.declare("owl", "http://www.w3.org/2002/07/owl#");
        map.declare("xsd", "http://www.w3.org/2001/XMLSchema#");
        map
    }

    /// Add or rebind a prefix.
    pub fn declare(&mut self, prefix: impl Into<String>, base: impl Into<String>) {
        let prefix = prefix.into();
        let base = base.into();
        match self.entries.iter_mut().find(|e| e.prefix == prefix) {
            Some(existing) => existing.base = base,
            None => self.entries.push(Prefix { prefix, base }),
        }
    }

    /// Abbreviate an IRI with the longest matching base.
    ///
    /// Returns the input unchanged when no base matches or the local part would
    /// not be a plausible CURIE reference.
    pub fn contract(&self, iri: &str) -> String {
        let best = self
            .entries
            .iter()
            .filter(|e| !e.base.is_empty() && iri.starts_with(e.base.as_str()))
            .max_by_key(|e| e.base.len());
        match best {
            Some(entry) => {
                let local = &iri[entry.base.len()..];
                if local.contains(['/', '#', '?']) {
                    iri.to_owned()
                } else {
                    format!("{}:{local}", entry.prefix)
                }
            }
            None => iri.to_owned(),
        }
    }

    /// Expand a CURIE to a full IRI; unknown prefixes are returned unchanged.
    pub fn expand(&self, curie: &str) -> String {
        if let Some((prefix, local)) = curie.split_once(':') {
            if !local.starts_with("//") {
                if let Some(entry) = self.entries.iter().find(|e| e.prefix == prefix) {
                    return format!("{}{local}", entry.base);
                }
            }
        }
        curie.to_owned()
    }

    /// All declarations, in declaration order.
    pub fn entries(&self) -> &[Prefix] {
        &self.entries
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self::standard()
    }
}
