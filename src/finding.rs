//! Non-fatal findings produced while deriving views.
//!
//! Findings never abort a classification or list pass. They are collected into
//! a [`FindingReport`] that travels alongside the successful results, so a large
//! ontology with a few malformed fragments still yields a usable store.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a list could not be materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListDefect {
    /// The `rdf:rest` chain revisits a node.
    Cycle,
    /// The chain ends at a node that is neither a list node nor `rdf:nil`.
    Unterminated,
    /// A list node has no `rdf:first`.
    MissingFirst,
    /// A list node has no `rdf:rest`.
    MissingRest,
    /// A list node has more than one `rdf:first` or `rdf:rest`.
    Branching,
}

impl std::fmt::Display for ListDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListDefect::Cycle => write!(f, "rdf:rest cycle"),
            ListDefect::Unterminated => write!(f, "chain does not end in rdf:nil"),
            ListDefect::MissingFirst => write!(f, "node without rdf:first"),
            ListDefect::MissingRest => write!(f, "node without rdf:rest"),
            ListDefect::Branching => write!(f, "node with several rdf:first/rdf:rest"),
        }
    }
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize, Deserialize)]
pub enum Finding {
    #[error("conflicting types on {node}: {candidates:?}; classified as {assigned}")]
    #[diagnostic(
        code(ontorel::classify::conflicting_type),
        severity(Warning),
        help(
            "The node is asserted to belong to unrelated categories. It was given \
             their closest common ancestor. Remove the stray rdf:type assertion or \
             restriction companion to get the specific category."
        )
    )]
    ConflictingType {
        node: String,
        candidates: Vec<String>,
        assigned: String,
    },

    #[error("malformed list at {head}: {defect} (at {at})")]
    #[diagnostic(
        code(ontorel::lists::malformed),
        severity(Warning),
        help(
            "The list was excluded from the list projections. Every list node needs \
             exactly one rdf:first and one rdf:rest, and the chain must end at rdf:nil."
        )
    )]
    MalformedList {
        head: String,
        at: String,
        defect: ListDefect,
    },

    #[error("invalid axiom {axiom}: {reason}")]
    #[diagnostic(
        code(ontorel::axiom::invalid),
        severity(Warning),
        help(
            "A reified axiom needs exactly one owl:annotatedSource, \
             owl:annotatedProperty and owl:annotatedTarget, and its own id must \
             differ from the annotated source and target."
        )
    )]
    InvalidAxiom { axiom: String, reason: String },
}

/// Findings collected from one or more derivation passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingReport {
    findings: Vec<Finding>,
}

impl FindingReport {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Append another report.
    pub fn merge(&mut self, other: FindingReport) {
        self.findings.extend(other.findings);
    }

    /// Sort findings into a stable order, so reruns compare equal.
    pub fn sort(&mut self) {
        self.findings.sort_by_key(|f| f.to_string());
    }

    /// All findings.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Number of `MalformedList` findings.
    pub fn malformed_lists(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::MalformedList { .. }))
            .count()
    }

    /// Number of `ConflictingType` findings.
    pub fn conflicting_types(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::ConflictingType { .. }))
            .count()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl IntoIterator for FindingReport {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findings_are_warnings() {
        let f = Finding::MalformedList {
            head: "_:l1".into(),
            at: "_:l2".into(),
            defect: ListDefect::Cycle,
        };
        assert_eq!(f.severity(), Some(miette::Severity::Warning));
        assert_eq!(f.to_string(), "malformed list at _:l1: rdf:rest cycle (at _:l2)");
    }

    #[test]
    fn report_counts_by_kind() {
        let mut report = FindingReport::new();
        report.push(Finding::ConflictingType {
            node: "ex:A".into(),
            candidates: vec!["ClassNode".into(), "NamedIndividualNode".into()],
            assigned: "IriNode".into(),
        });
        let mut other = FindingReport::new();
        other.push(Finding::MalformedList {
            head: "_:l".into(),
            at: "_:l".into(),
            defect: ListDefect::MissingRest,
        });
        report.merge(other);
        assert_eq!(report.len(), 2);
        assert_eq!(report.conflicting_types(), 1);
        assert_eq!(report.malformed_lists(), 1);
    }

    #[test]
    fn sort_is_deterministic() {
        let a = Finding::InvalidAxiom {
            axiom: "_:b".into(),
            reason: "x".into(),
        };
        let b = Finding::InvalidAxiom {
            axiom: "_:a".into(),
            reason: "x".into(),
        };
        let mut r1 = FindingReport::new();
        r1.push(a.clone());
        r1.push(b.clone());
        let mut r2 = FindingReport::new();
        r2.push(b);
        r2.push(a);
        r1.sort();
        r2.sort();
        assert_eq!(r1, r2);
    }
}
