//! Typed statement projections.
//!
//! A projection is a predicate filter plus a shape requirement on the
//! statement's target column. Statements are routed into every projection
//! whose filter they satisfy; the base `node_to_node_statement` and
//! `node_to_value_statement` split the store by target column.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::OntoResult;
use crate::statement::StatementKey;
use crate::store::ScanFilter;
use crate::term::{TermId, TermKind};
use crate::view::Snapshot;
use crate::vocab::Vocabulary;

/// What the target column of a projected statement must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Any,
    Node,
    Value,
    /// Object populated and an IRI.
    NamedNode,
}

/// Every typed statement projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementProjection {
    NodeToNode,
    NodeToValue,
    RdfType,
    RdfsSubclassOf,
    RdfsSubclassOfNamed,
    RdfsSubpropertyOf,
    RdfsLabel,
    RdfsDomain,
    RdfsRange,
    OwlImports,
    OwlInverseOf,
    OwlComplementOf,
    OwlEquivalentClass,
    OwlSameAs,
    OwlDisjointClass,
    RdfList,
    RdfFirst,
    RdfRest,
}

impl StatementProjection {
    pub const ALL: [StatementProjection; 18] = [
        StatementProjection::NodeToNode,
        StatementProjection::NodeToValue,
        StatementProjection::RdfType,
        StatementProjection::RdfsSubclassOf,
        StatementProjection::RdfsSubclassOfNamed,
        StatementProjection::RdfsSubpropertyOf,
        StatementProjection::RdfsLabel,
        StatementProjection::RdfsDomain,
        StatementProjection::RdfsRange,
        StatementProjection::OwlImports,
        StatementProjection::OwlInverseOf,
        StatementProjection::OwlComplementOf,
        StatementProjection::OwlEquivalentClass,
        StatementProjection::OwlSameAs,
        StatementProjection::OwlDisjointClass,
        StatementProjection::RdfList,
        StatementProjection::RdfFirst,
        StatementProjection::RdfRest,
    ];

    pub fn relation_name(self) -> &'static str {
        match self {
            StatementProjection::NodeToNode => "node_to_node_statement",
            StatementProjection::NodeToValue => "node_to_value_statement",
            StatementProjection::RdfType => "rdf_type_statement",
            StatementProjection::RdfsSubclassOf => "rdfs_subclass_of_statement",
            StatementProjection::RdfsSubclassOfNamed => "rdfs_subclass_of_named_statement",
            StatementProjection::RdfsSubpropertyOf => "rdfs_subproperty_of_statement",
            StatementProjection::RdfsLabel => "rdfs_label_statement",
            StatementProjection::RdfsDomain => "rdfs_domain_statement",
            StatementProjection::RdfsRange => "rdfs_range_statement",
            StatementProjection::OwlImports => "owl_imports_statement",
            StatementProjection::OwlInverseOf => "owl_inverse_of_statement",
            StatementProjection::OwlComplementOf => "owl_complement_of_statement",
            StatementProjection::OwlEquivalentClass => "owl_equivalent_class_statement",
            StatementProjection::OwlSameAs => "owl_same_as_statement",
            StatementProjection::OwlDisjointClass => "owl_disjoint_class_statement",
            StatementProjection::RdfList => "rdf_list_statement",
            StatementProjection::RdfFirst => "rdf_first_statement",
            StatementProjection::RdfRest => "rdf_rest_statement",
        }
    }

    pub fn from_relation_name(name: &str) -> Option<StatementProjection> {
        StatementProjection::ALL
            .into_iter()
            .find(|p| p.relation_name() == name)
    }

    /// Parent relation in the schema.
    pub fn parent_relation(self) -> &'static str {
        match self {
            StatementProjection::NodeToNode | StatementProjection::NodeToValue => "statements",
            StatementProjection::RdfsLabel => "node_to_value_statement",
            StatementProjection::RdfsSubclassOfNamed => "rdfs_subclass_of_statement",
            StatementProjection::RdfFirst | StatementProjection::RdfRest => "rdf_list_statement",
            _ => "node_to_node_statement",
        }
    }

    /// Predicates the projection accepts; `None` accepts any predicate.
    fn predicates(self, v: &Vocabulary) -> Option<Vec<TermId>> {
        let single = |id: TermId| Some(vec![id]);
        match self {
            StatementProjection::NodeToNode | StatementProjection::NodeToValue => None,
            StatementProjection::RdfType => single(v.rdf_type),
            StatementProjection::RdfsSubclassOf | StatementProjection::RdfsSubclassOfNamed => {
                single(v.rdfs_sub_class_of)
            }
            StatementProjection::RdfsSubpropertyOf => single(v.rdfs_sub_property_of),
            StatementProjection::RdfsLabel => single(v.rdfs_label),
            StatementProjection::RdfsDomain => single(v.rdfs_domain),
            StatementProjection::RdfsRange => single(v.rdfs_range),
            StatementProjection::OwlImports => single(v.owl_imports),
            StatementProjection::OwlInverseOf => single(v.owl_inverse_of),
            StatementProjection::OwlComplementOf => single(v.owl_complement_of),
            StatementProjection::OwlEquivalentClass => single(v.owl_equivalent_class),
            StatementProjection::OwlSameAs => single(v.owl_same_as),
            StatementProjection::OwlDisjointClass => single(v.owl_disjoint_with),
            StatementProjection::RdfList => Some(vec![v.rdf_first, v.rdf_rest]),
            StatementProjection::RdfFirst => single(v.rdf_first),
            StatementProjection::RdfRest => single(v.rdf_rest),
        }
    }

    fn shape(self) -> Shape {
        match self {
            StatementProjection::NodeToValue | StatementProjection::RdfsLabel => Shape::Value,
            StatementProjection::RdfsSubclassOfNamed => Shape::NamedNode,
            // rdf:first may point at a literal member.
            StatementProjection::RdfList | StatementProjection::RdfFirst => Shape::Any,
            _ => Shape::Node,
        }
    }

    /// Whether the projection accepts `key`.
    pub fn accepts(self, snapshot: &Snapshot, key: &StatementKey) -> OntoResult<bool> {
        if let Some(predicates) = self.predicates(snapshot.vocab()) {
            if !predicates.contains(&key.predicate) {
                return Ok(false);
            }
        }
        Ok(match (self.shape(), key.object) {
            (Shape::Any, _) => true,
            (Shape::Value, _) => key.value.is_some(),
            (Shape::Node, object) => object.is_some(),
            (Shape::NamedNode, Some(object)) => snapshot.kind(object)? == TermKind::Iri,
            (Shape::NamedNode, None) => false,
        })
    }
}

/// Every projection a statement falls into.
pub fn route(snapshot: &Snapshot, key: &StatementKey) -> OntoResult<Vec<StatementProjection>> {
    let mut routed = Vec::new();
    for projection in StatementProjection::ALL {
        if projection.accepts(snapshot, key)? {
            routed.push(projection);
        }
    }
    Ok(routed)
}

/// All statements of one projection, in store order.
pub fn project(
    snapshot: &Snapshot,
    projection: StatementProjection,
) -> OntoResult<Vec<StatementKey>> {
    let mut rows = Vec::new();
    match projection.predicates(snapshot.vocab()) {
        Some(predicates) => {
            for predicate in predicates {
                for key in snapshot.scan_ids(ScanFilter::all().predicate(predicate)) {
                    if projection.accepts(snapshot, key)? {
                        rows.push(*key);
                    }
                }
            }
        }
        None => {
            for key in snapshot.scan_ids(ScanFilter::all()) {
                if projection.accepts(snapshot, key)? {
                    rows.push(*key);
                }
            }
        }
    }
    Ok(rows)
}

/// Subjects carrying `owl:deprecated "true"`.
pub fn deprecated_nodes(snapshot: &Snapshot) -> OntoResult<BTreeSet<TermId>> {
    let mut nodes = BTreeSet::new();
    let filter = ScanFilter::all().predicate(snapshot.vocab().owl_deprecated);
    for key in snapshot.scan_ids(filter) {
        if let Some(value) = key.value {
            if snapshot.resolve(value)?.eq_ignore_ascii_case("true") {
                nodes.insert(key.subject);
            }
        }
    }
    Ok(nodes)
}
