//! Relation catalog and materialization.
//!
//! [`SchemaDescriptor::standard`] is built once when the engine starts and is
//! passed by reference wherever relations are named. Every relation is derived
//! from a [`Snapshot`] on demand.

use serde::{Deserialize, Serialize};

use crate::axiom;
use crate::classify::projection::{self, StatementProjection};
use crate::classify::{CategoryTag, Classifier};
use crate::error::{EngineError, OntoResult};
use crate::lists;
use crate::statement::Statement;
use crate::summary::{self, StatisticKind};
use crate::term::TermKind;
use crate::view::Snapshot;

/// Columns of `statements` and every statement projection.
pub const STATEMENT_COLUMNS: [&str; 7] = [
    "stanza",
    "subject",
    "predicate",
    "object",
    "value",
    "datatype",
    "language",
];

const RESTRICTION_COLUMNS: [&str; 3] = ["id", "on_property", "filler"];
const TRIPLE_COLUMNS: [&str; 3] = ["subject", "predicate", "object"];

/// How a relation's rows are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSource {
    Statements,
    Prefixes,
    Projection(StatementProjection),
    Category(CategoryTag),
    DeprecatedNodes,
    RestTransitive,
    ListMembers,
    Axioms,
    ReifiedAxioms,
    AxiomAnnotations,
    SubclassOfSomeValuesFrom,
    EquivalentToIntersectionMember,
    Statistic(StatisticKind),
}

/// One named relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
    pub primary_key: Vec<&'static str>,
    pub parent: Option<&'static str>,
    pub source: RelationSource,
}

impl RelationDef {
    fn new(name: &'static str, columns: &[&'static str], source: RelationSource) -> Self {
        Self {
            name,
            columns: columns.to_vec(),
            primary_key: columns.to_vec(),
            parent: None,
            source,
        }
    }

    fn key(mut self, primary_key: &[&'static str]) -> Self {
        self.primary_key = primary_key.to_vec();
        self
    }

    fn parent(mut self, parent: &'static str) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Rows of one materialized relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRows {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// The catalog of every relation the engine exposes.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    relations: Vec<RelationDef>,
}

impl SchemaDescriptor {
    /// The full catalog.
    pub fn standard() -> Self {
        use RelationSource as S;
        let mut relations = vec![
            RelationDef::new("prefix", &["prefix", "base"], S::Prefixes).key(&["prefix"]),
            RelationDef::new("statements", &STATEMENT_COLUMNS, S::Statements),
        ];
        for projection in StatementProjection::ALL {
            relations.push(
                RelationDef::new(
                    projection.relation_name(),
                    &STATEMENT_COLUMNS,
                    S::Projection(projection),
                )
                .parent(projection.parent_relation()),
            );
        }
        for tag in CategoryTag::ALL {
            let columns: &[&'static str] = if tag.is_restriction() {
                &RESTRICTION_COLUMNS
            } else {
                &["id"]
            };
            let mut def =
                RelationDef::new(tag.relation_name(), columns, S::Category(tag)).key(&["id"]);
            if let Some(parent) = tag.parent() {
                def = def.parent(parent.relation_name());
            }
            relations.push(def);
        }
        relations.extend([
            RelationDef::new("deprecated_node", &["id"], S::DeprecatedNodes).parent("node"),
            RelationDef::new("rdf_rest_transitive_statement", &STATEMENT_COLUMNS, S::RestTransitive)
                .parent("rdf_list_statement"),
            RelationDef::new("rdf_list_member_statement", &STATEMENT_COLUMNS, S::ListMembers)
                .parent("rdf_list_statement"),
            axiom_def("owl_axiom", S::Axioms),
            axiom_def("owl_reified_axiom", S::ReifiedAxioms),
            RelationDef::new(
                "owl_axiom_annotation",
                &[
                    "annotation_subject",
                    "annotation_predicate",
                    "annotation_object",
                    "annotation_value",
                    "annotation_language",
                    "annotation_datatype",
                    "id",
                    "stanza",
                    "subject",
                    "predicate",
                    "object",
                    "value",
                    "datatype",
                    "language",
                ],
                S::AxiomAnnotations,
            )
            .parent("statements"),
            RelationDef::new(
                "owl_subclass_of_some_values_from",
                &TRIPLE_COLUMNS,
                S::SubclassOfSomeValuesFrom,
            )
            .parent("owl_complex_axiom"),
            RelationDef::new(
                "owl_equivalent_to_intersection_member",
                &TRIPLE_COLUMNS,
                S::EquivalentToIntersectionMember,
            )
            .parent("owl_complex_axiom"),
        ]);
        for kind in StatisticKind::ALL {
            relations.push(
                RelationDef::new(kind.relation_name(), &["element", "count_value"], S::Statistic(kind))
                    .parent("rdf_level_summary_statistic"),
            );
        }
        Self { relations }
    }

    /// Every relation, in catalog order.
    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    /// Look up a relation by name.
    pub fn get(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Materialize a named relation from a snapshot.
    pub fn materialize(
        &self,
        snapshot: &Snapshot,
        name: &str,
        parallel_threshold: usize,
    ) -> OntoResult<RelationRows> {
        let def = self.get(name).ok_or_else(|| EngineError::UnknownRelation {
            name: name.to_string(),
        })?;
        let rows = match def.source {
            RelationSource::Statements => snapshot
                .scan(None, None)
                .map(|s| s.map(statement_row))
                .collect::<OntoResult<Vec<_>>>()?,
            RelationSource::Prefixes => snapshot
                .prefixes()
                .entries()
                .iter()
                .map(|p| vec![Some(p.prefix.clone()), Some(p.base.clone())])
                .collect(),
            RelationSource::Projection(projection) => projection::project(snapshot, projection)?
                .iter()
                .map(|key| snapshot.statement(key).map(statement_row))
                .collect::<OntoResult<Vec<_>>>()?,
            RelationSource::Category(tag) => {
                let partition = Classifier::new(snapshot)
                    .with_parallel_threshold(parallel_threshold)
                    .classify_all()?;
                let mut rows = Vec::new();
                for (node, category) in partition.iter() {
                    if !category.is_a(tag) {
                        continue;
                    }
                    let mut row = vec![Some(snapshot.resolve(node)?)];
                    if tag.is_restriction() {
                        let r = category.restriction();
                        row.push(r.map(|r| r.on_property.clone()));
                        row.push(r.and_then(|r| r.filler.clone()));
                    }
                    rows.push(row);
                }
                rows
            }
            RelationSource::DeprecatedNodes => projection::deprecated_nodes(snapshot)?
                .into_iter()
                .map(|id| snapshot.resolve(id).map(|s| vec![Some(s)]))
                .collect::<OntoResult<Vec<_>>>()?,
            RelationSource::RestTransitive => lists::materialize_lists(snapshot)?
                .rest_transitive
                .into_iter()
                .map(|hop| {
                    list_row(hop.stanza, hop.head, "rdf:rest", hop.node, TermKind::Iri)
                })
                .collect(),
            RelationSource::ListMembers => {
                let mut rows = Vec::new();
                for list in lists::materialize_lists(snapshot)?.lists {
                    for (member, kind) in list.members.into_iter().zip(list.member_kinds) {
                        rows.push(list_row(
                            list.stanza.clone(),
                            list.head.clone(),
                            "rdf:first",
                            member,
                            kind,
                        ));
                    }
                }
                rows
            }
            RelationSource::Axioms => axiom::extract_axioms(snapshot)?
                .axioms
                .into_iter()
                .map(axiom_row)
                .collect(),
            RelationSource::ReifiedAxioms => axiom::extract_axioms(snapshot)?
                .reified
                .into_iter()
                .map(axiom_row)
                .collect(),
            RelationSource::AxiomAnnotations => axiom::extract_axioms(snapshot)?
                .annotations
                .into_iter()
                .map(|a| {
                    let mut row = vec![
                        Some(a.axiom.id.clone()),
                        Some(a.annotation_predicate),
                        a.annotation_object,
                        a.annotation_value,
                        a.annotation_language,
                        a.annotation_datatype,
                    ];
                    row.extend(axiom_row(a.axiom));
                    row
                })
                .collect(),
            RelationSource::SubclassOfSomeValuesFrom => {
                axiom::subclass_of_some_values_from(snapshot)?
                    .into_iter()
                    .map(|r| triple_row(r.subject, &r.predicate, r.object))
                    .collect()
            }
            RelationSource::EquivalentToIntersectionMember => {
                let lists = lists::materialize_lists(snapshot)?;
                axiom::equivalent_to_intersection_members(snapshot, &lists)?
                    .into_iter()
                    .map(|r| triple_row(r.subject, &r.predicate, r.object))
                    .collect()
            }
            RelationSource::Statistic(kind) => summary::rows(snapshot, kind)?
                .into_iter()
                .map(|s| vec![Some(s.element), Some(s.count_value.to_string())])
                .collect(),
        };
        Ok(RelationRows {
            name: def.name.to_string(),
            columns: def.columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}

fn axiom_def(name: &'static str, source: RelationSource) -> RelationDef {
    let mut columns = vec!["id"];
    columns.extend(STATEMENT_COLUMNS);
    RelationDef::new(name, &columns, source).parent("statements")
}

fn statement_row(s: Statement) -> Vec<Option<String>> {
    vec![
        Some(s.stanza),
        Some(s.subject),
        Some(s.predicate),
        s.object,
        s.value,
        s.datatype,
        s.language,
    ]
}

fn axiom_row(a: axiom::OwlAxiom) -> Vec<Option<String>> {
    let mut row = vec![Some(a.id)];
    row.extend(statement_row(a.statement));
    row
}

/// A list link as a statement row; literal targets go in the value column.
fn list_row(
    stanza: String,
    head: String,
    predicate: &str,
    target: String,
    kind: TermKind,
) -> Vec<Option<String>> {
    let (object, value) = match kind {
        TermKind::Literal => (None, Some(target)),
        _ => (Some(target), None),
    };
    vec![Some(stanza), Some(head), Some(predicate.to_string()), object, value, None, None]
}

fn triple_row(subject: String, predicate: &str, object: String) -> Vec<Option<String>> {
    vec![Some(subject), Some(predicate.to_string()), Some(object)]
}
