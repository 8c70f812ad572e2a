//! OWL axiom views: reified axioms, their annotations, and the two derived
//! complex axioms.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, NodeCategory};
use crate::error::OntoResult;
use crate::finding::{Finding, FindingReport};
use crate::lists::ListMaterialization;
use crate::statement::{Statement, StatementKey};
use crate::store::ScanFilter;
use crate::term::TermId;
use crate::view::Snapshot;

/// An `owl:Axiom` node and the triple it annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwlAxiom {
    pub id: String,
    /// The annotated triple; its stanza is the stanza typing the axiom node.
    pub statement: Statement,
}

/// One statement made about an axiom node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxiomAnnotation {
    pub axiom: OwlAxiom,
    pub annotation_predicate: String,
    pub annotation_object: Option<String>,
    pub annotation_value: Option<String>,
    pub annotation_datatype: Option<String>,
    pub annotation_language: Option<String>,
}

/// Axioms found in one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxiomSet {
    pub axioms: Vec<OwlAxiom>,
    /// Axioms whose annotated triple is itself asserted.
    pub reified: Vec<OwlAxiom>,
    pub annotations: Vec<AxiomAnnotation>,
    pub findings: FindingReport,
}

/// `C rdfs:subClassOf [owl:onProperty P; owl:someValuesFrom F]` as `(C, P, F)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubclassOfSomeValuesFrom {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// `C owl:equivalentClass [owl:intersectionOf (X1 .. Xn)]` as one row per member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntersectionMember {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// The `(object, value, datatype, language)` part of a statement.
type Target = (Option<TermId>, Option<TermId>, Option<TermId>, Option<TermId>);

fn target_of(key: &StatementKey) -> Target {
    (key.object, key.value, key.datatype, key.language)
}

/// Collect every well-formed axiom, its annotations, and the invalid ones.
pub fn extract_axioms(snapshot: &Snapshot) -> OntoResult<AxiomSet> {
    let v = snapshot.vocab();
    let mut set = AxiomSet::default();

    // Axiom node → lowest stanza id among its typing statements.
    let mut typed: Vec<(TermId, TermId)> = snapshot
        .scan_ids(ScanFilter::all().predicate(v.rdf_type))
        .filter(|key| key.object == Some(v.owl_axiom))
        .map(|key| (key.subject, key.stanza))
        .collect();
    typed.sort();
    typed.dedup_by_key(|(node, _)| *node);

    for (node, stanza) in typed {
        let id = snapshot.resolve(node)?;
        let sources = snapshot.objects(node, v.owl_annotated_source);
        let properties = snapshot.objects(node, v.owl_annotated_property);
        let targets: BTreeSet<Target> = snapshot
            .scan_ids(ScanFilter::all().subject(node).predicate(v.owl_annotated_target))
            .map(target_of)
            .collect();

        let reason = match (sources.as_slice(), properties.as_slice(), targets.len()) {
            ([], _, _) => Some("missing owl:annotatedSource".to_string()),
            (_, [], _) => Some("missing owl:annotatedProperty".to_string()),
            (_, _, 0) => Some("missing owl:annotatedTarget".to_string()),
            ([_, _, ..], _, _) => Some(format!("{} annotated sources", sources.len())),
            (_, [_, _, ..], _) => Some(format!("{} annotated properties", properties.len())),
            (_, _, n) if n > 1 => Some(format!("{n} annotated targets")),
            ([source], _, _) if *source == node => {
                Some("axiom id equals its annotated source".to_string())
            }
            _ if targets.iter().any(|t| t.0 == Some(node)) => {
                Some("axiom id equals its annotated target".to_string())
            }
            _ => None,
        };
        if let Some(reason) = reason {
            tracing::debug!(axiom = %id, %reason, "invalid axiom");
            set.findings.push(Finding::InvalidAxiom { axiom: id, reason });
            continue;
        }

        let (source, property) = (sources[0], properties[0]);
        let Some(&(object, value, datatype, language)) = targets.iter().next() else {
            continue;
        };
        let key = StatementKey {
            stanza,
            subject: source,
            predicate: property,
            object,
            value,
            datatype,
            language,
        };
        let axiom = OwlAxiom {
            id,
            statement: snapshot.statement(&key)?,
        };

        let asserted = snapshot
            .scan_ids(ScanFilter::all().subject(source).predicate(property))
            .any(|k| target_of(k) == (object, value, datatype, language));
        if asserted {
            set.reified.push(axiom.clone());
        }

        let bookkeeping = [
            v.rdf_type,
            v.owl_annotated_source,
            v.owl_annotated_property,
            v.owl_annotated_target,
        ];
        for ann in snapshot.scan_ids(ScanFilter::all().subject(node)) {
            if bookkeeping.contains(&ann.predicate) {
                continue;
            }
            let opt = |id: Option<TermId>| id.map(|id| snapshot.resolve(id)).transpose();
            set.annotations.push(AxiomAnnotation {
                axiom: axiom.clone(),
                annotation_predicate: snapshot.resolve(ann.predicate)?,
                annotation_object: opt(ann.object)?,
                annotation_value: opt(ann.value)?,
                annotation_datatype: opt(ann.datatype)?,
                annotation_language: opt(ann.language)?,
            });
        }
        set.axioms.push(axiom);
    }

    if !set.findings.is_empty() {
        tracing::warn!(invalid = set.findings.len(), "invalid axioms excluded");
    }
    Ok(set)
}

/// Compose `rdfs:subClassOf` with existential restrictions.
pub fn subclass_of_some_values_from(
    snapshot: &Snapshot,
) -> OntoResult<Vec<SubclassOfSomeValuesFrom>> {
    let classifier = Classifier::new(snapshot);
    let mut rows = BTreeSet::new();
    let filter = ScanFilter::all().predicate(snapshot.vocab().rdfs_sub_class_of);
    for key in snapshot.scan_ids(filter) {
        let Some(object) = key.object else { continue };
        if let NodeCategory::SomeValuesFrom(r) = classifier.classify(object)?.category {
            if let Some(filler) = r.filler {
                rows.insert(SubclassOfSomeValuesFrom {
                    subject: snapshot.resolve(key.subject)?,
                    predicate: r.on_property,
                    object: filler,
                });
            }
        }
    }
    Ok(rows.into_iter().collect())
}

/// Compose `owl:equivalentClass`, `owl:intersectionOf` and list membership.
pub fn equivalent_to_intersection_members(
    snapshot: &Snapshot,
    lists: &ListMaterialization,
) -> OntoResult<Vec<IntersectionMember>> {
    let v = snapshot.vocab();
    let predicate = snapshot.resolve(v.owl_intersection_of)?;
    let mut rows = BTreeSet::new();
    for key in snapshot.scan_ids(ScanFilter::all().predicate(v.owl_equivalent_class)) {
        let Some(expression) = key.object else { continue };
        for list in snapshot.objects(expression, v.owl_intersection_of) {
            let Some(members) = lists.members_of(&snapshot.resolve(list)?) else {
                continue;
            };
            let subject = snapshot.resolve(key.subject)?;
            for member in members {
                rows.insert(IntersectionMember {
                    subject: subject.clone(),
                    predicate: predicate.clone(),
                    object: member.clone(),
                });
            }
        }
    }
    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::TermInterner;
    use crate::lists::materialize_lists;
    use crate::prefix::PrefixMap;
    use crate::store::StatementStore;
    use crate::term::TermKind;
    use crate::vocab::Vocabulary;
    use std::sync::Arc;

    fn snapshot_of(triples: &[(&str, &str, &str)], values: &[(&str, &str, &str)]) -> Snapshot {
        let interner = Arc::new(TermInterner::new());
        let vocab = Arc::new(Vocabulary::resolve(&interner).unwrap());
        let store = StatementStore::new();
        let stanza = interner.intern("t", TermKind::Iri).unwrap();
        let node = |s: &str| interner.intern_node(s).unwrap();
        for (s, p, o) in triples {
            store.insert(StatementKey {
                stanza,
                subject: node(s),
                predicate: node(p),
                object: Some(node(o)),
                value: None,
                datatype: None,
                language: None,
            });
        }
        for (s, p, val) in values {
            store.insert(StatementKey {
                stanza,
                subject: node(s),
                predicate: node(p),
                object: None,
                value: Some(interner.intern(val, TermKind::Literal).unwrap()),
                datatype: None,
                language: None,
            });
        }
        Snapshot::new(store.snapshot(), interner, vocab, Arc::new(PrefixMap::standard()))
    }

    #[test]
    fn reified_axiom_with_annotation() {
        let snap = snapshot_of(
            &[
                ("ex:A", "rdfs:subClassOf", "ex:B"),
                ("_:ax", "rdf:type", "owl:Axiom"),
                ("_:ax", "owl:annotatedSource", "ex:A"),
                ("_:ax", "owl:annotatedProperty", "rdfs:subClassOf"),
                ("_:ax", "owl:annotatedTarget", "ex:B"),
            ],
            &[("_:ax", "ex:source", "PMID:1")],
        );
        let set = extract_axioms(&snap).unwrap();
        assert_eq!(set.axioms.len(), 1);
        assert_eq!(set.reified, set.axioms);
        assert_eq!(set.axioms[0].statement.subject, "ex:A");
        assert_eq!(set.axioms[0].statement.object.as_deref(), Some("ex:B"));
        assert_eq!(set.annotations.len(), 1);
        assert_eq!(set.annotations[0].annotation_value.as_deref(), Some("PMID:1"));
        assert!(set.findings.is_empty());
    }

    #[test]
    fn unasserted_axiom_is_not_reified() {
        let snap = snapshot_of(
            &[
                ("_:ax", "rdf:type", "owl:Axiom"),
                ("_:ax", "owl:annotatedSource", "ex:A"),
                ("_:ax", "owl:annotatedProperty", "rdfs:subClassOf"),
                ("_:ax", "owl:annotatedTarget", "ex:B"),
            ],
            &[],
        );
        let set = extract_axioms(&snap).unwrap();
        assert_eq!(set.axioms.len(), 1);
        assert!(set.reified.is_empty());
    }

    #[test]
    fn incomplete_or_self_referencing_axioms_are_findings() {
        let snap = snapshot_of(
            &[
                ("_:a1", "rdf:type", "owl:Axiom"),
                ("_:a1", "owl:annotatedSource", "ex:A"),
                ("_:a2", "rdf:type", "owl:Axiom"),
                ("_:a2", "owl:annotatedSource", "_:a2"),
                ("_:a2", "owl:annotatedProperty", "ex:p"),
                ("_:a2", "owl:annotatedTarget", "ex:B"),
            ],
            &[],
        );
        let set = extract_axioms(&snap).unwrap();
        assert!(set.axioms.is_empty());
        assert_eq!(set.findings.len(), 2);
    }

    #[test]
    fn subclass_of_existential() {
        let snap = snapshot_of(
            &[
                ("ex:Finger", "rdfs:subClassOf", "_:r"),
                ("ex:Finger", "rdfs:subClassOf", "ex:Digit"),
                ("_:r", "rdf:type", "owl:Restriction"),
                ("_:r", "owl:onProperty", "ex:partOf"),
                ("_:r", "owl:someValuesFrom", "ex:Hand"),
            ],
            &[],
        );
        assert_eq!(
            subclass_of_some_values_from(&snap).unwrap(),
            vec![SubclassOfSomeValuesFrom {
                subject: "ex:Finger".into(),
                predicate: "ex:partOf".into(),
                object: "ex:Hand".into(),
            }]
        );
    }

    #[test]
    fn intersection_members() {
        let snap = snapshot_of(
            &[
                ("ex:C", "owl:equivalentClass", "_:x"),
                ("_:x", "owl:intersectionOf", "_:l1"),
                ("_:l1", "rdf:first", "ex:A"),
                ("_:l1", "rdf:rest", "_:l2"),
                ("_:l2", "rdf:first", "ex:B"),
                ("_:l2", "rdf:rest", "rdf:nil"),
            ],
            &[],
        );
        let lists = materialize_lists(&snap).unwrap();
        let rows = equivalent_to_intersection_members(&snap, &lists).unwrap();
        let objects: Vec<&str> = rows.iter().map(|r| r.object.as_str()).collect();
        assert_eq!(objects, ["ex:A", "ex:B"]);
        assert!(rows.iter().all(|r| r.predicate == "owl:intersectionOf"));
    }

    #[test]
    fn axiom_typed_in_two_stanzas_takes_lowest_stanza_id() {
        let interner = Arc::new(TermInterner::new());
        let vocab = Arc::new(Vocabulary::resolve(&interner).unwrap());
        let store = StatementStore::new();
        // Interned first, so the lower id despite sorting after "alpha".
        let zeta = interner.intern("zeta", TermKind::Iri).unwrap();
        let alpha = interner.intern("alpha", TermKind::Iri).unwrap();
        let node = |s: &str| interner.intern_node(s).unwrap();
        let rows = [
            (alpha, "_:ax", "rdf:type", "owl:Axiom"),
            (zeta, "_:ax", "rdf:type", "owl:Axiom"),
            (alpha, "_:ax", "owl:annotatedSource", "ex:A"),
            (alpha, "_:ax", "owl:annotatedProperty", "rdfs:subClassOf"),
            (alpha, "_:ax", "owl:annotatedTarget", "ex:B"),
        ];
        for (stanza, s, p, o) in rows {
            store.insert(StatementKey {
                stanza,
                subject: node(s),
                predicate: node(p),
                object: Some(node(o)),
                value: None,
                datatype: None,
                language: None,
            });
        }
        let snap = Snapshot::new(
            store.snapshot(),
            interner.clone(),
            vocab,
            Arc::new(PrefixMap::standard()),
        );
        let set = extract_axioms(&snap).unwrap();
        assert_eq!(set.axioms.len(), 1);
        assert_eq!(set.axioms[0].statement.stanza, "zeta");
    }
}
