//! Type classification: every node gets exactly one terminal category.
//!
//! Candidate categories come from two sources: asserted `rdf:type` objects
//! (mapped through a kind-dependent table) and structural shape for blank
//! nodes (`owl:onProperty`, list links, boolean class constructors). The
//! candidates are reduced to their most specific members and then resolved:
//!
//! 1. one candidate wins outright;
//! 2. several object property characteristics resolve by fixed rank
//!    (transitive, symmetric, asymmetric, reflexive, irreflexive);
//! 3. anything else becomes the lowest common ancestor plus a
//!    [`Finding::ConflictingType`], falling back to `IriNode`/`BlankNode`
//!    when the ancestor would be the abstract root.
//!
//! Restrictions are then refined by their companion predicate.

pub mod category;
pub mod projection;

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::error::OntoResult;
use crate::finding::{Finding, FindingReport};
use crate::store::ScanFilter;
use crate::term::{TermId, TermKind};
use crate::view::Snapshot;
use crate::vocab::Vocabulary;

pub use category::{CategoryTag, NodeCategory, Restriction};

/// Below this many nodes `classify_all` stays on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

/// Result of classifying one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: NodeCategory,
    pub findings: Vec<Finding>,
}

/// The category partition of every node in a snapshot.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    categories: BTreeMap<TermId, NodeCategory>,
    findings: FindingReport,
}

impl Partition {
    /// Category of one node, if it is a node of the snapshot.
    pub fn category(&self, node: TermId) -> Option<&NodeCategory> {
        self.categories.get(&node)
    }

    /// Every node with its category, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &NodeCategory)> {
        self.categories.iter().map(|(id, cat)| (*id, cat))
    }

    /// Nodes whose category is-a `tag`.
    pub fn members(&self, tag: CategoryTag) -> Vec<TermId> {
        self.categories
            .iter()
            .filter(|(_, cat)| cat.is_a(tag))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of nodes per terminal tag.
    pub fn counts(&self) -> BTreeMap<CategoryTag, usize> {
        let mut counts = BTreeMap::new();
        for cat in self.categories.values() {
            *counts.entry(cat.tag()).or_insert(0) += 1;
        }
        counts
    }

    /// Findings raised while classifying.
    pub fn findings(&self) -> &FindingReport {
        &self.findings
    }

    /// Consume the partition, keeping only the findings.
    pub fn into_findings(self) -> FindingReport {
        self.findings
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Everything the classifier needs to know about one subject, gathered in a
/// single pass over its statements.
#[derive(Debug, Default)]
struct Profile {
    types: BTreeSet<TermId>,
    on_property: BTreeSet<TermId>,
    some_values_from: BTreeSet<TermId>,
    all_values_from: BTreeSet<TermId>,
    has_value: BTreeSet<TermId>,
    has_self: BTreeSet<TermId>,
    list_link: bool,
    class_constructor: bool,
    inverse_of: bool,
}

impl Profile {
    fn gather(snapshot: &Snapshot, node: TermId) -> Self {
        let v = snapshot.vocab();
        let mut profile = Profile::default();
        for key in snapshot.scan_ids(ScanFilter::all().subject(node)) {
            let p = key.predicate;
            if p == v.rdf_type {
                profile.types.extend(key.object);
            } else if p == v.owl_on_property {
                profile.on_property.extend(key.object);
            } else if p == v.owl_some_values_from {
                profile.some_values_from.extend(key.object);
            } else if p == v.owl_all_values_from {
                profile.all_values_from.extend(key.object);
            } else if p == v.owl_has_value {
                profile.has_value.extend(key.target());
            } else if p == v.owl_has_self {
                profile.has_self.extend(key.target());
            } else if p == v.rdf_first || p == v.rdf_rest {
                profile.list_link = true;
            } else if p == v.owl_union_of
                || p == v.owl_intersection_of
                || p == v.owl_complement_of
                || p == v.owl_one_of
            {
                profile.class_constructor = true;
            } else if p == v.owl_inverse_of {
                profile.inverse_of = true;
            }
        }
        profile
    }
}

/// Map an asserted type to a category for a term of the given kind.
fn type_category(v: &Vocabulary, kind: TermKind, ty: TermId) -> Option<CategoryTag> {
    use CategoryTag as T;
    let property_like = [
        v.rdf_property,
        v.owl_functional_property,
        v.owl_object_property,
        v.owl_inverse_functional_property,
        v.owl_annotation_property,
        v.owl_datatype_property,
        v.owl_transitive_property,
        v.owl_symmetric_property,
        v.owl_asymmetric_property,
        v.owl_reflexive_property,
        v.owl_irreflexive_property,
    ];
    match kind {
        TermKind::Blank => {
            if ty == v.owl_class || ty == v.rdfs_class {
                Some(T::AnonymousClassExpression)
            } else if ty == v.owl_restriction {
                Some(T::OwlRestriction)
            } else if ty == v.owl_named_individual {
                Some(T::AnonymousIndividualExpression)
            } else if ty == v.rdf_list {
                Some(T::RdfListNode)
            } else if property_like.contains(&ty) {
                Some(T::AnonymousPropertyExpression)
            } else {
                None
            }
        }
        TermKind::Iri => {
            let table = [
                (v.owl_ontology, T::OntologyNode),
                (v.owl_class, T::ClassNode),
                (v.rdfs_class, T::ClassNode),
                (v.rdf_property, T::PropertyNode),
                (v.owl_functional_property, T::PropertyNode),
                (v.owl_object_property, T::ObjectPropertyNode),
                (v.owl_inverse_functional_property, T::ObjectPropertyNode),
                (v.owl_annotation_property, T::AnnotationPropertyNode),
                (v.owl_datatype_property, T::DatatypePropertyNode),
                (v.owl_transitive_property, T::TransitivePropertyNode),
                (v.owl_symmetric_property, T::SymmetricPropertyNode),
                (v.owl_asymmetric_property, T::AsymmetricPropertyNode),
                (v.owl_reflexive_property, T::ReflexivePropertyNode),
                (v.owl_irreflexive_property, T::IrreflexivePropertyNode),
                (v.owl_named_individual, T::NamedIndividualNode),
            ];
            table
                .iter()
                .find(|(id, _)| *id == ty)
                .map(|(_, tag)| *tag)
        }
        // Literals never appear as subjects.
        TermKind::Literal => None,
    }
}

fn fallback(kind: TermKind) -> CategoryTag {
    match kind {
        TermKind::Blank => CategoryTag::BlankNode,
        _ => CategoryTag::IriNode,
    }
}

/// Outcome of precedence resolution over a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub tag: CategoryTag,
    /// The unrelated candidates, when resolution had to generalize.
    pub conflict: Option<Vec<CategoryTag>>,
}

/// Resolve candidate tags to one terminal tag.
pub(crate) fn resolve_tags(kind: TermKind, candidates: &BTreeSet<CategoryTag>) -> Resolved {
    // Drop every candidate that is a strict ancestor of another one.
    let specific: Vec<CategoryTag> = candidates
        .iter()
        .copied()
        .filter(|c| !candidates.iter().any(|o| o != c && o.is_a(*c)))
        .collect();

    match specific.as_slice() {
        [] => Resolved {
            tag: fallback(kind),
            conflict: None,
        },
        [only] => Resolved {
            tag: *only,
            conflict: None,
        },
        many if many.iter().all(|t| t.characteristic_rank().is_some()) => {
            let tag = many
                .iter()
                .copied()
                .min_by_key(|t| t.characteristic_rank())
                .unwrap_or_else(|| fallback(kind));
            Resolved {
                tag,
                conflict: None,
            }
        }
        many => {
            let ancestor = many
                .iter()
                .skip(1)
                .fold(many[0], |acc, t| acc.common_ancestor(*t));
            let tag = if ancestor == CategoryTag::Node {
                fallback(kind)
            } else {
                ancestor
            };
            Resolved {
                tag,
                conflict: Some(many.to_vec()),
            }
        }
    }
}

/// Classifies nodes of one snapshot.
pub struct Classifier<'a> {
    snapshot: &'a Snapshot,
    parallel_threshold: usize,
}

impl<'a> Classifier<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Override the node count above which `classify_all` uses rayon.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Classify a single node.
    pub fn classify(&self, node: TermId) -> OntoResult<Classification> {
        let snapshot = self.snapshot;
        let kind = snapshot.kind(node)?;
        let profile = Profile::gather(snapshot, node);
        let v = snapshot.vocab();

        let mut candidates: BTreeSet<CategoryTag> = profile
            .types
            .iter()
            .filter_map(|ty| type_category(v, kind, *ty))
            .collect();
        if kind == TermKind::Blank {
            if !profile.on_property.is_empty() {
                candidates.insert(CategoryTag::OwlRestriction);
            }
            if profile.list_link {
                candidates.insert(CategoryTag::RdfListNode);
            }
            if profile.class_constructor {
                candidates.insert(CategoryTag::AnonymousClassExpression);
            }
            if profile.inverse_of {
                candidates.insert(CategoryTag::AnonymousPropertyExpression);
            }
        }

        let resolved = resolve_tags(kind, &candidates);
        let mut findings = Vec::new();
        if let Some(conflict) = &resolved.conflict {
            let node_lexical = snapshot.resolve(node)?;
            tracing::debug!(node = %node_lexical, assigned = %resolved.tag, "conflicting types");
            findings.push(Finding::ConflictingType {
                node: node_lexical,
                candidates: conflict.iter().map(|t| t.to_string()).collect(),
                assigned: resolved.tag.to_string(),
            });
        }

        let category = if resolved.tag.is_a(CategoryTag::AnonymousClassExpression) {
            self.refine_restriction(node, &profile, &mut findings)?
        } else {
            NodeCategory::from_tag(resolved.tag).unwrap_or(NodeCategory::IriNode)
        };
        Ok(Classification { category, findings })
    }

    /// Turn an anonymous class expression with `owl:onProperty` into the
    /// matching restriction variant.
    fn refine_restriction(
        &self,
        node: TermId,
        profile: &Profile,
        findings: &mut Vec<Finding>,
    ) -> OntoResult<NodeCategory> {
        let Some(on_property) = self.smallest_lexical(&profile.on_property)? else {
            // Typed owl:Restriction without a property: nothing to refine.
            return Ok(NodeCategory::AnonymousClassExpression);
        };
        let companions = [
            (CategoryTag::SomeValuesFrom, &profile.some_values_from),
            (CategoryTag::AllValuesFrom, &profile.all_values_from),
            (CategoryTag::HasValue, &profile.has_value),
            (CategoryTag::HasSelf, &profile.has_self),
        ];
        let present: Vec<(CategoryTag, &BTreeSet<TermId>)> = companions
            .into_iter()
            .filter(|(_, targets)| !targets.is_empty())
            .collect();

        match present.as_slice() {
            [] => Ok(NodeCategory::OwlRestriction(Restriction::new(on_property, None))),
            [(variant, targets)] => {
                let filler = self.smallest_lexical(targets)?;
                let restriction = Restriction::new(on_property, filler);
                Ok(NodeCategory::restriction_of(*variant, restriction.clone())
                    .unwrap_or(NodeCategory::OwlRestriction(restriction)))
            }
            many => {
                let node_lexical = self.snapshot.resolve(node)?;
                tracing::debug!(node = %node_lexical, "restriction with several companions");
                findings.push(Finding::ConflictingType {
                    node: node_lexical,
                    candidates: many.iter().map(|(t, _)| t.to_string()).collect(),
                    assigned: CategoryTag::OwlRestriction.to_string(),
                });
                Ok(NodeCategory::OwlRestriction(Restriction::new(on_property, None)))
            }
        }
    }

    /// Lexically smallest term of a set, so refinement does not depend on
    /// interning order.
    fn smallest_lexical(&self, ids: &BTreeSet<TermId>) -> OntoResult<Option<String>> {
        let mut best: Option<String> = None;
        for id in ids {
            let lexical = self.snapshot.resolve(*id)?;
            if best.as_ref().is_none_or(|b| lexical < *b) {
                best = Some(lexical);
            }
        }
        Ok(best)
    }

    /// Classify every node of the snapshot.
    pub fn classify_all(&self) -> OntoResult<Partition> {
        let nodes: Vec<TermId> = self.snapshot.nodes().into_iter().collect();
        let results: Vec<(TermId, Classification)> = if nodes.len() >= self.parallel_threshold {
            nodes
                .par_iter()
                .map(|node| self.classify(*node).map(|c| (*node, c)))
                .collect::<OntoResult<_>>()?
        } else {
            nodes
                .iter()
                .map(|node| self.classify(*node).map(|c| (*node, c)))
                .collect::<OntoResult<_>>()?
        };

        let mut partition = Partition::default();
        for (node, classification) in results {
            for finding in classification.findings {
                partition.findings.push(finding);
            }
            partition.categories.insert(node, classification.category);
        }
        partition.findings.sort();
        if !partition.findings.is_empty() {
            tracing::warn!(
                findings = partition.findings.len(),
                "classification produced findings"
            );
        }
        tracing::debug!(nodes = partition.len(), "classified snapshot");
        Ok(partition)
    }
}
