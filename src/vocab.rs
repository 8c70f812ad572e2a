//! Well-known RDF, RDFS and OWL terms, in the CURIE form the store uses.
//!
//! [`Vocabulary`] interns all of them up front so that classification and
//! projection compare `TermId`s instead of strings.

use crate::error::OntoResult;
use crate::interner::TermInterner;
use crate::term::{TermId, TermKind};

pub const RDF_TYPE: &str = "rdf:type";
pub const RDF_FIRST: &str = "rdf:first";
pub const RDF_REST: &str = "rdf:rest";
pub const RDF_NIL: &str = "rdf:nil";
pub const RDF_LIST: &str = "rdf:List";
pub const RDF_PROPERTY: &str = "rdf:Property";

pub const RDFS_CLASS: &str = "rdfs:Class";
pub const RDFS_SUB_CLASS_OF: &str = "rdfs:subClassOf";
pub const RDFS_SUB_PROPERTY_OF: &str = "rdfs:subPropertyOf";
pub const RDFS_LABEL: &str = "rdfs:label";
pub const RDFS_DOMAIN: &str = "rdfs:domain";
pub const RDFS_RANGE: &str = "rdfs:range";

pub const OWL_ONTOLOGY: &str = "owl:Ontology";
pub const OWL_CLASS: &str = "owl:Class";
pub const OWL_RESTRICTION: &str = "owl:Restriction";
pub const OWL_OBJECT_PROPERTY: &str = "owl:ObjectProperty";
pub const OWL_DATATYPE_PROPERTY: &str = "owl:DatatypeProperty";
pub const OWL_ANNOTATION_PROPERTY: &str = "owl:AnnotationProperty";
pub const OWL_FUNCTIONAL_PROPERTY: &str = "owl:FunctionalProperty";
pub const OWL_INVERSE_FUNCTIONAL_PROPERTY: &str = "owl:InverseFunctionalProperty";
pub const OWL_TRANSITIVE_PROPERTY: &str = "owl:TransitiveProperty";
pub const OWL_SYMMETRIC_PROPERTY: &str = "owl:SymmetricProperty";
pub const OWL_ASYMMETRIC_PROPERTY: &str = "owl:AsymmetricProperty";
pub const OWL_REFLEXIVE_PROPERTY: &str = "owl:ReflexiveProperty";
pub const OWL_IRREFLEXIVE_PROPERTY: &str = "owl:IrreflexiveProperty";
pub const OWL_NAMED_INDIVIDUAL: &str = "owl:NamedIndividual";
pub const OWL_AXIOM: &str = "owl:Axiom";

pub const OWL_ON_PROPERTY: &str = "owl:onProperty";
pub const OWL_SOME_VALUES_FROM: &str = "owl:someValuesFrom";
pub const OWL_ALL_VALUES_FROM: &str = "owl:allValuesFrom";
pub const OWL_HAS_VALUE: &str = "owl:hasValue";
pub const OWL_HAS_SELF: &str = "owl:hasSelf";
pub const OWL_UNION_OF: &str = "owl:unionOf";
pub const OWL_INTERSECTION_OF: &str = "owl:intersectionOf";
pub const OWL_COMPLEMENT_OF: &str = "owl:complementOf";
pub const OWL_ONE_OF: &str = "owl:oneOf";
pub const OWL_INVERSE_OF: &str = "owl:inverseOf";
pub const OWL_IMPORTS: &str = "owl:imports";
pub const OWL_EQUIVALENT_CLASS: &str = "owl:equivalentClass";
pub const OWL_SAME_AS: &str = "owl:sameAs";
pub const OWL_DISJOINT_WITH: &str = "owl:disjointWith";
pub const OWL_DEPRECATED: &str = "owl:deprecated";
pub const OWL_ANNOTATED_SOURCE: &str = "owl:annotatedSource";
pub const OWL_ANNOTATED_PROPERTY: &str = "owl:annotatedProperty";
pub const OWL_ANNOTATED_TARGET: &str = "owl:annotatedTarget";

/// Interned ids of every well-known term the derived views match on.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub rdf_type: TermId,
    pub rdf_first: TermId,
    pub rdf_rest: TermId,
    pub rdf_nil: TermId,
    pub rdf_list: TermId,
    pub rdf_property: TermId,
    pub rdfs_class: TermId,
    pub rdfs_sub_class_of: TermId,
    pub rdfs_sub_property_of: TermId,
    pub rdfs_label: TermId,
    pub rdfs_domain: TermId,
    pub rdfs_range: TermId,
    pub owl_ontology: TermId,
    pub owl_class: TermId,
    pub owl_restriction: TermId,
    pub owl_object_property: TermId,
    pub owl_datatype_property: TermId,
    pub owl_annotation_property: TermId,
    pub owl_functional_property: TermId,
    pub owl_inverse_functional_property: TermId,
    pub owl_transitive_property: TermId,
    pub owl_symmetric_property: TermId,
    pub owl_asymmetric_property: TermId,
    pub owl_reflexive_property: TermId,
    pub owl_irreflexive_property: TermId,
    pub owl_named_individual: TermId,
    pub owl_axiom: TermId,
    pub owl_on_property: TermId,
    pub owl_some_values_from: TermId,
    pub owl_all_values_from: TermId,
    pub owl_has_value: TermId,
    pub owl_has_self: TermId,
    pub owl_union_of: TermId,
    pub owl_intersection_of: TermId,
    pub owl_complement_of: TermId,
    pub owl_one_of: TermId,
    pub owl_inverse_of: TermId,
    pub owl_imports: TermId,
    pub owl_equivalent_class: TermId,
    pub owl_same_as: TermId,
    pub owl_disjoint_with: TermId,
    pub owl_deprecated: TermId,
    pub owl_annotated_source: TermId,
    pub owl_annotated_property: TermId,
    pub owl_annotated_target: TermId,
}

impl Vocabulary {
    /// Intern every well-known term, creating ids as needed.
    pub fn resolve(interner: &TermInterner) -> OntoResult<Self> {
        let iri = |lexical: &str| interner.intern(lexical, TermKind::Iri);
        Ok(Self {
            rdf_type: iri(RDF_TYPE)?,
            rdf_first: iri(RDF_FIRST)?,
            rdf_rest: iri(RDF_REST)?,
            rdf_nil: iri(RDF_NIL)?,
            rdf_list: iri(RDF_LIST)?,
            rdf_property: iri(RDF_PROPERTY)?,
            rdfs_class: iri(RDFS_CLASS)?,
            rdfs_sub_class_of: iri(RDFS_SUB_CLASS_OF)?,
            rdfs_sub_property_of: iri(RDFS_SUB_PROPERTY_OF)?,
            rdfs_label: iri(RDFS_LABEL)?,
            rdfs_domain: iri(RDFS_DOMAIN)?,
            rdfs_range: iri(RDFS_RANGE)?,
            owl_ontology: iri(OWL_ONTOLOGY)?,
            owl_class: iri(OWL_CLASS)?,
            owl_restriction: iri(OWL_RESTRICTION)?,
            owl_object_property: iri(OWL_OBJECT_PROPERTY)?,
            owl_datatype_property: iri(OWL_DATATYPE_PROPERTY)?,
            owl_annotation_property: iri(OWL_ANNOTATION_PROPERTY)?,
            owl_functional_property: iri(OWL_FUNCTIONAL_PROPERTY)?,
            owl_inverse_functional_property: iri(OWL_INVERSE_FUNCTIONAL_PROPERTY)?,
            owl_transitive_property: iri(OWL_TRANSITIVE_PROPERTY)?,
            owl_symmetric_property: iri(OWL_SYMMETRIC_PROPERTY)?,
            owl_asymmetric_property: iri(OWL_ASYMMETRIC_PROPERTY)?,
            owl_reflexive_property: iri(OWL_REFLEXIVE_PROPERTY)?,
            owl_irreflexive_property: iri(OWL_IRREFLEXIVE_PROPERTY)?,
            owl_named_individual: iri(OWL_NAMED_INDIVIDUAL)?,
            owl_axiom: iri(OWL_AXIOM)?,
            owl_on_property: iri(OWL_ON_PROPERTY)?,
            owl_some_values_from: iri(OWL_SOME_VALUES_FROM)?,
            owl_all_values_from: iri(OWL_ALL_VALUES_FROM)?,
            owl_has_value: iri(OWL_HAS_VALUE)?,
            owl_has_self: iri(OWL_HAS_SELF)?,
            owl_union_of: iri(OWL_UNION_OF)?,
            owl_intersection_of: iri(OWL_INTERSECTION_OF)?,
            owl_complement_of: iri(OWL_COMPLEMENT_OF)?,
            owl_one_of: iri(OWL_ONE_OF)?,
            owl_inverse_of: iri(OWL_INVERSE_OF)?,
            owl_imports: iri(OWL_IMPORTS)?,
            owl_equivalent_class: iri(OWL_EQUIVALENT_CLASS)?,
            owl_same_as: iri(OWL_SAME_AS)?,
            owl_disjoint_with: iri(OWL_DISJOINT_WITH)?,
            owl_deprecated: iri(OWL_DEPRECATED)?,
            owl_annotated_source: iri(OWL_ANNOTATED_SOURCE)?,
            owl_annotated_property: iri(OWL_ANNOTATED_PROPERTY)?,
            owl_annotated_target: iri(OWL_ANNOTATED_TARGET)?,
        })
    }
}
