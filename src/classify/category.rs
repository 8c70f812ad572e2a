//! Node categories: one tagged enum instead of a class hierarchy.
//!
//! [`CategoryTag`] is the fieldless lattice used for precedence and ancestry.
//! [`NodeCategory`] is what classification returns: the terminal tag plus, for
//! restrictions, the property and filler that define them.

use serde::{Deserialize, Serialize};

/// Fieldless category tag with a fixed single-parent hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryTag {
    /// Abstract root; never assigned.
    Node,
    IriNode,
    BlankNode,
    OntologyNode,
    ClassNode,
    PropertyNode,
    ObjectPropertyNode,
    AnnotationPropertyNode,
    DatatypePropertyNode,
    TransitivePropertyNode,
    SymmetricPropertyNode,
    AsymmetricPropertyNode,
    ReflexivePropertyNode,
    IrreflexivePropertyNode,
    NamedIndividualNode,
    AnonymousExpression,
    AnonymousClassExpression,
    AnonymousPropertyExpression,
    AnonymousIndividualExpression,
    OwlRestriction,
    SomeValuesFrom,
    AllValuesFrom,
    HasValue,
    HasSelf,
    RdfListNode,
}

impl CategoryTag {
    /// Every tag, root first.
    pub const ALL: [CategoryTag; 25] = [
        CategoryTag::Node,
        CategoryTag::IriNode,
        CategoryTag::BlankNode,
        CategoryTag::OntologyNode,
        CategoryTag::ClassNode,
        CategoryTag::PropertyNode,
        CategoryTag::ObjectPropertyNode,
        CategoryTag::AnnotationPropertyNode,
        CategoryTag::DatatypePropertyNode,
        CategoryTag::TransitivePropertyNode,
        CategoryTag::SymmetricPropertyNode,
        CategoryTag::AsymmetricPropertyNode,
        CategoryTag::ReflexivePropertyNode,
        CategoryTag::IrreflexivePropertyNode,
        CategoryTag::NamedIndividualNode,
        CategoryTag::AnonymousExpression,
        CategoryTag::AnonymousClassExpression,
        CategoryTag::AnonymousPropertyExpression,
        CategoryTag::AnonymousIndividualExpression,
        CategoryTag::OwlRestriction,
        CategoryTag::SomeValuesFrom,
        CategoryTag::AllValuesFrom,
        CategoryTag::HasValue,
        CategoryTag::HasSelf,
        CategoryTag::RdfListNode,
    ];

    /// The immediate parent, `None` for the root.
    pub fn parent(self) -> Option<CategoryTag> {
        use CategoryTag::*;
        match self {
            Node => None,
            IriNode | BlankNode => Some(Node),
            OntologyNode | ClassNode | PropertyNode | NamedIndividualNode => Some(IriNode),
            ObjectPropertyNode | AnnotationPropertyNode | DatatypePropertyNode => {
                Some(PropertyNode)
            }
            TransitivePropertyNode
            | SymmetricPropertyNode
            | AsymmetricPropertyNode
            | ReflexivePropertyNode
            | IrreflexivePropertyNode => Some(ObjectPropertyNode),
            AnonymousExpression | RdfListNode => Some(BlankNode),
            AnonymousClassExpression
            | AnonymousPropertyExpression
            | AnonymousIndividualExpression => Some(AnonymousExpression),
            OwlRestriction => Some(AnonymousClassExpression),
            SomeValuesFrom | AllValuesFrom | HasValue | HasSelf => Some(OwlRestriction),
        }
    }

    /// Reflexive ancestry check: `self` is `other` or lies below it.
    pub fn is_a(self, other: CategoryTag) -> bool {
        let mut current = Some(self);
        while let Some(tag) = current {
            if tag == other {
                return true;
            }
            current = tag.parent();
        }
        false
    }

    /// Distance from the root.
    pub fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(tag) = current {
            depth += 1;
            current = tag.parent();
        }
        depth
    }

    /// The deepest tag both `self` and `other` are-a.
    pub fn common_ancestor(self, other: CategoryTag) -> CategoryTag {
        let mut current = Some(self);
        while let Some(tag) = current {
            if other.is_a(tag) {
                return tag;
            }
            current = tag.parent();
        }
        CategoryTag::Node
    }

    /// Fixed precedence among co-assertable object property characteristics.
    ///
    /// Lower ranks win. Tags outside this group have no rank.
    pub fn characteristic_rank(self) -> Option<u8> {
        match self {
            CategoryTag::TransitivePropertyNode => Some(0),
            CategoryTag::SymmetricPropertyNode => Some(1),
            CategoryTag::AsymmetricPropertyNode => Some(2),
            CategoryTag::ReflexivePropertyNode => Some(3),
            CategoryTag::IrreflexivePropertyNode => Some(4),
            _ => None,
        }
    }

    /// Name of the relation listing nodes of this category.
    pub fn relation_name(self) -> &'static str {
        use CategoryTag::*;
        match self {
            Node => "node",
            IriNode => "iri_node",
            BlankNode => "blank_node",
            OntologyNode => "ontology_node",
            ClassNode => "class_node",
            PropertyNode => "property_node",
            ObjectPropertyNode => "object_property_node",
            AnnotationPropertyNode => "annotation_property_node",
            DatatypePropertyNode => "datatype_property_node",
            TransitivePropertyNode => "transitive_property_node",
            SymmetricPropertyNode => "symmetric_property_node",
            AsymmetricPropertyNode => "asymmetric_property_node",
            ReflexivePropertyNode => "reflexive_property_node",
            IrreflexivePropertyNode => "irreflexive_property_node",
            NamedIndividualNode => "named_individual_node",
            AnonymousExpression => "anonymous_expression",
            AnonymousClassExpression => "anonymous_class_expression",
            AnonymousPropertyExpression => "anonymous_property_expression",
            AnonymousIndividualExpression => "anonymous_individual_expression",
            OwlRestriction => "owl_restriction",
            SomeValuesFrom => "owl_some_values_from",
            AllValuesFrom => "owl_all_values_from",
            HasValue => "owl_has_value",
            HasSelf => "owl_has_self",
            RdfListNode => "rdf_list_node",
        }
    }

    /// Inverse of [`CategoryTag::relation_name`].
    pub fn from_relation_name(name: &str) -> Option<CategoryTag> {
        CategoryTag::ALL
            .into_iter()
            .find(|tag| tag.relation_name() == name)
    }

    /// Whether the relation for this tag carries restriction columns.
    pub fn is_restriction(self) -> bool {
        self.is_a(CategoryTag::OwlRestriction)
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// The defining parts of an OWL restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Restriction {
    /// Object of `owl:onProperty`.
    pub on_property: String,
    /// Object or value of the companion predicate; `None` for restrictions
    /// without a single recognized companion (cardinality, conflicting).
    pub filler: Option<String>,
}

impl Restriction {
    pub fn new(on_property: impl Into<String>, filler: Option<String>) -> Self {
        Self {
            on_property: on_property.into(),
            filler,
        }
    }
}

/// The terminal category assigned to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    IriNode,
    BlankNode,
    OntologyNode,
    ClassNode,
    PropertyNode,
    ObjectPropertyNode,
    AnnotationPropertyNode,
    DatatypePropertyNode,
    TransitivePropertyNode,
    SymmetricPropertyNode,
    AsymmetricPropertyNode,
    ReflexivePropertyNode,
    IrreflexivePropertyNode,
    NamedIndividualNode,
    AnonymousExpression,
    AnonymousClassExpression,
    AnonymousPropertyExpression,
    AnonymousIndividualExpression,
    OwlRestriction(Restriction),
    SomeValuesFrom(Restriction),
    AllValuesFrom(Restriction),
    HasValue(Restriction),
    HasSelf(Restriction),
    RdfListNode,
}

impl NodeCategory {
    /// Build a payload-free category. Returns `None` for the root and for
    /// restriction tags, which need [`NodeCategory::restriction_of`].
    pub fn from_tag(tag: CategoryTag) -> Option<NodeCategory> {
        use CategoryTag as T;
        Some(match tag {
            T::Node => return None,
            T::IriNode => NodeCategory::IriNode,
            T::BlankNode => NodeCategory::BlankNode,
            T::OntologyNode => NodeCategory::OntologyNode,
            T::ClassNode => NodeCategory::ClassNode,
            T::PropertyNode => NodeCategory::PropertyNode,
            T::ObjectPropertyNode => NodeCategory::ObjectPropertyNode,
            T::AnnotationPropertyNode => NodeCategory::AnnotationPropertyNode,
            T::DatatypePropertyNode => NodeCategory::DatatypePropertyNode,
            T::TransitivePropertyNode => NodeCategory::TransitivePropertyNode,
            T::SymmetricPropertyNode => NodeCategory::SymmetricPropertyNode,
            T::AsymmetricPropertyNode => NodeCategory::AsymmetricPropertyNode,
            T::ReflexivePropertyNode => NodeCategory::ReflexivePropertyNode,
            T::IrreflexivePropertyNode => NodeCategory::IrreflexivePropertyNode,
            T::NamedIndividualNode => NodeCategory::NamedIndividualNode,
            T::AnonymousExpression => NodeCategory::AnonymousExpression,
            T::AnonymousClassExpression => NodeCategory::AnonymousClassExpression,
            T::AnonymousPropertyExpression => NodeCategory::AnonymousPropertyExpression,
            T::AnonymousIndividualExpression => NodeCategory::AnonymousIndividualExpression,
            T::RdfListNode => NodeCategory::RdfListNode,
            T::OwlRestriction | T::SomeValuesFrom | T::AllValuesFrom | T::HasValue | T::HasSelf => {
                return None;
            }
        })
    }

    /// Build a restriction category. Returns `None` for non-restriction tags.
    pub fn restriction_of(tag: CategoryTag, restriction: Restriction) -> Option<NodeCategory> {
        Some(match tag {
            CategoryTag::OwlRestriction => NodeCategory::OwlRestriction(restriction),
            CategoryTag::SomeValuesFrom => NodeCategory::SomeValuesFrom(restriction),
            CategoryTag::AllValuesFrom => NodeCategory::AllValuesFrom(restriction),
            CategoryTag::HasValue => NodeCategory::HasValue(restriction),
            CategoryTag::HasSelf => NodeCategory::HasSelf(restriction),
            _ => return None,
        })
    }

    /// The fieldless tag of this category.
    pub fn tag(&self) -> CategoryTag {
        use CategoryTag as T;
        match self {
            NodeCategory::IriNode => T::IriNode,
            NodeCategory::BlankNode => T::BlankNode,
            NodeCategory::OntologyNode => T::OntologyNode,
            NodeCategory::ClassNode => T::ClassNode,
            NodeCategory::PropertyNode => T::PropertyNode,
            NodeCategory::ObjectPropertyNode => T::ObjectPropertyNode,
            NodeCategory::AnnotationPropertyNode => T::AnnotationPropertyNode,
            NodeCategory::DatatypePropertyNode => T::DatatypePropertyNode,
            NodeCategory::TransitivePropertyNode => T::TransitivePropertyNode,
            NodeCategory::SymmetricPropertyNode => T::SymmetricPropertyNode,
            NodeCategory::AsymmetricPropertyNode => T::AsymmetricPropertyNode,
            NodeCategory::ReflexivePropertyNode => T::ReflexivePropertyNode,
            NodeCategory::IrreflexivePropertyNode => T::IrreflexivePropertyNode,
            NodeCategory::NamedIndividualNode => T::NamedIndividualNode,
            NodeCategory::AnonymousExpression => T::AnonymousExpression,
            NodeCategory::AnonymousClassExpression => T::AnonymousClassExpression,
            NodeCategory::AnonymousPropertyExpression => T::AnonymousPropertyExpression,
            NodeCategory::AnonymousIndividualExpression => T::AnonymousIndividualExpression,
            NodeCategory::OwlRestriction(_) => T::OwlRestriction,
            NodeCategory::SomeValuesFrom(_) => T::SomeValuesFrom,
            NodeCategory::AllValuesFrom(_) => T::AllValuesFrom,
            NodeCategory::HasValue(_) => T::HasValue,
            NodeCategory::HasSelf(_) => T::HasSelf,
            NodeCategory::RdfListNode => T::RdfListNode,
        }
    }

    /// The restriction payload, if this is a restriction.
    pub fn restriction(&self) -> Option<&Restriction> {
        match self {
            NodeCategory::OwlRestriction(r)
            | NodeCategory::SomeValuesFrom(r)
            | NodeCategory::AllValuesFrom(r)
            | NodeCategory::HasValue(r)
            | NodeCategory::HasSelf(r) => Some(r),
            _ => None,
        }
    }

    /// Shorthand for `self.tag().is_a(tag)`.
    pub fn is_a(&self, tag: CategoryTag) -> bool {
        self.tag().is_a(tag)
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.restriction() {
            Some(r) => write!(
                f,
                "{}({} {})",
                self.tag(),
                r.on_property,
                r.filler.as_deref().unwrap_or("-")
            ),
            None => write!(f, "{}", self.tag()),
        }
    }
}
