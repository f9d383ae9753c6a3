//! Versioned, immutable registry of FHIR type nodes.
//!
//! Nodes live in a flat pool indexed by [`TypeId`]. Lookups hand out
//! borrowed handles ([`TypeRef`], [`StructRef`], [`PropertyRef`]) that can
//! follow base links and property types without touching the name index.

pub mod builder;
pub mod embedded;

pub use builder::{DefinitionSet, PropertyDecl, RESOURCE_TYPE_FIELD, RegistryBuilder, TypeDecl};
pub use embedded::{R4_DEFINITIONS, r4_definitions};

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::Result;
use crate::types::{PrimitiveFacet, Property, StructFacet, TypeId, TypeKind, TypeNode};

pub struct TypeRegistry {
    symbolic_version: String,
    version: String,
    nodes: Vec<TypeNode>,
    by_name: HashMap<String, TypeId>,
    root: TypeId,
}

impl TypeRegistry {
    /// Only reachable through [`RegistryBuilder::build`], after every
    /// integrity check has passed.
    pub(crate) fn from_parts(
        symbolic_version: String,
        version: String,
        nodes: Vec<TypeNode>,
        by_name: HashMap<String, TypeId>,
        root: TypeId,
    ) -> Self {
        Self {
            symbolic_version,
            version,
            nodes,
            by_name,
            root,
        }
    }

    pub fn builder(symbolic_version: impl Into<String>, version: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder::new(symbolic_version, version)
    }

    pub fn from_definitions(definitions: DefinitionSet) -> Result<Self> {
        definitions.into_builder().build()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_definitions(DefinitionSet::from_json_str(json)?)
    }

    /// Short release label, e.g. `R4`.
    pub fn symbolic_version(&self) -> &str {
        &self.symbolic_version
    }

    /// Full version number, e.g. `4.0.1`.
    pub fn version_string(&self) -> &str {
        &self.version
    }

    /// Look up a type by its internal name. Unknown names are `None`.
    pub fn type_by_name(&self, name: &str) -> Option<TypeRef<'_>> {
        self.by_name.get(name).map(|&id| self.type_ref(id))
    }

    pub fn get(&self, id: TypeId) -> Option<TypeRef<'_>> {
        (id.index() < self.nodes.len()).then(|| self.type_ref(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> TypeRef<'_> {
        self.type_ref(self.root)
    }

    /// All types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = TypeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |index| self.type_ref(TypeId::new(index)))
    }

    pub fn resources(&self) -> impl Iterator<Item = TypeRef<'_>> + '_ {
        self.types()
            .filter(|ty| ty.type_kind() == TypeKind::Resource)
    }

    pub fn primitives(&self) -> impl Iterator<Item = TypeRef<'_>> + '_ {
        self.types()
            .filter(|ty| ty.type_kind() == TypeKind::Primitive)
    }

    fn type_ref(&self, id: TypeId) -> TypeRef<'_> {
        TypeRef { registry: self, id }
    }

    fn node(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("symbolic_version", &self.symbolic_version)
            .field("version", &self.version)
            .field("types", &self.nodes.len())
            .finish()
    }
}

/// A type node borrowed from its registry.
#[derive(Clone, Copy)]
pub struct TypeRef<'a> {
    registry: &'a TypeRegistry,
    id: TypeId,
}

impl<'a> TypeRef<'a> {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    pub fn node(&self) -> &'a TypeNode {
        self.registry.node(self.id)
    }

    pub fn internal_name(&self) -> &'a str {
        self.node().internal_name()
    }

    pub fn base(&self) -> Option<TypeRef<'a>> {
        self.node().base_id().map(|id| self.registry.type_ref(id))
    }

    pub fn type_kind(&self) -> TypeKind {
        self.node().type_kind()
    }

    pub fn is_root(&self) -> bool {
        self.node().base_id().is_none()
    }

    pub fn is_struct(&self) -> bool {
        self.type_kind().is_struct()
    }

    pub fn is_primitive(&self) -> bool {
        self.type_kind() == TypeKind::Primitive
    }

    /// Struct view. Fails with `KindMismatch` on primitives.
    pub fn as_struct(&self) -> Result<StructRef<'a>> {
        let facet = self.node().struct_facet()?;
        Ok(StructRef { ty: *self, facet })
    }

    /// Primitive view. Fails with `KindMismatch` on element and resource types.
    pub fn as_primitive(&self) -> Result<&'a PrimitiveFacet> {
        self.node().primitive_facet()
    }

    /// Base chain, nearest ancestor first, ending at the root.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors { next: self.base() }
    }

    /// Reflexive: every type is a subtype of itself.
    pub fn is_subtype_of(&self, other: &TypeRef<'_>) -> bool {
        std::ptr::eq(self.registry, other.registry)
            && (self.id == other.id || self.ancestors().any(|a| a.id == other.id))
    }
}

impl PartialEq for TypeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.registry, other.registry) && self.id == other.id
    }
}

impl Eq for TypeRef<'_> {}

impl fmt::Debug for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRef")
            .field("name", &self.internal_name())
            .field("kind", &self.type_kind())
            .finish()
    }
}

impl fmt::Display for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.internal_name())
    }
}

pub struct Ancestors<'a> {
    next: Option<TypeRef<'a>>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = TypeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base();
        Some(current)
    }
}

/// Struct view of an Element or Resource type.
#[derive(Clone, Copy)]
pub struct StructRef<'a> {
    ty: TypeRef<'a>,
    facet: &'a StructFacet,
}

impl<'a> StructRef<'a> {
    pub fn type_ref(&self) -> TypeRef<'a> {
        self.ty
    }

    pub fn internal_name(&self) -> &'a str {
        self.ty.internal_name()
    }

    pub fn anonymous(&self) -> bool {
        self.facet.anonymous()
    }

    /// Struct view of the base type. Structural types only derive from
    /// structural types, so this is `None` only at the root.
    pub fn base(&self) -> Option<StructRef<'a>> {
        self.ty.base().and_then(|base| base.as_struct().ok())
    }

    /// Own declarations in declaration order.
    pub fn declared_properties(self) -> impl Iterator<Item = PropertyRef<'a>> + 'a {
        let owner = self.ty;
        self.facet
            .properties()
            .values()
            .map(move |property| PropertyRef { owner, property })
    }

    pub fn declared_property(&self, name: &str) -> Option<PropertyRef<'a>> {
        self.facet
            .properties()
            .get(name)
            .map(|property| PropertyRef {
                owner: self.ty,
                property,
            })
    }

    /// Look up a property on this type, then on each ancestor. The
    /// most-derived declaration wins.
    pub fn prop_by_name(&self, name: &str) -> Option<PropertyRef<'a>> {
        self.chain().find_map(|ty| ty.declared_property(name))
    }

    /// Own and inherited properties, most-derived first. Names declared
    /// again further down the chain hide the ancestor's entry.
    pub fn properties(&self) -> Vec<PropertyRef<'a>> {
        let mut seen = HashSet::new();
        self.chain()
            .flat_map(|ty| ty.declared_properties())
            .filter(|prop| seen.insert(prop.name()))
            .collect()
    }

    /// Concrete alternatives of choice field `choice`, in declaration order.
    /// The nearest type declaring any alternative owns the whole group.
    pub fn choice_properties(&self, choice: &str) -> Vec<PropertyRef<'a>> {
        self.chain()
            .map(|ty| {
                ty.declared_properties()
                    .filter(|prop| prop.choice() == Some(choice))
                    .collect::<Vec<_>>()
            })
            .find(|alternatives| !alternatives.is_empty())
            .unwrap_or_default()
    }

    pub fn has_choice(&self, choice: &str) -> bool {
        self.chain().any(|ty| {
            ty.declared_properties()
                .any(|prop| prop.choice() == Some(choice))
        })
    }

    /// This type followed by its structural ancestors.
    fn chain(self) -> impl Iterator<Item = StructRef<'a>> + 'a {
        std::iter::successors(Some(self), |ty| ty.base())
    }
}

impl fmt::Debug for StructRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructRef")
            .field("name", &self.internal_name())
            .field("anonymous", &self.anonymous())
            .field("declared", &self.facet.properties().len())
            .finish()
    }
}

/// A property together with the type that declares it.
#[derive(Clone, Copy)]
pub struct PropertyRef<'a> {
    owner: TypeRef<'a>,
    property: &'a Property,
}

impl<'a> PropertyRef<'a> {
    pub fn property(&self) -> &'a Property {
        self.property
    }

    pub fn name(&self) -> &'a str {
        self.property.name()
    }

    /// The value type.
    pub fn property_type(&self) -> TypeRef<'a> {
        self.owner.registry.type_ref(self.property.type_id())
    }

    pub fn declared_by(&self) -> TypeRef<'a> {
        self.owner
    }

    pub fn choice(&self) -> Option<&'a str> {
        self.property.choice()
    }

    pub fn array(&self) -> bool {
        self.property.array()
    }

    pub fn enum_values(&self) -> Option<&'a [String]> {
        self.property.enum_values()
    }

    pub fn permits(&self, literal: &str) -> bool {
        self.property.permits(literal)
    }
}

impl fmt::Debug for PropertyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRef")
            .field("name", &self.name())
            .field("type", &self.property_type().internal_name())
            .field("declared_by", &self.owner.internal_name())
            .field("choice", &self.choice())
            .field("array", &self.array())
            .finish()
    }
}
