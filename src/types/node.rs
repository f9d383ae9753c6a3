use indexmap::IndexMap;
use std::fmt;

use super::{PrimitiveFacet, Property, TypeKind};
use crate::error::{FhirTypesError, Result};

/// Index of a type node inside its registry.
///
/// Base links and property types are stored as ids, so nodes never own each
/// other and reference cycles through properties (`Element.extension` is an
/// `Extension`, which derives from `Element`) are fine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// `index` must fit in a `u32`. The builder rejects larger definition
    /// sets before any id is created.
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(u32::try_from(index).is_ok());
        Self(index as u32)
    }

    pub(crate) fn try_new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Properties and flags shared by Element and Resource types.
#[derive(Debug, Clone, Default)]
pub struct StructFacet {
    pub(crate) anonymous: bool,
    pub(crate) properties: IndexMap<String, Property>,
}

impl StructFacet {
    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    /// Own declarations only, in declaration order.
    pub fn properties(&self) -> &IndexMap<String, Property> {
        &self.properties
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Facet {
    Primitive(PrimitiveFacet),
    Struct(StructFacet),
}

/// A named type. The kind and its facet are fixed when the node is created.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub(crate) name: String,
    pub(crate) base: Option<TypeId>,
    pub(crate) kind: TypeKind,
    pub(crate) facet: Facet,
}

impl TypeNode {
    pub(crate) fn primitive(name: String, base: Option<TypeId>, facet: PrimitiveFacet) -> Self {
        Self {
            name,
            base,
            kind: TypeKind::Primitive,
            facet: Facet::Primitive(facet),
        }
    }

    /// `kind` must be Element or Resource.
    pub(crate) fn structure(
        name: String,
        base: Option<TypeId>,
        kind: TypeKind,
        facet: StructFacet,
    ) -> Self {
        debug_assert!(kind.is_struct());
        Self {
            name,
            base,
            kind,
            facet: Facet::Struct(facet),
        }
    }

    pub fn internal_name(&self) -> &str {
        &self.name
    }

    pub fn base_id(&self) -> Option<TypeId> {
        self.base
    }

    pub fn type_kind(&self) -> TypeKind {
        self.kind
    }

    pub fn struct_facet(&self) -> Result<&StructFacet> {
        match &self.facet {
            Facet::Struct(facet) => Ok(facet),
            Facet::Primitive(_) => Err(FhirTypesError::kind_mismatch(
                &self.name,
                "element or resource",
                self.kind,
            )),
        }
    }

    pub fn primitive_facet(&self) -> Result<&PrimitiveFacet> {
        match &self.facet {
            Facet::Primitive(facet) => Ok(facet),
            Facet::Struct(_) => Err(FhirTypesError::kind_mismatch(
                &self.name,
                "primitive",
                self.kind,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SimpleType;

    #[test]
    fn test_type_id_range() {
        assert_eq!(TypeId::try_new(7).map(TypeId::index), Some(7));
        assert_eq!(TypeId::try_new(u32::MAX as usize).map(TypeId::index), Some(u32::MAX as usize));
        #[cfg(target_pointer_width = "64")]
        assert!(TypeId::try_new(u32::MAX as usize + 1).is_none());
    }

    #[test]
    fn test_facet_access_follows_kind() {
        let facet = PrimitiveFacet::compile("boolean", Some("^true|false$"), SimpleType::Boolean)
            .unwrap();
        let boolean = TypeNode::primitive("boolean".into(), Some(TypeId::new(0)), facet);

        assert!(boolean.primitive_facet().is_ok());
        let err = boolean.struct_facet().unwrap_err();
        assert!(err.is_kind_mismatch());

        let patient = TypeNode::structure(
            "Patient".into(),
            Some(TypeId::new(1)),
            TypeKind::Resource,
            StructFacet::default(),
        );
        assert!(patient.struct_facet().is_ok());
        assert!(patient.primitive_facet().unwrap_err().is_kind_mismatch());
    }
}
