//! Construction protocol for [`TypeRegistry`].
//!
//! Loaders hand declarations to a [`RegistryBuilder`] in any order. Nothing
//! is resolved until [`RegistryBuilder::build`], which either produces a
//! complete registry or fails with the first integrity error it finds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info};

use super::TypeRegistry;
use crate::error::{FhirTypesError, Result};
use crate::types::{
    PrimitiveFacet, Property, SimpleType, StructFacet, TypeId, TypeKind, TypeNode,
    choice_property_name,
};

/// Discriminator field of resources. It is structural metadata and never a
/// declared property.
pub const RESOURCE_TYPE_FIELD: &str = "resourceType";

/// A complete set of declarations for one edition of the standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionSet {
    pub symbolic_version: String,
    pub version: String,
    pub types: Vec<TypeDecl>,
}

impl DefinitionSet {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    pub fn into_builder(self) -> RegistryBuilder {
        let mut builder = RegistryBuilder::new(self.symbolic_version, self.version);
        builder.decls = self.types;
        builder
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<SimpleType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDecl>,
}

impl TypeDecl {
    fn new(name: impl Into<String>, kind: TypeKind, base: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind,
            base: base.map(str::to_string),
            pattern: None,
            simple_type: None,
            anonymous: false,
            properties: Vec::new(),
        }
    }

    pub fn primitive(
        name: impl Into<String>,
        base: &str,
        pattern: Option<&str>,
        simple_type: SimpleType,
    ) -> Self {
        let mut decl = Self::new(name, TypeKind::Primitive, Some(base));
        decl.pattern = pattern.map(str::to_string);
        decl.simple_type = Some(simple_type);
        decl
    }

    /// The root: an element type without a base.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Element, None)
    }

    pub fn element(name: impl Into<String>, base: &str) -> Self {
        Self::new(name, TypeKind::Element, Some(base))
    }

    pub fn resource(name: impl Into<String>, base: &str) -> Self {
        Self::new(name, TypeKind::Resource, Some(base))
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }
}

/// A declared property. Exactly one of `type_name` (ordinary property) or
/// `choice` (the permitted types of a choice field) is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            choice: None,
            array: false,
            enum_values: None,
        }
    }

    pub fn choice<I, S>(name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            type_name: None,
            choice: Some(types.into_iter().map(Into::into).collect()),
            array: false,
            enum_values: None,
        }
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    symbolic_version: String,
    version: String,
    decls: Vec<TypeDecl>,
}

impl RegistryBuilder {
    pub fn new(symbolic_version: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            symbolic_version: symbolic_version.into(),
            version: version.into(),
            decls: Vec::new(),
        }
    }

    pub fn declare(&mut self, decl: TypeDecl) -> &mut Self {
        self.decls.push(decl);
        self
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Resolve every declaration and publish the registry.
    pub fn build(self) -> Result<TypeRegistry> {
        self.build_inner().inspect_err(|e| {
            error!(error = %e, "type registry construction failed");
        })
    }

    fn build_inner(self) -> Result<TypeRegistry> {
        let by_name = self.index_names()?;
        debug!(types = by_name.len(), "indexed type declarations");

        let bases = self.resolve_bases(&by_name)?;
        let root = self.check_roots(&bases)?;
        self.check_base_kinds(&bases)?;
        self.check_acyclic(&bases)?;
        debug!(root = %self.decls[root.index()].name, "resolved base chains");

        let mut nodes = Vec::with_capacity(self.decls.len());
        for (decl, base) in self.decls.iter().zip(&bases) {
            nodes.push(self.build_node(decl, *base, &by_name)?);
        }
        debug!("resolved properties");

        let registry = TypeRegistry::from_parts(
            self.symbolic_version,
            self.version,
            nodes,
            by_name,
            root,
        );
        info!(
            version = %registry.version_string(),
            symbolic = %registry.symbolic_version(),
            types = registry.len(),
            resources = registry.resources().count(),
            primitives = registry.primitives().count(),
            "built type registry"
        );
        Ok(registry)
    }

    fn index_names(&self) -> Result<HashMap<String, TypeId>> {
        if TypeId::try_new(self.decls.len()).is_none() {
            return Err(FhirTypesError::TooManyTypes {
                count: self.decls.len(),
            });
        }

        let mut by_name = HashMap::with_capacity(self.decls.len());
        for (index, decl) in self.decls.iter().enumerate() {
            if by_name.insert(decl.name.clone(), TypeId::new(index)).is_some() {
                return Err(FhirTypesError::duplicate_type(decl.name.as_str()));
            }
        }
        Ok(by_name)
    }

    fn resolve_bases(&self, by_name: &HashMap<String, TypeId>) -> Result<Vec<Option<TypeId>>> {
        self.decls
            .iter()
            .map(|decl| match &decl.base {
                None => Ok(None),
                Some(base) => by_name
                    .get(base)
                    .copied()
                    .map(Some)
                    .ok_or_else(|| FhirTypesError::unresolved_base(&decl.name, base)),
            })
            .collect()
    }

    fn check_roots(&self, bases: &[Option<TypeId>]) -> Result<TypeId> {
        let roots: Vec<usize> = bases
            .iter()
            .enumerate()
            .filter(|(_, base)| base.is_none())
            .map(|(index, _)| index)
            .collect();

        match roots.as_slice() {
            [] => Err(FhirTypesError::MissingRoot),
            [root] => {
                let decl = &self.decls[*root];
                if decl.kind != TypeKind::Element {
                    return Err(FhirTypesError::invalid_base(
                        decl.name.clone(),
                        format!("the root type must be an element type, not {}", decl.kind),
                    ));
                }
                Ok(TypeId::new(*root))
            }
            _ => Err(FhirTypesError::MultipleRoots {
                roots: roots.iter().map(|&i| self.decls[i].name.clone()).collect(),
            }),
        }
    }

    fn check_base_kinds(&self, bases: &[Option<TypeId>]) -> Result<()> {
        for (decl, base) in self.decls.iter().zip(bases) {
            let Some(base) = base else { continue };
            let base_decl = &self.decls[base.index()];
            let compatible = match decl.kind {
                TypeKind::Primitive => true,
                TypeKind::Element => base_decl.kind == TypeKind::Element,
                TypeKind::Resource => base_decl.kind.is_struct(),
            };
            if !compatible {
                return Err(FhirTypesError::invalid_base(
                    decl.name.clone(),
                    format!(
                        "{} type cannot derive from {} {}",
                        decl.kind, base_decl.kind, base_decl.name
                    ),
                ));
            }
        }
        Ok(())
    }

    fn check_acyclic(&self, bases: &[Option<TypeId>]) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; bases.len()];
        for start in 0..bases.len() {
            let mut path: Vec<usize> = Vec::new();
            let mut current = Some(start);
            while let Some(index) = current {
                match marks[index] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        let from = path.iter().position(|&i| i == index).unwrap_or(0);
                        let mut chain: Vec<String> = path[from..]
                            .iter()
                            .map(|&i| self.decls[i].name.clone())
                            .collect();
                        chain.push(self.decls[index].name.clone());
                        return Err(FhirTypesError::CyclicBase { chain });
                    }
                    Mark::Unvisited => {
                        marks[index] = Mark::OnPath;
                        path.push(index);
                        current = bases[index].map(TypeId::index);
                    }
                }
            }
            for index in path {
                marks[index] = Mark::Done;
            }
        }
        Ok(())
    }

    fn build_node(
        &self,
        decl: &TypeDecl,
        base: Option<TypeId>,
        by_name: &HashMap<String, TypeId>,
    ) -> Result<TypeNode> {
        match decl.kind {
            TypeKind::Primitive => {
                if !decl.properties.is_empty() || decl.anonymous {
                    return Err(FhirTypesError::invalid_declaration(
                        decl.name.as_str(),
                        "primitive types cannot be anonymous or declare properties",
                    ));
                }
                let simple_type = decl.simple_type.ok_or_else(|| {
                    FhirTypesError::invalid_declaration(
                        decl.name.as_str(),
                        "primitive types must declare a simple type",
                    )
                })?;
                let facet =
                    PrimitiveFacet::compile(&decl.name, decl.pattern.as_deref(), simple_type)?;
                Ok(TypeNode::primitive(decl.name.clone(), base, facet))
            }
            TypeKind::Element | TypeKind::Resource => {
                if decl.pattern.is_some() || decl.simple_type.is_some() {
                    return Err(FhirTypesError::invalid_declaration(
                        decl.name.as_str(),
                        "structural types cannot carry a pattern or simple type",
                    ));
                }
                let facet = StructFacet {
                    anonymous: decl.anonymous,
                    properties: self.build_properties(decl, by_name)?,
                };
                Ok(TypeNode::structure(decl.name.clone(), base, decl.kind, facet))
            }
        }
    }

    fn build_properties(
        &self,
        decl: &TypeDecl,
        by_name: &HashMap<String, TypeId>,
    ) -> Result<IndexMap<String, Property>> {
        let mut properties = IndexMap::with_capacity(decl.properties.len());

        for prop in &decl.properties {
            let alternatives: Vec<(String, &str, Option<&str>)> =
                match (&prop.type_name, &prop.choice) {
                    (Some(type_name), None) => {
                        vec![(prop.name.clone(), type_name.as_str(), None)]
                    }
                    (None, Some(types)) if !types.is_empty() => types
                        .iter()
                        .map(|t| {
                            (
                                choice_property_name(&prop.name, t),
                                t.as_str(),
                                Some(prop.name.as_str()),
                            )
                        })
                        .collect(),
                    (None, Some(_)) => {
                        return Err(FhirTypesError::invalid_property(
                            decl.name.as_str(),
                            prop.name.as_str(),
                            "choice property lists no types",
                        ));
                    }
                    _ => {
                        return Err(FhirTypesError::invalid_property(
                            decl.name.as_str(),
                            prop.name.as_str(),
                            "exactly one of `type` or `choice` is required",
                        ));
                    }
                };

            for (name, type_name, choice) in alternatives {
                if decl.kind == TypeKind::Resource && name == RESOURCE_TYPE_FIELD {
                    return Err(FhirTypesError::ReservedProperty {
                        type_name: decl.name.clone(),
                        property: name,
                    });
                }

                let type_id = by_name.get(type_name).copied().ok_or_else(|| {
                    FhirTypesError::unresolved_property_type(
                        decl.name.as_str(),
                        name.as_str(),
                        type_name,
                    )
                })?;

                if let Some(values) = &prop.enum_values {
                    if values.is_empty() {
                        return Err(FhirTypesError::EmptyEnum {
                            type_name: decl.name.clone(),
                            property: name,
                        });
                    }
                    if self.decls[type_id.index()].kind != TypeKind::Primitive {
                        return Err(FhirTypesError::EnumOnStruct {
                            type_name: decl.name.clone(),
                            property: name,
                            target: type_name.to_string(),
                        });
                    }
                }

                if properties.contains_key(&name) {
                    return Err(FhirTypesError::duplicate_property(decl.name.clone(), name));
                }
                properties.insert(
                    name.clone(),
                    Property {
                        name,
                        type_id,
                        choice: choice.map(str::to_string),
                        array: prop.array,
                        enum_values: prop.enum_values.clone(),
                    },
                );
            }
        }

        Ok(properties)
    }
}
