use thiserror::Error;

use crate::types::TypeKind;

#[derive(Error, Debug)]
pub enum FhirTypesError {
    #[error("Duplicate type name: {name}")]
    DuplicateType { name: String },

    #[error("Type {type_name} declares unknown base type {base}")]
    UnresolvedBase { type_name: String, base: String },

    #[error("Cyclic base chain: {}", chain.join(" -> "))]
    CyclicBase { chain: Vec<String> },

    #[error("Too many type declarations: {count} exceeds the type index range")]
    TooManyTypes { count: usize },

    #[error("No root type declared (every type names a base)")]
    MissingRoot,

    #[error("Multiple root types declared: {}", roots.join(", "))]
    MultipleRoots { roots: Vec<String> },

    #[error("Invalid declaration of {type_name}: {message}")]
    InvalidDeclaration { type_name: String, message: String },

    #[error("Invalid base for {type_name}: {message}")]
    InvalidBase { type_name: String, message: String },

    #[error("Property {type_name}.{property} refers to unknown type {target}")]
    UnresolvedPropertyType {
        type_name: String,
        property: String,
        target: String,
    },

    #[error("Duplicate property {type_name}.{property}")]
    DuplicateProperty { type_name: String, property: String },

    #[error("Invalid property {type_name}.{property}: {message}")]
    InvalidProperty {
        type_name: String,
        property: String,
        message: String,
    },

    #[error("Resource {type_name} may not declare reserved property {property}")]
    ReservedProperty { type_name: String, property: String },

    #[error("Property {type_name}.{property} has an enum constraint but its type {target} is not primitive")]
    EnumOnStruct {
        type_name: String,
        property: String,
        target: String,
    },

    #[error("Property {type_name}.{property} has an empty enum constraint")]
    EmptyEnum { type_name: String, property: String },

    #[error("Invalid pattern for primitive {type_name}: {source}")]
    InvalidPattern {
        type_name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Type {type_name} is {actual}, expected {expected}")]
    KindMismatch {
        type_name: String,
        expected: &'static str,
        actual: TypeKind,
    },

    #[error("Definitions error: {0}")]
    Definitions(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FhirTypesError>;

impl FhirTypesError {
    pub fn duplicate_type<S: Into<String>>(name: S) -> Self {
        Self::DuplicateType { name: name.into() }
    }

    pub fn unresolved_base<S: Into<String>>(type_name: S, base: S) -> Self {
        Self::UnresolvedBase {
            type_name: type_name.into(),
            base: base.into(),
        }
    }

    pub fn invalid_declaration<S: Into<String>>(type_name: S, message: S) -> Self {
        Self::InvalidDeclaration {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_base<S: Into<String>>(type_name: S, message: S) -> Self {
        Self::InvalidBase {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn unresolved_property_type<S: Into<String>>(type_name: S, property: S, target: S) -> Self {
        Self::UnresolvedPropertyType {
            type_name: type_name.into(),
            property: property.into(),
            target: target.into(),
        }
    }

    pub fn duplicate_property<S: Into<String>>(type_name: S, property: S) -> Self {
        Self::DuplicateProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    pub fn invalid_property<S: Into<String>>(type_name: S, property: S, message: S) -> Self {
        Self::InvalidProperty {
            type_name: type_name.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn kind_mismatch<S: Into<String>>(type_name: S, expected: &'static str, actual: TypeKind) -> Self {
        Self::KindMismatch {
            type_name: type_name.into(),
            expected,
            actual,
        }
    }

    /// Capability mismatches signal caller bugs rather than data problems.
    pub fn is_kind_mismatch(&self) -> bool {
        matches!(self, Self::KindMismatch { .. })
    }

    /// True for every error raised while validating definitions in `build()`.
    pub fn is_integrity_failure(&self) -> bool {
        !matches!(
            self,
            Self::KindMismatch { .. } | Self::Definitions(_) | Self::Io(_)
        )
    }
}
