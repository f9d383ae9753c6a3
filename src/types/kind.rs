use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag carried by every type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Primitive,
    /// Non-resource structured type, including the root.
    Element,
    /// Top-level document type.
    Resource,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Primitive => "primitive",
            TypeKind::Element => "element",
            TypeKind::Resource => "resource",
        }
    }

    /// Element and Resource kinds share the struct facet.
    pub fn is_struct(&self) -> bool {
        matches!(self, TypeKind::Element | TypeKind::Resource)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse scalar classification of a primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    #[default]
    String,
    Number,
    Boolean,
}

impl SimpleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleType::String => "string",
            SimpleType::Number => "number",
            SimpleType::Boolean => "boolean",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(SimpleType::String),
            "number" => Some(SimpleType::Number),
            "boolean" => Some(SimpleType::Boolean),
            _ => None,
        }
    }
}

impl std::str::FromStr for SimpleType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or("Invalid simple type")
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(serde_json::to_string(&TypeKind::Resource).unwrap(), "\"resource\"");
        let kind: TypeKind = serde_json::from_str("\"primitive\"").unwrap();
        assert_eq!(kind, TypeKind::Primitive);
        assert!(serde_json::from_str::<TypeKind>("\"complex-type\"").is_err());
    }

    #[test]
    fn test_struct_kinds() {
        assert!(TypeKind::Element.is_struct());
        assert!(TypeKind::Resource.is_struct());
        assert!(!TypeKind::Primitive.is_struct());
    }

    #[test]
    fn test_simple_type_from_str() {
        assert_eq!("number".parse::<SimpleType>(), Ok(SimpleType::Number));
        assert_eq!(SimpleType::parse("boolean"), Some(SimpleType::Boolean));
        assert!("integer".parse::<SimpleType>().is_err());
        assert_eq!(SimpleType::default(), SimpleType::String);
    }
}
