use super::TypeId;

/// One concrete property declared on a struct type.
///
/// Choice fields are stored flattened: `value[x]` with types `string` and
/// `integer` becomes `valueString` and `valueInteger`, both tagged with
/// choice `"value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub(crate) name: String,
    pub(crate) type_id: TypeId,
    pub(crate) choice: Option<String>,
    pub(crate) array: bool,
    pub(crate) enum_values: Option<Vec<String>>,
}

impl Property {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the value type in the owning registry.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Logical choice field this property is an alternative of.
    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    pub fn is_choice(&self) -> bool {
        self.choice.is_some()
    }

    /// `true` for zero-or-more, `false` for zero-or-one.
    pub fn array(&self) -> bool {
        self.array
    }

    /// Permitted literals in declaration order; `None` when unconstrained.
    pub fn enum_values(&self) -> Option<&[String]> {
        self.enum_values.as_deref()
    }

    pub fn permits(&self, literal: &str) -> bool {
        self.enum_values
            .as_ref()
            .is_none_or(|values| values.iter().any(|v| v == literal))
    }
}

/// Concrete property name for one alternative of a choice field.
pub fn choice_property_name(choice: &str, type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => {
            let mut name = String::with_capacity(choice.len() + type_name.len());
            name.push_str(choice);
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
            name
        }
        None => choice.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender() -> Property {
        Property {
            name: "gender".to_string(),
            type_id: TypeId::new(0),
            choice: None,
            array: false,
            enum_values: Some(vec!["male".into(), "female".into()]),
        }
    }

    #[test]
    fn test_choice_property_name() {
        assert_eq!(choice_property_name("value", "string"), "valueString");
        assert_eq!(choice_property_name("value", "dateTime"), "valueDateTime");
        assert_eq!(choice_property_name("deceased", "boolean"), "deceasedBoolean");
        assert_eq!(choice_property_name("value", "CodeableConcept"), "valueCodeableConcept");
    }

    #[test]
    fn test_permits() {
        let prop = gender();
        assert!(prop.permits("male"));
        assert!(!prop.permits("Male"));

        let unconstrained = Property {
            enum_values: None,
            ..gender()
        };
        assert!(unconstrained.permits("anything"));
        assert!(unconstrained.enum_values().is_none());
    }
}
