//! Validation metadata attached to primitive type nodes.
//!
//! Each primitive carries its own pattern; nothing is inherited from the
//! base primitive. `code` and `string` may share a classification while
//! holding different expressions.

use regex::Regex;

use super::SimpleType;
use crate::error::{FhirTypesError, Result};

#[derive(Debug, Clone)]
pub struct PrimitiveFacet {
    pattern: Option<Regex>,
    simple_type: SimpleType,
}

impl PrimitiveFacet {
    /// Compile the pattern text for `type_name`. The text is stored verbatim,
    /// so `pattern().as_str()` returns exactly what the definition declared.
    pub fn compile(type_name: &str, pattern: Option<&str>, simple_type: SimpleType) -> Result<Self> {
        let pattern = pattern
            .map(|text| {
                Regex::new(text).map_err(|source| FhirTypesError::InvalidPattern {
                    type_name: type_name.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            pattern,
            simple_type,
        })
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn simple_type(&self) -> SimpleType {
        self.simple_type
    }

    /// Check a literal against the pattern. Primitives without one accept anything.
    pub fn matches(&self, literal: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_text_is_verbatim() {
        let facet =
            PrimitiveFacet::compile("integer", Some(r"^-?([0]|([1-9][0-9]*))$"), SimpleType::Number)
                .unwrap();
        assert_eq!(facet.pattern().unwrap().as_str(), r"^-?([0]|([1-9][0-9]*))$");
        assert_eq!(facet.simple_type(), SimpleType::Number);
        assert!(facet.matches("-42"));
        assert!(facet.matches("0"));
        assert!(!facet.matches("007"));
        assert!(!facet.matches("4.2"));
    }

    #[test]
    fn test_no_pattern_accepts_anything() {
        let facet = PrimitiveFacet::compile("xhtml", None, SimpleType::String).unwrap();
        assert!(facet.pattern().is_none());
        assert!(facet.matches(""));
        assert!(facet.matches("<div>anything</div>"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = PrimitiveFacet::compile("broken", Some("(unclosed"), SimpleType::String)
            .unwrap_err();
        assert!(matches!(err, FhirTypesError::InvalidPattern { ref type_name, .. } if type_name == "broken"));
    }
}
