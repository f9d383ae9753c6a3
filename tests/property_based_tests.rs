//! Property-based checks over the embedded R4 registry.
//!
//! Verifies for arbitrary inputs that:
//! - lookup is total and never invents types
//! - base chains are finite and end at the root
//! - primitive patterns accept well-formed literals and reject malformed ones

use octofhir_fhirtypes::TypeRegistry;
use proptest::prelude::*;

fn registered_names() -> Vec<&'static str> {
    TypeRegistry::instance()
        .types()
        .map(|t| t.internal_name())
        .collect()
}

fn registered_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(registered_names())
}

fn primitive_facet(name: &str) -> &'static octofhir_fhirtypes::PrimitiveFacet {
    TypeRegistry::instance()
        .type_by_name(name)
        .expect("registered")
        .as_primitive()
        .expect("primitive")
}

proptest! {
    #[test]
    fn lookup_never_invents_types(name in "[A-Za-z_]{0,24}") {
        let registry = TypeRegistry::instance();
        match registry.type_by_name(&name) {
            Some(ty) => prop_assert_eq!(ty.internal_name(), name.as_str()),
            None => prop_assert!(!registered_names().contains(&name.as_str())),
        }
    }

    #[test]
    fn lookup_is_stable(name in registered_name()) {
        let registry = TypeRegistry::instance();
        let first = registry.type_by_name(name).unwrap();
        let second = registry.type_by_name(name).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(registry.get(first.id()), Some(first));
    }

    #[test]
    fn base_chain_ends_at_root(name in registered_name()) {
        let registry = TypeRegistry::instance();
        let ty = registry.type_by_name(name).unwrap();
        let chain: Vec<_> = ty.ancestors().collect();

        prop_assert!(chain.len() < registry.len());
        prop_assert!(ty.is_subtype_of(&registry.root()));
        if let Some(last) = chain.last() {
            prop_assert!(last.is_root());
        } else {
            prop_assert!(ty.is_root());
        }
    }

    #[test]
    fn facets_follow_kind(name in registered_name()) {
        let ty = TypeRegistry::instance().type_by_name(name).unwrap();
        prop_assert_eq!(ty.as_primitive().is_ok(), ty.is_primitive());
        prop_assert_eq!(ty.as_struct().is_ok(), ty.is_struct());
        if let Err(e) = ty.as_struct() {
            prop_assert!(e.is_kind_mismatch());
        }
    }

    #[test]
    fn inherited_properties_resolve(name in registered_name()) {
        let ty = TypeRegistry::instance().type_by_name(name).unwrap();
        if let Ok(facet) = ty.as_struct() {
            for prop in facet.properties() {
                let found = facet.prop_by_name(prop.name()).unwrap();
                prop_assert_eq!(found.declared_by(), prop.declared_by());
                prop_assert!(ty.is_subtype_of(&prop.declared_by()));
            }
        }
    }

    #[test]
    fn integers_match(n in any::<i32>()) {
        prop_assert!(primitive_facet("integer").matches(&n.to_string()));
    }

    #[test]
    fn leading_zeros_rejected(n in 1u32..1_000_000) {
        let padded = format!("0{n}");
        prop_assert!(!primitive_facet("integer").matches(&padded));
    }

    #[test]
    fn positive_ints_match(n in 1u32..=u32::MAX) {
        prop_assert!(primitive_facet("positiveInt").matches(&n.to_string()));
    }

    #[test]
    fn dates_match(year in 1000u32..=9999, month in 1u32..=12, day in 1u32..=28) {
        let date = primitive_facet("date");
        let year_only = year.to_string();
        let year_month = format!("{year}-{month:02}");
        let full = format!("{year}-{month:02}-{day:02}");
        prop_assert!(date.matches(&year_only));
        prop_assert!(date.matches(&year_month));
        prop_assert!(date.matches(&full));
    }

    #[test]
    fn out_of_range_months_rejected(year in 1000u32..=9999, month in 13u32..=99) {
        let literal = format!("{year}-{month}");
        prop_assert!(!primitive_facet("date").matches(&literal));
    }

    #[test]
    fn date_times_match(
        year in 1000u32..=9999,
        hour in 0u32..24,
        minute in 0u32..60,
        second in 0u32..60,
    ) {
        let literal = format!("{year}-06-15T{hour:02}:{minute:02}:{second:02}Z");
        prop_assert!(primitive_facet("dateTime").matches(&literal));
        prop_assert!(primitive_facet("instant").matches(&literal));
    }
}
