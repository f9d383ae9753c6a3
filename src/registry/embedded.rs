use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{error, info};

use super::{DefinitionSet, TypeRegistry};
use crate::error::Result;

// Embedded definitions for a subset of FHIR R4 (4.0.1)
pub static R4_DEFINITIONS: &str = include_str!("../../definitions/r4_types.json");

// Built on first access. A broken embedded definition set leaves no usable
// registry, so construction failure aborts instead of publishing a partial one.
static R4_REGISTRY: Lazy<Arc<TypeRegistry>> = Lazy::new(|| {
    let registry = r4_definitions()
        .and_then(TypeRegistry::from_definitions)
        .unwrap_or_else(|e| {
            error!(error = %e, "embedded R4 definitions failed to build");
            panic!("embedded R4 type definitions are invalid: {e}");
        });
    info!(
        version = %registry.version_string(),
        types = registry.len(),
        "initialized embedded type registry"
    );
    Arc::new(registry)
});

/// Parse the embedded R4 definition set.
pub fn r4_definitions() -> Result<DefinitionSet> {
    DefinitionSet::from_json_str(R4_DEFINITIONS)
}

impl TypeRegistry {
    /// The process-wide R4 registry. Every call returns the same instance.
    pub fn instance() -> &'static TypeRegistry {
        &R4_REGISTRY
    }

    /// The process-wide R4 registry as a shared handle.
    pub fn shared() -> Arc<TypeRegistry> {
        Arc::clone(&R4_REGISTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_definitions_parse() {
        let definitions = r4_definitions().unwrap();
        assert_eq!(definitions.symbolic_version, "R4");
        assert_eq!(definitions.version, "4.0.1");
        assert!(!definitions.types.is_empty());
    }

    #[test]
    fn test_instance_and_shared_agree() {
        let shared = TypeRegistry::shared();
        assert!(std::ptr::eq(TypeRegistry::instance(), Arc::as_ptr(&shared)));
    }
}
