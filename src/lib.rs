//! # OctoFHIR FHIR Types
//!
//! A versioned, read-only registry of the FHIR type metamodel: primitive
//! types with their validation patterns, element and resource types with
//! their declared properties, and the single-rooted base hierarchy that
//! ties them together.
//!
//! ## Features
//!
//! - **Kind-checked access**: primitive and struct facets are only reachable
//!   on nodes of the matching kind
//! - **Property inheritance**: `prop_by_name` walks the base chain instead of
//!   copying ancestor properties
//! - **Choice fields**: `value[x]` is flattened into `valueString`,
//!   `valueQuantity`, ... sharing one choice tag
//! - **Embedded R4**: a process-wide registry built once on first use
//!
//! The embedded R4 set is a subset of FHIR 4.0.1: the `Base` root, all
//! primitives, the common data types and the Patient, Observation,
//! Practitioner, Organization and Bundle resources. Types outside it
//! (`Encounter`, `Money`, `Dosage`, ...) are not found. Load a full
//! definition set from disk with [`RegistryConfig::from_file`] when they are
//! needed.
//!
//! ## Quick Start
//!
//! ```rust
//! use octofhir_fhirtypes::{TypeKind, TypeRegistry};
//!
//! # fn example() -> octofhir_fhirtypes::Result<()> {
//! let registry = TypeRegistry::instance();
//! assert_eq!(registry.version_string(), "4.0.1");
//!
//! let patient = registry.type_by_name("Patient").expect("Patient is registered");
//! assert_eq!(patient.type_kind(), TypeKind::Resource);
//!
//! let gender = patient.as_struct()?.prop_by_name("gender").expect("declared");
//! assert!(gender.permits("female"));
//!
//! let boolean = registry.type_by_name("boolean").expect("registered");
//! assert!(boolean.as_primitive()?.matches("true"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use config::{DefinitionSource, RegistryConfig};
pub use error::{FhirTypesError, Result};
pub use registry::{
    Ancestors, DefinitionSet, PropertyDecl, PropertyRef, R4_DEFINITIONS, RegistryBuilder,
    StructRef, TypeDecl, TypeRef, TypeRegistry, r4_definitions,
};
pub use types::{PrimitiveFacet, Property, SimpleType, StructFacet, TypeId, TypeKind, TypeNode};
