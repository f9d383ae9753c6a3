pub mod kind;
pub mod node;
pub mod primitive;
pub mod property;

pub use kind::{SimpleType, TypeKind};
pub use node::{StructFacet, TypeId, TypeNode};
pub use primitive::PrimitiveFacet;
pub use property::{Property, choice_property_name};
