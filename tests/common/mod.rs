use octofhir_fhirtypes::*;

/// Base, Element and a handful of primitives: enough for a valid registry.
#[allow(dead_code)]
pub fn core_builder() -> RegistryBuilder {
    TypeRegistry::builder("TEST", "0.0.1")
        .with_type(TypeDecl::root("Base"))
        .with_type(
            TypeDecl::element("Element", "Base")
                .with_property(PropertyDecl::new("id", "string"))
                .with_property(PropertyDecl::new("extension", "Extension").array()),
        )
        .with_type(
            TypeDecl::element("Extension", "Element")
                .with_property(PropertyDecl::new("url", "string"))
                .with_property(PropertyDecl::choice("value", ["string", "integer"])),
        )
        .with_type(TypeDecl::primitive(
            "string",
            "Element",
            Some(r"^[ \r\n\t\S]+$"),
            SimpleType::String,
        ))
        .with_type(TypeDecl::primitive(
            "integer",
            "Element",
            Some(r"^-?([0]|([1-9][0-9]*))$"),
            SimpleType::Number,
        ))
        .with_type(TypeDecl::primitive(
            "code",
            "string",
            Some(r"^[^\s]+(\s[^\s]+)*$"),
            SimpleType::String,
        ))
}

/// `core_builder` plus a resource hierarchy.
#[allow(dead_code)]
pub fn resource_builder() -> RegistryBuilder {
    core_builder()
        .with_type(
            TypeDecl::resource("Resource", "Base").with_property(PropertyDecl::new("id", "string")),
        )
        .with_type(
            TypeDecl::resource("DomainResource", "Resource")
                .with_property(PropertyDecl::new("extension", "Extension").array()),
        )
}

/// Walk a type's base chain and collect the names, nearest first.
#[allow(dead_code)]
pub fn chain_names(ty: TypeRef<'_>) -> Vec<String> {
    ty.ancestors().map(|a| a.internal_name().to_string()).collect()
}
