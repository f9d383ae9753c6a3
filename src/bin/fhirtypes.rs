use clap::{Parser, Subcommand, ValueEnum};
use octofhir_fhirtypes::{PropertyRef, RegistryConfig, TypeKind, TypeRef, TypeRegistry};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fhirtypes")]
#[command(about = "Inspect the FHIR type metamodel registry")]
#[command(version)]
struct Cli {
    /// Load definitions from a JSON file instead of the embedded R4 set
    /// (defaults to $FHIRTYPES_DEFINITIONS when set)
    #[arg(long, global = true)]
    definitions: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show registry version and type counts
    Info,
    /// List registered types
    List {
        /// Only list types of this kind
        #[arg(short, long)]
        kind: Option<KindArg>,
    },
    /// Show a single type
    Show {
        /// Internal type name (e.g. Patient, dateTime, Patient_Contact)
        name: String,
        /// Include inherited properties
        #[arg(long)]
        all: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check a literal against a primitive type's pattern
    Check {
        /// Primitive type name (e.g. date, integer)
        primitive: String,
        /// Literal value to test
        literal: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Primitive,
    Element,
    Resource,
}

impl From<KindArg> for TypeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Primitive => TypeKind::Primitive,
            KindArg::Element => TypeKind::Element,
            KindArg::Resource => TypeKind::Resource,
        }
    }
}

type CliResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = match cli.definitions {
        Some(path) => RegistryConfig::from_file(path),
        None => RegistryConfig::from_env(),
    };
    debug!(?config, "opening registry");
    let registry = config.open()?;

    match cli.command {
        Commands::Info => show_info(&registry),
        Commands::List { kind } => list_types(&registry, kind.map(TypeKind::from)),
        Commands::Show { name, all, json } => {
            let ty = find_type(&registry, &name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&type_json(ty, all)?)?);
            } else {
                print_type(ty, all)?;
            }
        }
        Commands::Check { primitive, literal } => {
            let ty = find_type(&registry, &primitive)?;
            let facet = ty.as_primitive()?;
            let matched = facet.matches(&literal);
            println!(
                "{} {} {}",
                literal,
                if matched { "matches" } else { "does not match" },
                ty.internal_name()
            );
            if !matched {
                return Ok(ExitCode::from(1));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn find_type<'a>(registry: &'a TypeRegistry, name: &str) -> CliResult<TypeRef<'a>> {
    registry
        .type_by_name(name)
        .ok_or_else(|| format!("unknown type: {name}").into())
}

fn show_info(registry: &TypeRegistry) {
    let count = |kind: TypeKind| registry.types().filter(|t| t.type_kind() == kind).count();
    let anonymous = registry
        .types()
        .filter_map(|t| t.as_struct().ok())
        .filter(|s| s.anonymous())
        .count();

    println!(
        "FHIR {} ({})",
        registry.symbolic_version(),
        registry.version_string()
    );
    println!("  Total types:     {}", registry.len());
    println!("  Primitive types: {}", count(TypeKind::Primitive));
    println!("  Element types:   {}", count(TypeKind::Element));
    println!("  Resource types:  {}", count(TypeKind::Resource));
    println!("  Anonymous types: {anonymous}");
    println!("  Root type:       {}", registry.root());
}

fn list_types(registry: &TypeRegistry, kind: Option<TypeKind>) {
    for ty in registry.types() {
        if kind.is_none_or(|k| ty.type_kind() == k) {
            println!("{:<10} {}", ty.type_kind(), ty.internal_name());
        }
    }
}

fn print_type(ty: TypeRef<'_>, all: bool) -> CliResult<()> {
    println!("{} ({})", ty.internal_name(), ty.type_kind());

    let chain: Vec<&str> = ty.ancestors().map(|a| a.internal_name()).collect();
    if !chain.is_empty() {
        println!("  base chain: {}", chain.join(" -> "));
    }

    if ty.is_primitive() {
        let facet = ty.as_primitive()?;
        println!("  simple type: {}", facet.simple_type());
        match facet.pattern() {
            Some(pattern) => println!("  pattern: {}", pattern.as_str()),
            None => println!("  pattern: (none)"),
        }
        return Ok(());
    }

    let facet = ty.as_struct()?;
    if facet.anonymous() {
        println!("  anonymous: true");
    }
    let properties = if all {
        facet.properties()
    } else {
        facet.declared_properties().collect()
    };
    for prop in properties {
        print_property(ty, prop);
    }
    Ok(())
}

fn print_property(owner: TypeRef<'_>, prop: PropertyRef<'_>) {
    let mut line = format!(
        "  {}: {}{}",
        prop.name(),
        prop.property_type().internal_name(),
        if prop.array() { "[]" } else { "" }
    );
    if let Some(choice) = prop.choice() {
        line.push_str(&format!(" (choice {choice}[x])"));
    }
    if let Some(values) = prop.enum_values() {
        line.push_str(&format!(" = {}", values.join(" | ")));
    }
    if prop.declared_by() != owner {
        line.push_str(&format!(" <- {}", prop.declared_by()));
    }
    println!("{line}");
}

fn type_json(ty: TypeRef<'_>, all: bool) -> CliResult<Value> {
    let mut out = json!({
        "name": ty.internal_name(),
        "kind": ty.type_kind(),
        "base": ty.base().map(|b| b.internal_name()),
    });

    if ty.is_primitive() {
        let facet = ty.as_primitive()?;
        out["simpleType"] = json!(facet.simple_type());
        out["pattern"] = json!(facet.pattern().map(|p| p.as_str()));
        return Ok(out);
    }

    let facet = ty.as_struct()?;
    let properties = if all {
        facet.properties()
    } else {
        facet.declared_properties().collect()
    };
    out["anonymous"] = json!(facet.anonymous());
    out["properties"] = properties
        .iter()
        .map(|prop| {
            json!({
                "name": prop.name(),
                "type": prop.property_type().internal_name(),
                "choice": prop.choice(),
                "array": prop.array(),
                "enum": prop.enum_values(),
                "declaredBy": prop.declared_by().internal_name(),
            })
        })
        .collect();
    Ok(out)
}
