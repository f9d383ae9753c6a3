use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::registry::{DefinitionSet, TypeRegistry};

/// Environment variable naming a definition file to load instead of the
/// embedded R4 set.
pub const DEFINITIONS_ENV: &str = "FHIRTYPES_DEFINITIONS";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", tag = "source", content = "path")]
pub enum DefinitionSource {
    /// Definitions compiled into the crate, served by the process-wide registry.
    #[default]
    Embedded,
    /// A JSON definition set on disk.
    File(PathBuf),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub definitions: DefinitionSource,
}

impl RegistryConfig {
    pub fn embedded() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            definitions: DefinitionSource::File(path.into()),
        }
    }

    /// Read the definition source from `FHIRTYPES_DEFINITIONS`, falling back
    /// to the embedded set when unset or empty.
    pub fn from_env() -> Self {
        match std::env::var_os(DEFINITIONS_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path)),
            _ => Self::embedded(),
        }
    }

    /// Open the configured registry. The embedded source always yields the
    /// shared singleton; file sources build a fresh registry.
    pub fn open(&self) -> Result<Arc<TypeRegistry>> {
        match &self.definitions {
            DefinitionSource::Embedded => Ok(TypeRegistry::shared()),
            DefinitionSource::File(path) => load_definitions(path)
                .and_then(TypeRegistry::from_definitions)
                .map(Arc::new),
        }
    }
}

/// Read and parse a JSON definition set from disk.
pub fn load_definitions(path: &Path) -> Result<DefinitionSet> {
    debug!(path = %path.display(), "loading type definitions");
    let bytes = std::fs::read(path)?;
    DefinitionSet::from_json_slice(&bytes)
}
