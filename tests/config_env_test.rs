//! `RegistryConfig::from_env`. Kept in its own test binary with a single test
//! so no other thread reads the environment while it is modified.

use octofhir_fhirtypes::config::DEFINITIONS_ENV;
use octofhir_fhirtypes::{DefinitionSource, RegistryConfig, TypeRegistry};
use std::ffi::OsString;
use std::io::Write;
use std::sync::Arc;

/// Restores the previous value of an environment variable on drop.
struct EnvGuard {
    key: &'static str,
    previous: Option<OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var_os(key);
        // SAFETY: this binary runs a single test, so nothing else touches the environment.
        unsafe { std::env::set_var(key, value) };
        Self { key, previous }
    }

    fn unset(key: &'static str) -> Self {
        let previous = std::env::var_os(key);
        // SAFETY: see `set`.
        unsafe { std::env::remove_var(key) };
        Self { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see `set`.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }
}

#[test]
fn test_from_env() {
    {
        let _guard = EnvGuard::unset(DEFINITIONS_ENV);
        let config = RegistryConfig::from_env();
        assert_eq!(config, RegistryConfig::embedded());
        let registry = config.open().unwrap();
        assert!(std::ptr::eq(Arc::as_ptr(&registry), TypeRegistry::instance()));
    }

    {
        let _guard = EnvGuard::set(DEFINITIONS_ENV, "");
        assert_eq!(RegistryConfig::from_env(), RegistryConfig::embedded());
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"symbolicVersion": "X", "version": "9.9.9", "types": [{{"name": "Base", "kind": "element"}}]}}"#
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let _guard = EnvGuard::set(DEFINITIONS_ENV, &path);
    let config = RegistryConfig::from_env();
    assert_eq!(config.definitions, DefinitionSource::File(path.into()));
    let registry = config.open().unwrap();
    assert_eq!(registry.symbolic_version(), "X");
    assert_eq!(registry.version_string(), "9.9.9");
}
