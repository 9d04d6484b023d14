//! Loaded module representation

use crate::identity::ModuleIdentity;
use crate::manifest::ModuleManifest;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle to a loaded module
///
/// The host holds this handle for as long as it needs the module. Dropping
/// every handle (together with the owning domain releasing its hold) is what
/// makes an unload confirmable.
pub type ModuleHandle = Arc<LoadedModule>;

/// A fully loaded module: identity, origin, manifest and the dependency names
/// its domain resolved for it
///
/// Immutable after construction; a load either produces a complete
/// `LoadedModule` or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    identity: ModuleIdentity,
    path: PathBuf,
    manifest: ModuleManifest,
    resolved_dependencies: Vec<String>,
}

impl LoadedModule {
    /// Assemble a loaded module from its parts
    pub fn new(
        identity: ModuleIdentity,
        path: impl Into<PathBuf>,
        manifest: ModuleManifest,
        resolved_dependencies: Vec<String>,
    ) -> Self {
        Self {
            identity,
            path: path.into(),
            manifest,
            resolved_dependencies,
        }
    }

    /// Module identity
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Module name (identity shorthand)
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Path the module was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared manifest
    pub fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    /// Dependency names the domain resolved at load time
    pub fn resolved_dependencies(&self) -> &[String] {
        &self.resolved_dependencies
    }

    /// Exported symbol names
    pub fn exports(&self) -> &[String] {
        &self.manifest.exports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoadedModule {
        LoadedModule::new(
            ModuleIdentity::from_name("PluginA"),
            "/opt/plugins/PluginA.dll",
            ModuleManifest {
                name: Some("PluginA".to_string()),
                version: "1.0.0".to_string(),
                dependencies: vec!["core".to_string()],
                exports: vec!["run".to_string()],
            },
            vec!["core".to_string()],
        )
    }

    #[test]
    fn test_accessors() {
        let module = sample();
        assert_eq!(module.name(), "PluginA");
        assert_eq!(module.exports(), ["run".to_string()]);
        assert_eq!(module.resolved_dependencies(), ["core".to_string()]);
    }
}
