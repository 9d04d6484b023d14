//! Per-domain dependency resolution

use mantle_plugin_api::{ModuleManifest, PluginError, Result};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Foundational modules visible to every domain
///
/// Supplied once at registry construction and read-only afterwards, so it is
/// safe to share across domains without synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedModules {
    names: BTreeSet<String>,
}

impl SharedModules {
    /// Build the shared set from module names
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a name is part of the shared set
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterate shared module names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of shared modules
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the shared set is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Dependency resolver scoped to one module's location
///
/// A dependency resolves if it is in the shared foundational set, or if a
/// sibling module image with the same file extension exists next to the
/// module being loaded. Private dependencies of one domain never become
/// visible to another.
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    module_name: String,
    base_dir: PathBuf,
    probe_extension: Option<OsString>,
    shared: Arc<SharedModules>,
}

impl DependencyResolver {
    /// Create a resolver scoped to a module path
    pub fn for_module_path(path: &Path, shared: Arc<SharedModules>) -> Result<Self> {
        let module_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PluginError::InvalidPath(path.to_path_buf()))?
            .to_string();

        Ok(Self {
            module_name,
            base_dir: path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
            probe_extension: path.extension().map(OsString::from),
            shared,
        })
    }

    /// Resolve every dependency a manifest declares
    ///
    /// Returns the resolved names in declaration order, or the first
    /// dependency that cannot be satisfied.
    pub fn resolve(&self, manifest: &ModuleManifest) -> Result<Vec<String>> {
        let mut resolved = Vec::with_capacity(manifest.dependencies.len());

        for dependency in &manifest.dependencies {
            if self.shared.contains(dependency) {
                debug!(module = %self.module_name, dependency = %dependency, "resolved shared dependency");
            } else if self.sibling_path(dependency).is_file() {
                debug!(module = %self.module_name, dependency = %dependency, "resolved private dependency");
            } else {
                return Err(PluginError::unresolved(&self.module_name, dependency));
            }
            resolved.push(dependency.clone());
        }

        Ok(resolved)
    }

    fn sibling_path(&self, dependency: &str) -> PathBuf {
        let mut path = self.base_dir.join(dependency);
        if let Some(ext) = &self.probe_extension {
            path.set_extension(ext);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(deps: &[&str]) -> ModuleManifest {
        ModuleManifest {
            name: None,
            version: "1.0.0".to_string(),
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            exports: vec![],
        }
    }

    #[test]
    fn test_shared_dependency_resolves() {
        let shared = Arc::new(SharedModules::new(["core"]));
        let resolver =
            DependencyResolver::for_module_path(Path::new("/plugins/A.dll"), shared).unwrap();

        let resolved = resolver.resolve(&manifest(&["core"])).unwrap();
        assert_eq!(resolved, vec!["core"]);
    }

    #[test]
    fn test_private_sibling_resolves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("helper.dll"), b"{}").unwrap();
        let module_path = dir.path().join("A.dll");

        let resolver =
            DependencyResolver::for_module_path(&module_path, Arc::new(SharedModules::default()))
                .unwrap();

        let resolved = resolver.resolve(&manifest(&["helper"])).unwrap();
        assert_eq!(resolved, vec!["helper"]);
    }

    #[test]
    fn test_unresolved_dependency_fails() {
        let dir = tempfile::tempdir().unwrap();
        let module_path = dir.path().join("A.dll");

        let resolver =
            DependencyResolver::for_module_path(&module_path, Arc::new(SharedModules::default()))
                .unwrap();

        let err = resolver.resolve(&manifest(&["ghost"])).unwrap_err();
        assert!(matches!(err, PluginError::DependencyUnresolved { .. }));
    }

    #[test]
    fn test_shared_set_is_by_name() {
        let shared = SharedModules::new(["core", "codec"]);
        assert!(shared.contains("core"));
        assert!(!shared.contains("Core"));
        assert_eq!(shared.len(), 2);
    }
}
