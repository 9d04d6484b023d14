//! Module manifest declared by the build toolchain

use crate::error::{PluginError, Result};
use crate::identity::ModuleIdentity;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dependency manifest a module declares for itself
///
/// The build/weaving toolchain writes this document into the module image.
/// The runtime treats an image that fails to parse as a malformed module and
/// rejects the load; it does not attempt partial recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    /// Name declared by the module; when present it must match the
    /// path-derived identity
    #[serde(default)]
    pub name: Option<String>,

    /// Module version string
    #[serde(default = "default_version")]
    pub version: String,

    /// Names of modules this module depends on
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Exported symbol names
    #[serde(default)]
    pub exports: Vec<String>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl ModuleManifest {
    /// Parse a manifest from raw module image bytes
    pub fn from_slice(path: impl AsRef<Path>, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| PluginError::manifest(path, e))
    }

    /// Read and parse a manifest from a module image on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| PluginError::io(path, e))?;
        Self::from_slice(path, &bytes)
    }

    /// Check the declared name against the path-derived identity
    pub fn verify_identity(&self, path: impl AsRef<Path>, identity: &ModuleIdentity) -> Result<()> {
        match &self.name {
            Some(declared) if declared != identity.name() => Err(PluginError::IdentityMismatch {
                path: path.as_ref().to_path_buf(),
                declared: declared.clone(),
                expected: identity.name().to_string(),
            }),
            _ => Ok(()),
        }
    }
}
