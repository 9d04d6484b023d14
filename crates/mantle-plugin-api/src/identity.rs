//! Name-based module identity

use crate::error::{PluginError, Result};
use std::fmt;
use std::path::Path;

/// Identity of a module, derived from its file path
///
/// Identity is the file name without its extension. Two modules loaded from
/// different directories but with the same file name share one identity; the
/// registry uses this for duplicate-load detection and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleIdentity {
    name: String,
}

impl ModuleIdentity {
    /// Derive an identity from a module path
    ///
    /// Fails when the path carries no file name (e.g. `/` or an empty path).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PluginError::InvalidPath(path.to_path_buf()))?;

        Ok(Self {
            name: stem.to_string(),
        })
    }

    /// Construct an identity directly from a name
    pub fn from_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The identity name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for ModuleIdentity {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
