//! Load-side error types

use std::fmt;
use std::path::{Path, PathBuf};

/// Errors produced while turning an on-disk module into a loaded module
///
/// Every variant is recoverable: a failed load leaves nothing registered and
/// the caller may retry with a corrected path or a rebuilt module image.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Module path has no usable file name to derive an identity from
    #[error("Module path has no file name: {0}")]
    InvalidPath(PathBuf),

    /// Module image could not be read from disk
    #[error("Failed to read module {path}: {source}")]
    Io {
        /// Path of the module image
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Module image is not a well-formed manifest
    #[error("Malformed module manifest {path}: {message}")]
    Manifest {
        /// Path of the module image
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Manifest declares a name that contradicts the path-derived identity
    #[error("Module {path} declares name '{declared}' but identity is '{expected}'")]
    IdentityMismatch {
        /// Path of the module image
        path: PathBuf,
        /// Name declared inside the manifest
        declared: String,
        /// Identity derived from the file name
        expected: String,
    },

    /// A declared dependency is neither shared nor present beside the module
    #[error("Module '{module}' depends on '{dependency}' which cannot be resolved")]
    DependencyUnresolved {
        /// Name of the module being loaded
        module: String,
        /// Name of the dependency that failed to resolve
        dependency: String,
    },
}

/// Result type for load operations
pub type Result<T> = std::result::Result<T, PluginError>;

impl PluginError {
    /// Create an I/O error for a module path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-manifest error
    pub fn manifest(path: impl AsRef<Path>, message: impl fmt::Display) -> Self {
        Self::Manifest {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create an unresolved-dependency error
    pub fn unresolved(module: impl fmt::Display, dependency: impl fmt::Display) -> Self {
        Self::DependencyUnresolved {
            module: module.to_string(),
            dependency: dependency.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::unresolved("plugin-a", "libfoo");
        assert_eq!(
            err.to_string(),
            "Module 'plugin-a' depends on 'libfoo' which cannot be resolved"
        );
    }

    #[test]
    fn test_error_creation() {
        let err = PluginError::manifest("/tmp/x.mod", "unexpected end of input");
        assert!(matches!(err, PluginError::Manifest { .. }));
    }
}
