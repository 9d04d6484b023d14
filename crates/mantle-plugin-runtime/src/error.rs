//! Runtime error types

use mantle_plugin_api::PluginError;
use std::fmt;

/// Runtime error type
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Load-side failure (missing or malformed module, unresolved dependency)
    #[error(transparent)]
    Load(#[from] PluginError),

    /// No registered module with the given name
    #[error("Module not found: {0}")]
    NotFound(String),

    /// Unload requested against a permanent (non-collectible) domain
    #[error("Cannot unload module '{0}': its domain is permanent")]
    UnloadRejected(String),

    /// The revoke call itself failed; the module remains loaded
    #[error("Failed to unload module '{name}': {message}")]
    UnloadFailed {
        /// Module name
        name: String,
        /// Failure description
        message: String,
    },

    /// The confirmation loop exhausted its deadline; the module remains
    /// loaded and the caller may retry
    #[error("Timed out waiting for module '{0}' to be reclaimed")]
    UnloadTimeout(String),

    /// Load attempted against a domain that was already revoked
    #[error("Domain for module '{0}' has been revoked")]
    DomainRevoked(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    /// Create a module-not-found error
    pub fn not_found(name: impl fmt::Display) -> Self {
        Self::NotFound(name.to_string())
    }

    /// Create an unload-rejected error
    pub fn rejected(name: impl fmt::Display) -> Self {
        Self::UnloadRejected(name.to_string())
    }

    /// Create an unload-failed error
    pub fn unload_failed(name: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::UnloadFailed {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an unload-timeout error
    pub fn timeout(name: impl fmt::Display) -> Self {
        Self::UnloadTimeout(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RuntimeError::not_found("PluginA");
        assert!(matches!(err, RuntimeError::NotFound(_)));

        let err = RuntimeError::rejected("PluginA");
        assert!(matches!(err, RuntimeError::UnloadRejected(_)));
    }

    #[test]
    fn test_error_display() {
        let err = RuntimeError::timeout("PluginA");
        assert_eq!(
            err.to_string(),
            "Timed out waiting for module 'PluginA' to be reclaimed"
        );
    }
}
