//! # Mantle Plugin Runtime
//!
//! Runtime lifecycle management for dynamically loadable modules:
//!
//! - **Module domains**: isolated loading contexts, one module per domain,
//!   collectible (revocable) or permanent
//! - **Plugin registry**: duplicate-load detection by identity, lookup by
//!   name, explicit ownership instead of ambient global state
//! - **Verified unload**: revoking a domain only removes its strong holds;
//!   the registry then drives the liveness oracle through reclamation passes
//!   until both the module and its domain are confirmed dead, or a bounded
//!   deadline expires
//!
//! ## Example
//!
//! ```rust,no_run
//! use mantle_plugin_runtime::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let mut registry = PluginRegistry::new();
//!
//! let handle = registry.load("/opt/plugins/PluginA.dll", true).await?;
//! println!("loaded {}", handle.name());
//!
//! drop(handle);
//! registry.unload("PluginA").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Caller discipline
//!
//! The registry performs no internal locking. Concurrent `load`/`unload`
//! calls against the same identity must be serialized by the caller; the
//! `&mut self` receivers make this explicit at the type level for a single
//! registry value, but clones of handles shared across tasks remain the
//! caller's responsibility.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod config;
pub mod domain;
pub mod error;
pub mod oracle;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod unload;

pub use config::{RegistryConfig, UnloadPolicy};
pub use domain::ModuleDomain;
pub use error::{Result, RuntimeError};
pub use oracle::{DeferredReclaimer, LivenessOracle};
pub use record::ModuleRecord;
pub use registry::PluginRegistry;
pub use resolver::{DependencyResolver, SharedModules};
pub use unload::UnloadOutcome;

// Re-export boundary types for convenience
pub use mantle_plugin_api::{LoadedModule, ModuleHandle, ModuleIdentity, ModuleManifest, PluginError};

/// Prelude module with commonly used types
pub mod prelude {
    pub use crate::config::{RegistryConfig, UnloadPolicy};
    pub use crate::error::{Result, RuntimeError};
    pub use crate::oracle::{DeferredReclaimer, LivenessOracle};
    pub use crate::registry::PluginRegistry;
    pub use mantle_plugin_api::prelude::*;
}
