//! # Mantle Plugin API
//!
//! Shared boundary types between a host application and the Mantle plugin
//! runtime:
//!
//! - **Module identity**: name-based identity derived from a module's file
//!   path, used for duplicate-load detection and lookup
//! - **Module manifest**: the dependency manifest a module declares for
//!   itself, written by the build toolchain into the module image
//! - **Loaded module**: the immutable in-memory representation of a module
//!   after a successful load, handed to the host as a shared handle
//!
//! The runtime crate (`mantle-plugin-runtime`) owns domains, records and the
//! registry; this crate carries only the types that cross the host boundary.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod identity;
pub mod manifest;
pub mod module;

pub use error::{PluginError, Result};
pub use identity::ModuleIdentity;
pub use manifest::ModuleManifest;
pub use module::{LoadedModule, ModuleHandle};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PluginError, Result};
    pub use crate::identity::ModuleIdentity;
    pub use crate::manifest::ModuleManifest;
    pub use crate::module::{LoadedModule, ModuleHandle};
}
