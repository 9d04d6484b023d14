//! Per-module registry records

use crate::domain::{DomainCore, ModuleDomain};
use mantle_plugin_api::{LoadedModule, ModuleHandle, ModuleIdentity};
use std::fmt;
use std::sync::Weak;
use std::time::Instant;

/// The registry's handle on one loaded module
///
/// Owns the module's domain exclusively and observes the module object and
/// the domain core through two independent weak references. Both must report
/// dead before a record may leave the registry: a domain can outlive its
/// module object, so checking the module alone under-reports what is still
/// held.
pub struct ModuleRecord {
    identity: ModuleIdentity,
    domain: ModuleDomain,
    module: Weak<LoadedModule>,
    domain_core: Weak<DomainCore>,
    loaded_at: Instant,
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("identity", &self.identity)
            .field("module_alive", &self.is_module_alive())
            .field("domain_alive", &self.is_domain_alive())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl ModuleRecord {
    /// Create a record for a freshly loaded module
    pub(crate) fn new(identity: ModuleIdentity, domain: ModuleDomain, module: &ModuleHandle) -> Self {
        let module_weak = std::sync::Arc::downgrade(module);
        let domain_core = domain.domain_weak();

        Self {
            identity,
            domain,
            module: module_weak,
            domain_core,
            loaded_at: Instant::now(),
        }
    }

    /// Module identity
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Module name
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// The record's domain
    pub fn domain(&self) -> &ModuleDomain {
        &self.domain
    }

    /// Mutable access to the record's domain
    pub(crate) fn domain_mut(&mut self) -> &mut ModuleDomain {
        &mut self.domain
    }

    /// Whether the module object is still reachable
    pub fn is_module_alive(&self) -> bool {
        self.module.strong_count() > 0
    }

    /// Whether the domain core is still reachable, independent of the module
    pub fn is_domain_alive(&self) -> bool {
        self.domain_core.strong_count() > 0
    }

    /// Whether both liveness references report dead
    pub fn is_fully_reclaimed(&self) -> bool {
        !self.is_module_alive() && !self.is_domain_alive()
    }

    /// Obtain a strong handle to the module, if it is still alive
    pub fn upgrade(&self) -> Option<ModuleHandle> {
        self.module.upgrade()
    }

    /// When the record was created
    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }

    /// Weak module reference for the confirmation loop
    pub(crate) fn module_weak(&self) -> &Weak<LoadedModule> {
        &self.module
    }

    /// Weak domain reference for the confirmation loop
    pub(crate) fn domain_weak(&self) -> &Weak<DomainCore> {
        &self.domain_core
    }
}
