//! Isolated module domains

use crate::error::{Result, RuntimeError};
use crate::oracle::LivenessOracle;
use crate::resolver::{DependencyResolver, SharedModules};
use mantle_plugin_api::{LoadedModule, ModuleHandle, ModuleIdentity, ModuleManifest};
use parking_lot::RwLock;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Strongly-held interior of a domain: the module slot and the private
/// resolver. A revoke hands this to the oracle instead of dropping it, so
/// reclamation stays asynchronous.
pub(crate) struct DomainCore {
    identity: ModuleIdentity,
    path: PathBuf,
    resolver: DependencyResolver,
    module: RwLock<Option<ModuleHandle>>,
}

impl fmt::Debug for DomainCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainCore")
            .field("identity", &self.identity)
            .field("path", &self.path)
            .field("loaded", &self.module.read().is_some())
            .finish()
    }
}

/// Isolated loading context owning exactly one module's code
///
/// A domain is either *permanent* (never revocable, lives for the process
/// lifetime) or *collectible* (revocable; after `revoke` everything it owned
/// becomes reclaimable once externally unreachable). Dependency resolution is
/// private to the domain apart from the shared foundational set.
pub struct ModuleDomain {
    identity: ModuleIdentity,
    core: Option<Arc<DomainCore>>,
    core_weak: Weak<DomainCore>,
    collectible: bool,
    oracle: Arc<dyn LivenessOracle>,
}

impl fmt::Debug for ModuleDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDomain")
            .field("collectible", &self.collectible)
            .field("revoked", &self.is_revoked())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl ModuleDomain {
    /// Create a domain bound to a module path
    pub fn new(
        path: impl AsRef<Path>,
        collectible: bool,
        shared: Arc<SharedModules>,
        oracle: Arc<dyn LivenessOracle>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let identity = ModuleIdentity::from_path(path)?;
        let resolver = DependencyResolver::for_module_path(path, shared)?;

        let core = Arc::new(DomainCore {
            identity: identity.clone(),
            path: path.to_path_buf(),
            resolver,
            module: RwLock::new(None),
        });
        let core_weak = Arc::downgrade(&core);

        Ok(Self {
            identity,
            core: Some(core),
            core_weak,
            collectible,
            oracle,
        })
    }

    /// Load the domain's module
    ///
    /// Resolves the declared dependencies within this domain, then parses the
    /// module image. A second call returns the already-loaded module; a
    /// revoked domain refuses to load anything.
    pub fn load(&self) -> Result<ModuleHandle> {
        let core = self
            .core
            .as_ref()
            .ok_or_else(|| RuntimeError::DomainRevoked(self.identity().name().to_string()))?;

        if let Some(existing) = core.module.read().clone() {
            return Ok(existing);
        }

        let manifest = ModuleManifest::from_path(&core.path)?;
        manifest.verify_identity(&core.path, &core.identity)?;
        let resolved = core.resolver.resolve(&manifest)?;

        let module: ModuleHandle = Arc::new(LoadedModule::new(
            core.identity.clone(),
            core.path.clone(),
            manifest,
            resolved,
        ));
        *core.module.write() = Some(Arc::clone(&module));

        debug!(module = %core.identity, path = %core.path.display(), "module loaded into domain");
        Ok(module)
    }

    /// Revoke a collectible domain
    ///
    /// Removes the domain's strong holds (the module slot and the domain core
    /// itself) by handing them to the oracle for deferred reclamation.
    /// Nothing is freed synchronously. Revoking an already-revoked domain is
    /// a no-op, which makes unload retries straightforward.
    pub fn revoke(&mut self) -> Result<()> {
        if !self.collectible {
            return Err(RuntimeError::rejected(self.identity().name()));
        }

        let Some(core) = self.core.take() else {
            return Ok(());
        };

        if let Some(module) = core.module.write().take() {
            self.oracle.defer(Box::new(module));
        }
        debug!(module = %core.identity, "domain revoked");
        self.oracle.defer(Box::new(core));

        Ok(())
    }

    /// Domain identity (same as the module's)
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Whether this domain can be revoked
    pub fn is_collectible(&self) -> bool {
        self.collectible
    }

    /// Whether `revoke` has been called
    pub fn is_revoked(&self) -> bool {
        self.core.is_none()
    }

    /// Whether the domain core has not yet been fully reclaimed
    ///
    /// Observed through the domain's own weak reference, independent of the
    /// module object's liveness.
    pub fn is_alive(&self) -> bool {
        self.core_weak.strong_count() > 0
    }

    /// Weak observation of the loaded module, never extending its lifetime
    pub fn module_weak(&self) -> Weak<LoadedModule> {
        match self.core_weak.upgrade() {
            Some(core) => core
                .module
                .read()
                .as_ref()
                .map(Arc::downgrade)
                .unwrap_or_default(),
            None => Weak::new(),
        }
    }

    /// Weak observation of the domain core itself
    pub(crate) fn domain_weak(&self) -> Weak<DomainCore> {
        self.core_weak.clone()
    }
}
