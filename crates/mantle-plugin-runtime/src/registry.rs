//! Process-wide plugin registry

use crate::config::{RegistryConfig, UnloadPolicy};
use crate::domain::ModuleDomain;
use crate::error::{Result, RuntimeError};
use crate::oracle::{DeferredReclaimer, LivenessOracle};
use crate::record::ModuleRecord;
use crate::resolver::SharedModules;
use crate::unload::{await_reclamation, UnloadOutcome};
use mantle_plugin_api::{ModuleHandle, ModuleIdentity};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Registry of currently tracked modules
///
/// An explicit owner object rather than ambient global state, so it can be
/// instantiated per test and passed by reference to the host. Records keep
/// insertion order; lookup is a linear scan by identity name.
///
/// The registry does not synchronize internally. Concurrent `load`/`unload`
/// against the same identity is caller error and must be serialized
/// externally.
pub struct PluginRegistry {
    records: Vec<ModuleRecord>,
    shared: Arc<SharedModules>,
    oracle: Arc<dyn LivenessOracle>,
    policy: UnloadPolicy,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("records", &self.records)
            .field("shared", &self.shared)
            .field("policy", &self.policy)
            .finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry with default policy and oracle
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry from configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_oracle(config, DeferredReclaimer::shared())
    }

    /// Create an empty registry with a custom liveness oracle
    pub fn with_oracle(config: RegistryConfig, oracle: Arc<dyn LivenessOracle>) -> Self {
        Self {
            records: Vec::new(),
            shared: Arc::new(SharedModules::new(config.shared_modules)),
            oracle,
            policy: config.unload,
        }
    }

    /// Load a module from `path` into a fresh domain
    ///
    /// If a record with the same identity already holds a live module, that
    /// module is returned as-is and nothing new is created. Otherwise a new
    /// domain is constructed (collectible or permanent per `collectible`),
    /// the module is loaded into it, and a record is inserted. On any
    /// failure nothing is inserted and the error is reported.
    pub async fn load(&mut self, path: impl AsRef<Path>, collectible: bool) -> Result<ModuleHandle> {
        let path = path.as_ref();

        let identity = match ModuleIdentity::from_path(path) {
            Ok(identity) => identity,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load module");
                return Err(e.into());
            }
        };

        for record in &self.records {
            if record.identity() != &identity {
                continue;
            }
            if let Some(existing) = record.upgrade() {
                info!(module = %identity, "module already loaded");
                return Ok(existing);
            }
        }

        let result = ModuleDomain::new(path, collectible, Arc::clone(&self.shared), Arc::clone(&self.oracle))
            .and_then(|domain| domain.load().map(|handle| (domain, handle)));

        match result {
            Ok((domain, handle)) => {
                self.records
                    .push(ModuleRecord::new(identity.clone(), domain, &handle));
                info!(module = %identity, collectible, "module loaded");
                Ok(handle)
            }
            Err(e) => {
                error!(module = %identity, error = %e, "failed to load module");
                Err(e)
            }
        }
    }

    /// Unload the module registered under `name`
    ///
    /// Rejects permanent domains. Revokes the domain, then polls the oracle
    /// until both the module and its domain are confirmed dead. Confirmed
    /// removes the record; a timeout leaves it registered (the module is
    /// still considered loaded) and the whole call may be retried.
    pub async fn unload(&mut self, name: &str) -> Result<()> {
        let Some(index) = self.unload_target(name) else {
            error!(module = %name, "cannot unload: module not found");
            return Err(RuntimeError::not_found(name));
        };

        info!(module = %name, "unloading module");

        let record = &mut self.records[index];
        match record.domain_mut().revoke() {
            Ok(()) => {}
            Err(e @ RuntimeError::UnloadRejected(_)) => {
                error!(module = %name, error = %e, "unload rejected");
                return Err(e);
            }
            Err(e) => {
                error!(module = %name, error = %e, "revoke failed; module remains loaded");
                return Err(RuntimeError::unload_failed(name, e));
            }
        }

        let record = &self.records[index];
        let outcome = await_reclamation(
            name,
            record.module_weak(),
            record.domain_weak(),
            &*self.oracle,
            &self.policy,
        )
        .await;

        match outcome {
            UnloadOutcome::Confirmed => {
                // The confirmed record is fully reclaimed by now; sweep any
                // stale records left behind by earlier timed-out attempts on
                // the same identity along with it.
                self.records
                    .retain(|r| r.name() != name || !r.is_fully_reclaimed());
                info!(module = %name, "module unloaded");
                Ok(())
            }
            UnloadOutcome::TimedOut => {
                error!(module = %name, "unload timed out; module remains loaded");
                Err(RuntimeError::timeout(name))
            }
        }
    }

    /// Resolve which record an unload by name targets
    ///
    /// A timed-out unload leaves its record registered, and a later load of
    /// the same identity may insert a fresh one alongside it. Unload must act
    /// on the record whose module is actually alive; a record whose domain is
    /// still reclaimable comes next, and a fully dead record only when
    /// nothing else matches.
    fn unload_target(&self, name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.name() == name && r.is_module_alive())
            .or_else(|| {
                self.records
                    .iter()
                    .position(|r| r.name() == name && !r.is_fully_reclaimed())
            })
            .or_else(|| self.records.iter().position(|r| r.name() == name))
    }

    /// Find a registered record by identity name
    ///
    /// Linear scan over registered records; no liveness filtering.
    pub fn find_by_name(&self, name: &str) -> Option<&ModuleRecord> {
        self.records.iter().find(|r| r.name() == name)
    }

    /// Currently registered records, in insertion order
    pub fn records(&self) -> &[ModuleRecord] {
        &self.records
    }

    /// Number of registered records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The shared foundational module set
    pub fn shared_modules(&self) -> &SharedModules {
        &self.shared
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
