//! Liveness oracle: deferred finalization and reclamation passes
//!
//! Liveness itself is observed through `std::sync::Weak`, which reports
//! reachability without extending lifetime. The oracle's job is the other
//! half of the protocol: holding allocations a revoked domain gave up, and
//! dropping them when a reclamation pass is requested. Revocation is thereby
//! asynchronous: nothing is freed at revoke time, only at the next pass, and
//! only if no external strong reference remains.

use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Host memory-manager seam used by the unload confirmation protocol
pub trait LivenessOracle: Send + Sync {
    /// Schedule an allocation for reclamation at the next pass
    fn defer(&self, hold: Box<dyn Any + Send>);

    /// Run a reclamation pass: drop everything deferred so far
    fn request_reclamation_pass(&self);

    /// Number of allocations still waiting for a pass
    fn pending(&self) -> usize;
}

impl fmt::Debug for dyn LivenessOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivenessOracle")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Default oracle: a queue of deferred drops, drained on demand
#[derive(Default)]
pub struct DeferredReclaimer {
    queue: Mutex<Vec<Box<dyn Any + Send>>>,
}

impl fmt::Debug for DeferredReclaimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredReclaimer")
            .field("pending", &self.pending())
            .finish()
    }
}

impl DeferredReclaimer {
    /// Create an empty reclaimer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reclaimer behind a shared oracle handle
    pub fn shared() -> Arc<dyn LivenessOracle> {
        Arc::new(Self::new())
    }
}

impl LivenessOracle for DeferredReclaimer {
    fn defer(&self, hold: Box<dyn Any + Send>) {
        self.queue.lock().push(hold);
    }

    fn request_reclamation_pass(&self) {
        let drained: Vec<_> = std::mem::take(&mut *self.queue.lock());
        if !drained.is_empty() {
            debug!(reclaimed = drained.len(), "reclamation pass");
        }
        drop(drained);
    }

    fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}
