//! Unload confirmation protocol
//!
//! Revoking a domain only removes its strong holds; actually reclaiming the
//! module is asynchronous. This loop actively drives the oracle through
//! reclamation passes and re-checks both weak references after each one,
//! instead of trusting a single pass. Per attempt the state machine is
//! `Requested -> Polling -> {Confirmed | TimedOut}` with two escalating
//! deadlines: a one-time warning and a hard timeout.

use crate::config::UnloadPolicy;
use crate::oracle::LivenessOracle;
use std::sync::Weak;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Pause between reclamation passes
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Terminal state of one unload confirmation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadOutcome {
    /// Both the module and its domain are confirmed dead
    Confirmed,

    /// The bounded wait window elapsed; the module may still unload later
    /// and the whole attempt can be retried
    TimedOut,
}

/// Poll until both weak references die or the policy deadline expires
///
/// Checks once before the first reclamation pass to short-circuit trivial
/// cases, then alternates pass and re-check. Emits the slow-unload warning
/// exactly once per attempt.
pub async fn await_reclamation<M, D>(
    name: &str,
    module: &Weak<M>,
    domain: &Weak<D>,
    oracle: &dyn LivenessOracle,
    policy: &UnloadPolicy,
) -> UnloadOutcome {
    let started = Instant::now();
    let mut warned = false;

    loop {
        if module.strong_count() == 0 && domain.strong_count() == 0 {
            return UnloadOutcome::Confirmed;
        }

        oracle.request_reclamation_pass();

        if module.strong_count() == 0 && domain.strong_count() == 0 {
            return UnloadOutcome::Confirmed;
        }

        let elapsed = started.elapsed();
        if !warned && elapsed >= policy.warn_after {
            warned = true;
            warn!(module = %name, elapsed = ?elapsed, "unload taking longer than expected");
        }
        if elapsed >= policy.fail_after {
            return UnloadOutcome::TimedOut;
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::DeferredReclaimer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    /// Counts WARN events emitted while a test subscriber is installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn fast_policy() -> UnloadPolicy {
        UnloadPolicy {
            warn_after: Duration::from_millis(40),
            fail_after: Duration::from_millis(120),
        }
    }

    /// Oracle that refuses to drain, simulating reclamation that never
    /// completes within the window.
    #[derive(Default)]
    struct StuckOracle {
        queue: parking_lot::Mutex<Vec<Box<dyn std::any::Any + Send>>>,
    }

    impl LivenessOracle for StuckOracle {
        fn defer(&self, hold: Box<dyn std::any::Any + Send>) {
            self.queue.lock().push(hold);
        }

        fn request_reclamation_pass(&self) {}

        fn pending(&self) -> usize {
            self.queue.lock().len()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_dead_confirms_without_a_pass() {
        let oracle = DeferredReclaimer::new();
        let module: Weak<u32> = Weak::new();
        let domain: Weak<u32> = Weak::new();

        let outcome = await_reclamation("m", &module, &domain, &oracle, &fast_policy()).await;
        assert_eq!(outcome, UnloadOutcome::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_holds_confirm_after_first_pass() {
        let oracle = DeferredReclaimer::new();
        let module = Arc::new(1u32);
        let domain = Arc::new(2u32);
        let module_weak = Arc::downgrade(&module);
        let domain_weak = Arc::downgrade(&domain);
        oracle.defer(Box::new(module));
        oracle.defer(Box::new(domain));

        let outcome =
            await_reclamation("m", &module_weak, &domain_weak, &oracle, &fast_policy()).await;
        assert_eq!(outcome, UnloadOutcome::Confirmed);
        assert_eq!(oracle.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retained_reference_times_out() {
        let oracle = DeferredReclaimer::new();
        let module = Arc::new(1u32);
        let module_weak = Arc::downgrade(&module);
        let domain_weak: Weak<u32> = Weak::new();

        let outcome =
            await_reclamation("m", &module_weak, &domain_weak, &oracle, &fast_policy()).await;
        assert_eq!(outcome, UnloadOutcome::TimedOut);
        assert!(module_weak.upgrade().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_unload_warns_once_per_attempt() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
        let _guard = tracing::subscriber::set_default(subscriber);

        let oracle = DeferredReclaimer::new();
        let module = Arc::new(1u32);
        let module_weak = Arc::downgrade(&module);
        let domain_weak: Weak<u32> = Weak::new();

        // Many poll iterations elapse between the warn and fail deadlines;
        // the warning must still fire exactly once.
        let policy = UnloadPolicy {
            warn_after: Duration::from_millis(40),
            fail_after: Duration::from_millis(400),
        };

        let outcome =
            await_reclamation("m", &module_weak, &domain_weak, &oracle, &policy).await;
        assert_eq!(outcome, UnloadOutcome::TimedOut);
        assert_eq!(warnings.load(Ordering::Relaxed), 1);

        // A fresh attempt gets its own warning edge.
        let outcome =
            await_reclamation("m", &module_weak, &domain_weak, &oracle, &policy).await;
        assert_eq!(outcome, UnloadOutcome::TimedOut);
        assert_eq!(warnings.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_references_must_die() {
        // Module dead, domain stuck in an oracle that never drains.
        let oracle = StuckOracle::default();
        let domain = Arc::new(2u32);
        let domain_weak = Arc::downgrade(&domain);
        oracle.defer(Box::new(domain));
        let module_weak: Weak<u32> = Weak::new();

        let outcome =
            await_reclamation("m", &module_weak, &domain_weak, &oracle, &fast_policy()).await;
        assert_eq!(outcome, UnloadOutcome::TimedOut);
    }
}
