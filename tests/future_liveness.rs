//! Long-poll escalation and the executor-rejection collaborator seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use relay_core::invocation::{Invocation, InvocationMeta};
use relay_core::liveness::AlwaysIdle;
use relay_core::registry::{InvocationRegistry, RecordingInvocationRegistry};
use relay_core::runtime::{Executor, ExecutorRejected, RejectingExecutor, ThreadExecutor};
use relay_core::InvocationFuture;

fn short_timeout_meta() -> InvocationMeta {
    InvocationMeta {
        call_timeout: Duration::from_millis(100),
        target_address: "peer-1".into(),
        is_remote: true,
        local_address: "self-1".into(),
    }
}

/// With call_timeout = 100ms, user timeout = infinite, and a dead liveness
/// oracle, await returns a timeout failure within the derived escalation
/// bound.
#[test]
fn long_poll_synthesizes_timeout_when_remote_is_dead() {
    let registry = Arc::new(RecordingInvocationRegistry::new());
    let registry_handle: Arc<dyn InvocationRegistry> = registry.clone();
    let future: InvocationFuture<String> = InvocationFuture::new(
        Invocation::new(short_timeout_meta()),
        Arc::new(ThreadExecutor),
        registry_handle,
        Arc::new(AlwaysIdle),
    );

    let start = Instant::now();
    let outcome = future.await_untimed();
    let elapsed = start.elapsed();

    assert!(outcome.is_err(), "dead remote should synthesize a failure");
    // M = C + min(C, 60_000ms) = 200ms for a 100ms call timeout; escalation
    // fires on the first park that exhausts that bound.
    assert!(
        elapsed <= Duration::from_millis(200 * 3),
        "escalation should fire close to the derived max-single-poll bound (200ms for a \
         100ms call timeout), took {elapsed:?}"
    );
    // Unlike the local-only budget-exhaustion timeout, escalation writes the
    // shared slot, so the future is observably done afterward.
    assert!(future.is_done());
    assert_eq!(registry.calls().len(), 1);
}

/// An executor that rejects every submission must not affect the future's
/// own outcome: rejection is logged only, never propagated.
#[test]
fn executor_rejection_does_not_fail_the_future() {
    let rejecting = Arc::new(RejectingExecutor);
    assert_eq!(
        rejecting.submit(Box::new(|| {})),
        Err(ExecutorRejected),
        "sanity: the double actually rejects"
    );

    let future: InvocationFuture<String> = InvocationFuture::new(
        Invocation::new(InvocationMeta {
            call_timeout: Duration::from_millis(1000),
            target_address: "peer-1".into(),
            is_remote: true,
            local_address: "self-1".into(),
        }),
        rejecting,
        Arc::new(relay_core::registry::NoopInvocationRegistry),
        Arc::new(relay_core::liveness::AlwaysExecuting),
    );

    assert!(future.complete(Some("x".to_string())));

    let delivered = Arc::new(AtomicUsize::new(0));
    let delivered_clone = Arc::clone(&delivered);
    future.attach(move |_outcome| {
        delivered_clone.fetch_add(1, Ordering::SeqCst);
    });

    // The rejected continuation never runs, but the future itself is still
    // resolved for direct awaiters.
    let outcome = future
        .await_timeout(Duration::from_millis(100))
        .expect("no failure");
    assert_eq!(outcome.as_deref().map(String::as_str), Some("x"));
    assert_eq!(delivered.load(Ordering::SeqCst), 0);
}
