//! The completion gate: arbitrates the write to the response slot, enforces
//! first-writer-wins, and publishes to waiters and continuations.
//!
//! The first-writer-wins check is the same CAS-returns-whether-this-caller-
//! won idiom used for cancellation flags, generalized from a boolean flag to
//! an arbitrary terminal payload guarded by the waiter monitor.

use tracing::{error, trace, warn};

use super::monitor::WaiterMonitor;
use super::signal::Signal;
use super::{resolve_signal, Outcome};
use crate::ids::InvocationId;
use crate::invocation::Invocation;
use crate::registry::InvocationRegistry;

/// Attempts to write a terminal (or `WAIT_AGAIN`) value into the response
/// slot and returns whether this call's write took effect for the first
/// time.
#[allow(clippy::too_many_arguments)]
pub(crate) fn complete<T>(
    id: InvocationId,
    monitor: &WaiterMonitor<T>,
    registry: &dyn InvocationRegistry,
    invocation: &Invocation<T>,
    offered: Signal<T>,
) -> bool
where
    T: Send + Sync + 'static,
{
    let (drained, resolved) = {
        let mut guard = monitor.lock();

        // Already terminal (any sentinel/value other than WAIT_AGAIN, or
        // empty) means this call loses.
        if let Some(existing) = &guard.slot {
            if existing.is_terminal() {
                trace!(invocation = %id, "redundant completion observed, deregistering defensively");
                registry.deregister(id);
                return false;
            }
        }

        let is_wait_again = matches!(offered, Signal::WaitAgain);
        guard.slot = Some(offered);
        monitor.set_tag(&guard.slot);

        if is_wait_again {
            // WAIT_AGAIN never drains continuations, never deregisters, and
            // never notifies. Waiters drain it on their own next poll.
            return true;
        }

        // Detach continuations, notify, deregister — all still inside the
        // critical section.
        let drained = std::mem::take(&mut guard.continuations);
        monitor.notify_all();
        registry.deregister(id);
        let resolved = resolve_signal(guard.slot.clone().expect("slot written above"), invocation);
        (drained, resolved)
        // guard drops here, releasing the monitor.
    };

    // Submit each continuation outside the monitor, in LIFO order (attach
    // order reversed): `drained` is in attach order since it was pushed to
    // the back of the list, so the last-attached continuation is submitted
    // first. The slot was just written, so every continuation sees the same
    // resolved outcome.
    for node in drained.into_iter().rev() {
        submit_continuation(id, node, resolved.clone());
    }

    true
}

pub(crate) fn submit_continuation<T>(
    id: InvocationId,
    node: super::monitor::ContinuationNode<T>,
    outcome: Outcome<T>,
) where
    T: Send + Sync + 'static,
{
    let callback = node.callback;
    let submitted = node.executor.submit(Box::new(move || {
        let callback = std::panic::AssertUnwindSafe(callback);
        let outcome = std::panic::AssertUnwindSafe(outcome);
        let result = std::panic::catch_unwind(move || {
            let callback = callback;
            let outcome = outcome;
            (callback.0)(outcome.0)
        });
        if let Err(payload) = result {
            error!(
                invocation = %id,
                panic = %panic_message(&payload),
                "completion continuation panicked"
            );
        }
    }));
    if submitted.is_err() {
        warn!(invocation = %id, "executor rejected a completion continuation");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
