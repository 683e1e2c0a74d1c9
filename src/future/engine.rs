//! The await engine: a timed, interruptible wait loop with long-poll
//! escalation and remote-liveness-driven timeout synthesis.
//!
//! `Duration::MAX` stands in for an unbounded, "wait forever" budget:
//! `Duration::MAX` minus any realistic elapsed time is still astronomically
//! large, which gives the same saturating behavior an infinite timeout needs
//! without a separate `Option<Duration>` representation.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::gate;
use super::monitor::WaiterMonitor;
use super::signal::Signal;
use super::{resolve_signal, Outcome};
use crate::error::InvocationError;
use crate::ids::InvocationId;
use crate::interrupt::{self, InterruptFlag};
use crate::invocation::Invocation;
use crate::liveness::LivenessOracle;
use crate::registry::InvocationRegistry;
use crate::time::Clock;

/// The long-poll escalation ceiling.
pub(crate) const MAX_SINGLE_POLL_CEILING: Duration = Duration::from_millis(60_000);

/// `M = min(C + min(C, 60_000ms), ∞)`; `C ≤ 0` (here, `C.is_zero()`) means
/// `M = ∞`.
pub(crate) fn derive_max_single_poll(call_timeout: Duration) -> Duration {
    if call_timeout.is_zero() {
        Duration::MAX
    } else {
        call_timeout.saturating_add(call_timeout.min(MAX_SINGLE_POLL_CEILING))
    }
}

/// Everything the wait loop needs that is not already reachable from the
/// future's own state: the other external collaborators.
pub(crate) struct EngineContext<'a, T> {
    pub id: InvocationId,
    pub monitor: &'a WaiterMonitor<T>,
    pub invocation: &'a Invocation<T>,
    pub registry: &'a dyn InvocationRegistry,
    pub liveness: &'a dyn LivenessOracle,
    pub clock: &'a dyn Clock,
    pub interrupt_flag: &'a InterruptFlag,
}

impl<'a, T> EngineContext<'a, T>
where
    T: Send + Sync + 'static,
{
    /// Runs the main wait loop. `user_timeout == Duration::MAX` models
    /// waiting with no timeout at all.
    pub fn await_bounded(&self, user_timeout: Duration) -> Outcome<T> {
        self.monitor.enter_wait();
        let result = self.run(user_timeout);
        self.monitor.exit_wait();
        result
    }

    fn run(&self, user_timeout: Duration) -> Outcome<T> {
        let m = derive_max_single_poll(self.invocation.meta.call_timeout);
        let long_polling = user_timeout > m;
        let mut remaining = user_timeout;
        let mut poll_count: u32 = 0;
        let mut interrupted = false;
        let total_start = self.clock.now_ms();

        loop {
            let p = remaining.min(m);
            let start = self.clock.now_ms();
            poll_count += 1;
            self.park_for(p, &mut interrupted);
            let elapsed = Duration::from_millis(self.clock.now_ms().saturating_sub(start));
            remaining = remaining.saturating_sub(elapsed);

            let snapshot = { self.monitor.lock().slot.clone() };

            if matches!(snapshot, Some(Signal::WaitAgain)) {
                let mut guard = self.monitor.lock();
                if matches!(guard.slot, Some(Signal::WaitAgain)) {
                    guard.slot = None;
                    self.monitor.set_tag(&guard.slot);
                }
                continue;
            }

            if let Some(s) = snapshot {
                if interrupted && !matches!(s, Signal::Interrupted) {
                    interrupt::latch_current_thread_interrupted();
                }
                return resolve_signal(s, self.invocation);
            }

            if !interrupted && long_polling {
                if self.invocation.meta.is_migrating_locally() {
                    if remaining.is_zero() {
                        return self.local_timeout(total_start);
                    }
                    continue;
                }
                if !self.liveness.is_executing(&self.invocation.meta) {
                    let still_empty = self.monitor.lock().slot.is_none();
                    if still_empty {
                        let synthesized_elapsed = p.saturating_mul(poll_count);
                        let synthesized = self.invocation.meta.new_timeout(synthesized_elapsed);
                        warn!(
                            invocation = %self.id,
                            elapsed_ms = synthesized_elapsed.as_millis() as u64,
                            "long-poll escalation synthesized a timeout for an unresponsive remote"
                        );
                        gate::complete(
                            self.id,
                            self.monitor,
                            self.registry,
                            self.invocation,
                            Signal::Failed(Arc::new(synthesized)),
                        );
                    }
                    // Either this call just wrote a terminal value, or a
                    // concurrent completion raced in first and `still_empty`
                    // was already false. Either way a terminal value may now
                    // be sitting in the slot; re-check it on the next
                    // iteration instead of falling through to the
                    // budget-exhaustion return below, which would discard it.
                    continue;
                }
            }

            if remaining.is_zero() {
                return self.local_timeout(total_start);
            }
        }
    }

    fn park_for(&self, budget: Duration, interrupted: &mut bool) {
        if self.interrupt_flag.take() {
            *interrupted = true;
        }
        let mut guard = self.monitor.lock();
        self.monitor.wait_for(&mut guard, budget);
        drop(guard);
        if self.interrupt_flag.take() {
            *interrupted = true;
        }
    }

    /// The loop's final local-budget-exhaustion return: a resolution for
    /// *this* call only. Unlike escalation-synthesized timeouts, this never
    /// touches the shared slot — `is_done()` stays `false` afterward.
    fn local_timeout(&self, total_start: u64) -> Outcome<T> {
        let elapsed = Duration::from_millis(self.clock.now_ms().saturating_sub(total_start));
        Err(Arc::new(InvocationError::deadline_exceeded(elapsed)))
    }
}
