//! The public `InvocationFuture` surface exposed to callers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{field, Span};

use super::engine::EngineContext;
use super::gate;
use super::monitor::{ContinuationNode, WaiterMonitor};
use super::signal::Signal;
use super::Outcome;
use crate::error::InvocationError;
use crate::ids::InvocationId;
use crate::interrupt::InterruptFlag;
use crate::invocation::Invocation;
use crate::liveness::LivenessOracle;
use crate::registry::InvocationRegistry;
use crate::runtime::Executor;
use crate::time::{Clock, SystemClock};

struct Inner<T> {
    id: InvocationId,
    monitor: WaiterMonitor<T>,
    invocation: Invocation<T>,
    registry: Arc<dyn InvocationRegistry>,
    liveness: Arc<dyn LivenessOracle>,
    clock: Arc<dyn Clock>,
    interrupt_flag: InterruptFlag,
    default_executor: Arc<dyn Executor>,
    span: Span,
}

/// The synchronization primitive rendezvousing a blocking/timed waiter, the
/// thread that delivers a reply, and any number of completion continuations.
///
/// Cheaply cloneable: every clone shares the same underlying state, matching
/// the future's ownership model (shared by the awaiter, the delivery
/// thread, and the invocation registry).
pub struct InvocationFuture<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for InvocationFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> InvocationFuture<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        invocation: Invocation<T>,
        default_executor: Arc<dyn Executor>,
        registry: Arc<dyn InvocationRegistry>,
        liveness: Arc<dyn LivenessOracle>,
    ) -> Self {
        Self::with_clock(
            invocation,
            default_executor,
            registry,
            liveness,
            Arc::new(SystemClock::new()),
        )
    }

    pub fn with_clock(
        invocation: Invocation<T>,
        default_executor: Arc<dyn Executor>,
        registry: Arc<dyn InvocationRegistry>,
        liveness: Arc<dyn LivenessOracle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let id = InvocationId::next();
        let span = tracing::info_span!("invocation", id = field::display(id));
        Self {
            inner: Arc::new(Inner {
                id,
                monitor: WaiterMonitor::new(),
                invocation,
                registry,
                liveness,
                clock,
                interrupt_flag: InterruptFlag::new(),
                default_executor,
                span,
            }),
        }
    }

    pub fn id(&self) -> InvocationId {
        self.inner.id
    }

    /// True iff the slot holds a terminal value.
    pub fn is_done(&self) -> bool {
        self.inner.monitor.is_terminal_fast()
    }

    /// The future cannot be cancelled.
    pub fn cancel(&self, _may_interrupt_if_running: bool) -> bool {
        false
    }

    pub fn is_cancelled(&self) -> bool {
        false
    }

    pub fn waiter_count(&self) -> usize {
        self.inner.monitor.waiter_count()
    }

    /// Requests that any thread currently (or next) parked on this future
    /// reconsider its wait (see `crate::interrupt` for why this is
    /// cooperative rather than a true OS-level interrupt).
    pub fn request_interrupt(&self) {
        self.inner.interrupt_flag.request();
    }

    /// Completes with a value. `None` is normalized to the `NULL_REPLY`
    /// sentinel.
    pub fn complete(&self, value: Option<T>) -> bool {
        let offered = match value {
            Some(v) => Signal::Value(Arc::new(v)),
            None => Signal::NullReply,
        };
        self.complete_signal(offered)
    }

    /// *complete(WAIT_AGAIN)*: the non-terminal escalation used to implement
    /// server-side blocking operations.
    pub fn complete_wait_again(&self) -> bool {
        self.complete_signal(Signal::WaitAgain)
    }

    /// Completes with a failure carrier.
    pub fn complete_exceptionally(&self, error: InvocationError) -> bool {
        self.complete_signal(Signal::Failed(Arc::new(error)))
    }

    /// Completes with a still-serialized payload; only meaningful when the
    /// future's invocation was constructed in deserialize mode.
    pub fn complete_serialized(&self, bytes: Vec<u8>) -> bool {
        self.complete_signal(Signal::Serialized(Arc::new(bytes)))
    }

    fn complete_signal(&self, offered: Signal<T>) -> bool {
        let _entered = self.inner.span.enter();
        gate::complete(
            self.inner.id,
            &self.inner.monitor,
            self.inner.registry.as_ref(),
            &self.inner.invocation,
            offered,
        )
    }

    /// Attaches a completion continuation, delivered on `executor`.
    pub fn attach_with_executor<F>(&self, callback: F, executor: Arc<dyn Executor>)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let mut callback = Some(callback);
        let resolved = {
            let mut guard = self.inner.monitor.lock();
            match &guard.slot {
                Some(slot) if slot.is_terminal() => {
                    Some(super::resolve_signal(slot.clone(), &self.inner.invocation))
                }
                _ => {
                    let callback = callback.take().expect("callback present");
                    guard.continuations.push(ContinuationNode {
                        callback: Box::new(callback),
                        executor: Arc::clone(&executor),
                    });
                    None
                }
            }
        };

        if let Some(outcome) = resolved {
            let callback = callback.take().expect("callback present when not queued");
            gate::submit_continuation(
                self.inner.id,
                ContinuationNode {
                    callback: Box::new(callback),
                    executor,
                },
                outcome,
            );
        }
    }

    /// *attach(callback)* — uses the default executor supplied at
    /// construction time.
    pub fn attach<F>(&self, callback: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let executor = Arc::clone(&self.inner.default_executor);
        self.attach_with_executor(callback, executor);
    }

    /// Waits for a terminal value, or times out after `timeout`.
    pub fn await_timeout(&self, timeout: Duration) -> Outcome<T> {
        let _entered = self.inner.span.enter();
        self.engine_context().await_bounded(timeout)
    }

    /// Waits for a terminal value with no timeout.
    pub fn await_untimed(&self) -> Outcome<T> {
        self.await_timeout(Duration::MAX)
    }

    /// Convenience wrapper that unwraps a checked-style failure into an
    /// unchecked panic.
    pub fn join(&self) -> Option<Arc<T>> {
        match self.await_untimed() {
            Ok(value) => value,
            Err(error) => panic!("invocation {} failed: {error}", self.inner.id),
        }
    }

    fn engine_context(&self) -> EngineContext<'_, T> {
        EngineContext {
            id: self.inner.id,
            monitor: &self.inner.monitor,
            invocation: &self.inner.invocation,
            registry: self.inner.registry.as_ref(),
            liveness: self.inner.liveness.as_ref(),
            clock: self.inner.clock.as_ref(),
            interrupt_flag: &self.inner.interrupt_flag,
        }
    }
}
