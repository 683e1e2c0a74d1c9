//! The per-continuation executor seam: a single `submit` operation a caller
//! can back with a thread pool, an inline-spawning thread-per-task executor,
//! or a test double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A continuation executor. `submit` may reject; rejection is logged by the
/// Completion Gate, never propagated to the caller or the future's outcome.
pub trait Executor: Send + Sync {
    fn submit(&self, runnable: Box<dyn FnOnce() + Send>) -> Result<(), ExecutorRejected>;
}

/// Returned by [`Executor::submit`] when the executor refuses the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("executor rejected the continuation")]
pub struct ExecutorRejected;

/// Spawns one OS thread per submission. Never rejects.
#[derive(Debug, Default)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn submit(&self, runnable: Box<dyn FnOnce() + Send>) -> Result<(), ExecutorRejected> {
        std::thread::Builder::new()
            .name("relay-core-continuation".into())
            .spawn(runnable)
            .map(|_handle| ())
            .map_err(|_| ExecutorRejected)
    }
}

/// Wraps another executor and counts submissions, asserting in tests that
/// continuations are dispatched rather than run inline on the completer.
pub struct RecordingExecutor<E> {
    inner: E,
    submitted: Arc<AtomicUsize>,
}

impl<E: Executor> RecordingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            submitted: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

impl<E: Executor> Executor for RecordingExecutor<E> {
    fn submit(&self, runnable: Box<dyn FnOnce() + Send>) -> Result<(), ExecutorRejected> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.inner.submit(runnable)
    }
}

/// An executor that always rejects, for exercising the executor-rejection
/// logging path.
#[derive(Debug, Default)]
pub struct RejectingExecutor;

impl Executor for RejectingExecutor {
    fn submit(&self, _runnable: Box<dyn FnOnce() + Send>) -> Result<(), ExecutorRejected> {
        Err(ExecutorRejected)
    }
}
