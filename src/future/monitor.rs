//! The waiter monitor: a mutex plus a single condition variable shared by
//! the response slot and the continuation list, with a lock-free atomic tag
//! kept alongside it for fields that don't need the lock.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::signal::Signal;
use super::Outcome;
use crate::runtime::Executor;

const EMPTY: u8 = 0;
const WAIT_AGAIN: u8 = 1;
const TERMINAL: u8 = 2;

pub(crate) struct ContinuationNode<T> {
    pub callback: Box<dyn FnOnce(Outcome<T>) + Send>,
    pub executor: Arc<dyn Executor>,
}

pub(crate) struct MonitorState<T> {
    pub slot: Option<Signal<T>>,
    pub continuations: Vec<ContinuationNode<T>>,
}

/// The mutex/condvar pair, plus the lock-free fast-path tag and waiter
/// count, for one invocation future.
pub(crate) struct WaiterMonitor<T> {
    state: Mutex<MonitorState<T>>,
    condvar: Condvar,
    fast_tag: AtomicU8,
    waiter_count: AtomicUsize,
}

impl<T> WaiterMonitor<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MonitorState {
                slot: None,
                continuations: Vec::new(),
            }),
            condvar: Condvar::new(),
            fast_tag: AtomicU8::new(EMPTY),
            waiter_count: AtomicUsize::new(0),
        }
    }

    /// Lock-free fast path used by `is_done()` and the await engine's
    /// pre-park check.
    pub fn is_terminal_fast(&self) -> bool {
        self.fast_tag.load(Ordering::Acquire) == TERMINAL
    }

    pub fn waiter_count(&self) -> usize {
        self.waiter_count.load(Ordering::Relaxed)
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, MonitorState<T>> {
        self.state.lock()
    }

    /// Updates the lock-free tag; callers must hold the monitor while
    /// calling this so the tag change is paired with the slot write it
    /// describes.
    pub fn set_tag(&self, slot: &Option<Signal<T>>) {
        let tag = match slot {
            None => EMPTY,
            Some(Signal::WaitAgain) => WAIT_AGAIN,
            Some(_) => TERMINAL,
        };
        self.fast_tag.store(tag, Ordering::Release);
    }

    pub fn notify_all(&self) {
        self.condvar.notify_all();
    }

    /// Parks the calling thread on the condition for up to `budget`,
    /// returning early as soon as the slot stops being empty. Must be
    /// called with `guard` holding this monitor's lock.
    pub fn wait_for(
        &self,
        guard: &mut parking_lot::MutexGuard<'_, MonitorState<T>>,
        budget: Duration,
    ) {
        if budget.is_zero() || guard.slot.is_some() {
            return;
        }
        self.condvar.wait_for(guard, budget);
    }

    pub fn enter_wait(&self) {
        self.waiter_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exit_wait(&self) {
        self.waiter_count.fetch_sub(1, Ordering::Relaxed);
    }
}
