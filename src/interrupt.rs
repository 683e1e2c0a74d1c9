//! Cooperative interrupt emulation.
//!
//! Rust has no equivalent of `Thread.interrupt()` / `Thread.isInterrupted()`.
//! [`InterruptFlag`] models the per-future "someone asked this waiter to
//! reconsider" signal from the wait loop's point of view; the thread-local
//! latch below models the interrupt *status* that Java restores on the
//! calling thread once the future finally resolves to a non-interrupt value.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static INTERRUPTED: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread's emulated interrupt status is set.
pub fn is_current_thread_interrupted() -> bool {
    INTERRUPTED.with(|flag| flag.get())
}

/// Clears and returns the current thread's emulated interrupt status.
pub fn clear_current_thread_interrupt() -> bool {
    INTERRUPTED.with(|flag| flag.replace(false))
}

pub(crate) fn latch_current_thread_interrupted() {
    INTERRUPTED.with(|flag| flag.set(true));
}

/// A one-shot, per-future request to reconsider the wait loop's state.
///
/// Setting this flag does not abort an in-progress wait; the await engine
/// observes it on the next wake and folds it into the loop's `interrupted`
/// local, the cooperative analogue of catching an interrupt mid-park.
#[derive(Debug, Default)]
pub struct InterruptFlag(AtomicBool);

impl InterruptFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Consumes and returns whether an interrupt was requested since the
    /// last call.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_is_one_shot() {
        let flag = InterruptFlag::new();
        assert!(!flag.take());
        flag.request();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn thread_local_latch_round_trips() {
        assert!(!is_current_thread_interrupted());
        latch_current_thread_interrupted();
        assert!(is_current_thread_interrupted());
        assert!(clear_current_thread_interrupt());
        assert!(!is_current_thread_interrupted());
    }
}
