//! The invocation registry seam: tracks in-flight invocations and must be
//! told, idempotently, when one resolves.

use std::sync::Mutex;

use crate::ids::InvocationId;

/// Tracks in-flight invocations. `deregister` must be idempotent: completion
/// calls it exactly once per terminal outcome, but a redundant completion
/// arriving from late network traffic may call it again defensively.
pub trait InvocationRegistry: Send + Sync {
    fn deregister(&self, id: InvocationId);
}

/// A registry that discards deregistrations; suitable when nothing external
/// tracks in-flight invocations.
#[derive(Debug, Default)]
pub struct NoopInvocationRegistry;

impl InvocationRegistry for NoopInvocationRegistry {
    fn deregister(&self, _id: InvocationId) {}
}

/// A registry that records every deregistration call, for asserting
/// "exactly once or zero times" in tests.
#[derive(Default)]
pub struct RecordingInvocationRegistry {
    calls: Mutex<Vec<InvocationId>>,
}

impl RecordingInvocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<InvocationId> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

impl InvocationRegistry for RecordingInvocationRegistry {
    fn deregister(&self, id: InvocationId) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(id);
    }
}
