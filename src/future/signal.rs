//! The response slot's value domain.
//!
//! Sentinels are modeled as distinct enum variants rather than singleton
//! objects distinguished by reference identity: matching `Signal::WaitAgain`
//! can never alias `Signal::Value(_)` regardless of what the payload
//! contains, so a tagged enum rules out the collision structurally instead
//! of relying on identity comparison.
//!
//! Payload and failure variants hold `Arc` rather than `T`/`InvocationError`
//! directly so that every waiter and every continuation can observe the
//! same terminal value without requiring `T: Clone`.

use std::sync::Arc;

use crate::error::InvocationError;

/// The content of the response slot. `None` (outside this enum, at the
/// call sites that hold `Option<Signal<T>>`) represents the *empty* state.
pub enum Signal<T> {
    /// Non-terminal: a waiter that observes this resets the slot to empty
    /// and continues waiting.
    WaitAgain,
    /// `null` normalized to a sentinel.
    NullReply,
    /// Installed only by external machinery, never by the await engine
    /// itself.
    Interrupted,
    /// Synthesized by the await engine on budget exhaustion or long-poll
    /// escalation.
    DeadlineExceeded,
    /// A real, already-decoded payload.
    Value(Arc<T>),
    /// A still-serialized payload, legal only for a future constructed in
    /// deserialize mode; decoded lazily at resolution time.
    Serialized(Arc<Vec<u8>>),
    /// A failure carrier wrapping a throwable-like error object.
    Failed(Arc<InvocationError>),
}

impl<T> Signal<T> {
    /// True when neither empty nor `WaitAgain`; emptiness is represented one
    /// level up by `Option::None`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Signal::WaitAgain)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        match self {
            Signal::WaitAgain => Signal::WaitAgain,
            Signal::NullReply => Signal::NullReply,
            Signal::Interrupted => Signal::Interrupted,
            Signal::DeadlineExceeded => Signal::DeadlineExceeded,
            Signal::Value(v) => Signal::Value(Arc::clone(v)),
            Signal::Serialized(bytes) => Signal::Serialized(Arc::clone(bytes)),
            Signal::Failed(e) => Signal::Failed(Arc::clone(e)),
        }
    }
}
