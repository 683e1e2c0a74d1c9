//! The opaque `Invocation` handle consumed by the await engine.
//!
//! Split into a non-generic [`InvocationMeta`] (the fields the liveness
//! oracle and the long-poll escalation math need) and the generic
//! [`Invocation`] wrapper that additionally carries the optional decode
//! step for futures constructed in "deserialize" mode. Keeping the oracle
//! and registry seams non-generic avoids an unnecessary generic parameter
//! leaking through every external collaborator trait.

use std::time::Duration;

use crate::error::InvocationError;

/// Fields of an invocation that do not depend on its result type.
#[derive(Debug, Clone)]
pub struct InvocationMeta {
    /// The per-invocation call timeout `C`. `Duration::ZERO` means "no
    /// timeout": the derived max-single-poll bound is unbounded.
    pub call_timeout: Duration,
    pub target_address: String,
    pub is_remote: bool,
    pub local_address: String,
}

impl InvocationMeta {
    /// Synthesizes a deadline-exceeded error for a timeout detected after
    /// `elapsed`.
    pub fn new_timeout(&self, elapsed: Duration) -> InvocationError {
        InvocationError::deadline_exceeded(elapsed)
    }

    /// True when the long-poll loop's "migration in progress" short-circuit
    /// applies: the invocation is remote but targets this very process.
    pub fn is_migrating_locally(&self) -> bool {
        self.is_remote && self.target_address == self.local_address
    }
}

/// A decode step applied to a still-serialized terminal value, used only by
/// futures constructed in deserialize mode.
pub type Decoder<T> = Box<dyn Fn(Vec<u8>) -> Result<Option<T>, InvocationError> + Send + Sync>;

/// The handle an [`crate::future::InvocationFuture`] is attached to.
pub struct Invocation<T> {
    pub meta: InvocationMeta,
    decoder: Option<Decoder<T>>,
}

impl<T> Invocation<T> {
    pub fn new(meta: InvocationMeta) -> Self {
        Self {
            meta,
            decoder: None,
        }
    }

    /// Constructs an invocation in "deserialize" mode: a still-serialized
    /// terminal value is passed through `decoder` before being handed to the
    /// awaiter.
    pub fn with_decoder(meta: InvocationMeta, decoder: Decoder<T>) -> Self {
        Self {
            meta,
            decoder: Some(decoder),
        }
    }

    pub fn decode(&self, bytes: Vec<u8>) -> Result<Option<T>, InvocationError> {
        match &self.decoder {
            Some(decoder) => decoder(bytes),
            None => Err(InvocationError::remote(NotInDeserializeMode)),
        }
    }

    pub fn is_deserialize_mode(&self) -> bool {
        self.decoder.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invocation was not constructed in deserialize mode")]
struct NotInDeserializeMode;
