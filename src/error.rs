//! The three terminal error categories a waiter can observe. Contract
//! violations, executor rejections, and continuation exceptions never reach
//! this type — they are asserted or logged internally and are not part of
//! the future's public outcome.

use std::time::Duration;

/// An error surfaced to an awaiter of an [`crate::future::InvocationFuture`].
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The remote peer (or a local delivery thread acting on its behalf)
    /// completed the invocation with a failure carrier.
    #[error("remote invocation failed: {source}")]
    Remote {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Synthesized by the Await Engine when the caller's budget elapsed, or
    /// by long-poll escalation when the liveness oracle reports the remote
    /// is no longer executing the request.
    #[error("invocation timed out after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },

    /// A terminal interrupt, installed only by external machinery — the
    /// Await Engine itself never synthesizes this from a parked interrupt.
    #[error("invocation was interrupted")]
    Interrupted,
}

impl InvocationError {
    pub fn remote(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        InvocationError::Remote {
            source: Box::new(source),
        }
    }

    pub fn deadline_exceeded(elapsed: Duration) -> Self {
        InvocationError::DeadlineExceeded { elapsed }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, InvocationError::Interrupted)
    }
}
