//! The invocation future: the synchronization primitive rendezvousing a
//! blocking/timed waiter, a transport delivery thread, and any number of
//! user-supplied completion continuations.
//!
//! One concern per file: the response slot's value domain, the waiter
//! monitor, the completion gate, the await engine, and the public handle
//! each get their own module here.

mod engine;
mod gate;
mod handle;
mod monitor;
mod signal;

pub use handle::InvocationFuture;
pub use signal::Signal;

use std::sync::Arc;
use std::time::Duration;

use crate::error::InvocationError;
use crate::invocation::Invocation;

/// The user-visible resolution of a future: `Ok(None)` for a null reply,
/// `Ok(Some(value))` for a real payload, `Err(_)` for any of the three
/// terminal error categories.
pub type Outcome<T> = Result<Option<Arc<T>>, Arc<InvocationError>>;

/// Maps a terminal [`Signal`] to its [`Outcome`], decoding a still-serialized
/// payload through the invocation's decoder when present.
///
/// Panics if handed a non-terminal `Signal::WaitAgain`: callers must filter
/// that case out before resolving, exactly as the await engine's main loop
/// does by looping instead of falling through to resolution.
fn resolve_signal<T>(signal: Signal<T>, invocation: &Invocation<T>) -> Outcome<T> {
    match signal {
        Signal::WaitAgain => unreachable!("WAIT_AGAIN is never resolved directly"),
        Signal::NullReply => Ok(None),
        Signal::Interrupted => Err(Arc::new(InvocationError::Interrupted)),
        Signal::DeadlineExceeded => {
            Err(Arc::new(InvocationError::deadline_exceeded(Duration::ZERO)))
        }
        Signal::Value(value) => Ok(Some(value)),
        Signal::Failed(error) => Err(error),
        Signal::Serialized(bytes) => {
            let bytes = Arc::try_unwrap(bytes).unwrap_or_else(|shared| (*shared).clone());
            match invocation.decode(bytes) {
                Ok(value) => Ok(value.map(Arc::new)),
                Err(error) => Err(Arc::new(error)),
            }
        }
    }
}
