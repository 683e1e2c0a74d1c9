//! relay-core: the Invocation Future, the synchronization primitive at the
//! heart of a distributed operation service.
//!
//! The future represents the eventual outcome of an invocation dispatched
//! to a possibly-remote peer, and is the rendezvous between the thread(s)
//! awaiting a reply, the transport callback delivering it, and any number
//! of user-supplied completion continuations.
//!
//! Invocation dispatch, the wire codec, cluster membership, and the thread
//! pool's internal scheduling policy are external collaborators and are
//! out of scope for this crate; only the narrow seams this future actually
//! calls into ([`liveness`], [`registry`], [`runtime`]) are modeled here.

pub mod error;
pub mod future;
pub mod ids;
pub mod interrupt;
pub mod invocation;
pub mod liveness;
pub mod registry;
pub mod runtime;
pub mod time;

pub use error::InvocationError;
pub use future::{InvocationFuture, Outcome, Signal};
pub use ids::InvocationId;
pub use invocation::{Invocation, InvocationMeta};
