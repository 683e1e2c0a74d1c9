//! Property-based tests for the completion-race invariants.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use relay_core::invocation::{Invocation, InvocationMeta};
use relay_core::liveness::AlwaysExecuting;
use relay_core::registry::NoopInvocationRegistry;
use relay_core::runtime::ThreadExecutor;
use relay_core::InvocationFuture;

fn meta() -> InvocationMeta {
    InvocationMeta {
        call_timeout: Duration::from_millis(500),
        target_address: "peer-1".into(),
        is_remote: true,
        local_address: "self-1".into(),
    }
}

fn new_future() -> InvocationFuture<String> {
    InvocationFuture::new(
        Invocation::new(meta()),
        Arc::new(ThreadExecutor),
        Arc::new(NoopInvocationRegistry),
        Arc::new(AlwaysExecuting),
    )
}

proptest! {
    /// Exactly one of two distinct completions wins; is_done() becomes
    /// true; a subsequent await returns the winning value.
    #[test]
    fn first_writer_wins(v1 in "[a-z]{1,8}", v2 in "[a-z]{1,8}") {
        prop_assume!(v1 != v2);
        let future = new_future();
        let first_won = future.complete(Some(v1.clone()));
        let second_won = future.complete(Some(v2.clone()));

        prop_assert!(first_won);
        prop_assert!(!second_won);
        prop_assert!(future.is_done());

        let resolved = future
            .await_timeout(Duration::from_millis(500))
            .unwrap()
            .unwrap();
        prop_assert_eq!(resolved.as_str(), v1.as_str());
    }

    /// complete(WAIT_AGAIN) followed by complete(v) yields await() = v;
    /// is_done() observed between the two calls is false.
    #[test]
    fn wait_again_then_value_resolves(v in "[a-z]{1,8}") {
        let future = new_future();
        prop_assert!(future.complete_wait_again());
        prop_assert!(!future.is_done());
        prop_assert!(future.complete(Some(v.clone())));

        let resolved = future
            .await_timeout(Duration::from_millis(500))
            .unwrap()
            .unwrap();
        prop_assert_eq!(resolved.as_str(), v.as_str());
    }

    /// cancel(_) returns false and changes neither is_done() nor the slot.
    #[test]
    fn cancel_is_a_no_op(v in "[a-z]{1,8}", complete_first in any::<bool>()) {
        let future = new_future();
        if complete_first {
            future.complete(Some(v.clone()));
        }
        let done_before = future.is_done();

        prop_assert!(!future.cancel(true));
        prop_assert!(!future.is_cancelled());
        prop_assert_eq!(future.is_done(), done_before);
    }
}
