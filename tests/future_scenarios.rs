//! End-to-end completion and timeout scenarios for `InvocationFuture`.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use relay_core::invocation::{Invocation, InvocationMeta};
use relay_core::liveness::AlwaysExecuting;
use relay_core::registry::NoopInvocationRegistry;
use relay_core::runtime::ThreadExecutor;
use relay_core::InvocationFuture;

fn meta() -> InvocationMeta {
    InvocationMeta {
        call_timeout: Duration::from_millis(1000),
        target_address: "peer-1".into(),
        is_remote: true,
        local_address: "self-1".into(),
    }
}

fn new_future<T: Send + Sync + 'static>() -> InvocationFuture<T> {
    InvocationFuture::new(
        Invocation::new(meta()),
        Arc::new(ThreadExecutor),
        Arc::new(NoopInvocationRegistry),
        Arc::new(AlwaysExecuting),
    )
}

#[test]
fn completes_successfully_with_a_value() {
    let _ = tracing_subscriber::fmt::try_init();

    let future = new_future::<String>();
    assert!(future.complete(Some("ok".to_string())));
    let value = future
        .await_timeout(Duration::from_millis(1000))
        .expect("no failure");
    assert_eq!(value.as_deref().map(String::as_str), Some("ok"));
    assert!(future.is_done());
}

#[test]
fn null_reply_resolves_to_none() {
    let future = new_future::<String>();
    assert!(future.complete(None));
    let value = future
        .await_timeout(Duration::from_millis(1000))
        .expect("no failure");
    assert_eq!(value, None);
    assert!(future.is_done());
}

#[test]
fn second_completion_attempt_loses() {
    let future = new_future::<String>();
    assert!(future.complete(Some("first".to_string())));
    assert!(!future.complete(Some("second".to_string())));
    let value = future
        .await_timeout(Duration::from_millis(1000))
        .expect("no failure");
    assert_eq!(value.as_deref().map(String::as_str), Some("first"));
}

#[test]
fn wait_again_resets_then_resolves_to_a_value() {
    let future = new_future::<i64>();
    assert!(future.complete_wait_again());
    assert!(!future.is_done());
    assert!(future.complete(Some(42)));
    let value = future
        .await_timeout(Duration::from_millis(1000))
        .expect("no failure");
    assert_eq!(value.as_deref().copied(), Some(42));
}

#[test]
fn local_budget_exhaustion_times_out_without_completing() {
    let future = new_future::<String>();
    let start = std::time::Instant::now();
    let outcome = future.await_timeout(Duration::from_millis(50));
    assert!(outcome.is_err());
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(!future.is_done());
}

#[test]
fn continuation_after_completion_runs_off_thread() {
    let future = new_future::<String>();
    assert!(future.complete(Some("x".to_string())));

    let attaching_thread = std::thread::current().id();
    let (tx, rx) = mpsc::channel();
    future.attach(move |outcome| {
        let ran_inline = std::thread::current().id() == attaching_thread;
        tx.send((outcome, ran_inline)).expect("receiver alive");
    });

    let (outcome, ran_inline) = rx
        .recv_timeout(Duration::from_secs(1))
        .expect("continuation delivered within bound");
    assert_eq!(
        outcome.expect("no failure").as_deref().map(String::as_str),
        Some("x")
    );
    assert!(!ran_inline, "continuation must not run inline on the attacher");
}
