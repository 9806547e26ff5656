//! Unit tests for Promise

use async_runtime::{EventLoop, Function, Promise, PromiseState, ResolverRegistry, Task};
use core_types::{ErrorKind, JsError, Value};
use std::sync::{Arc, Mutex};

#[test]
fn new_promise_is_pending() {
    let promise = Promise::new();
    assert_eq!(promise.state(), PromiseState::Pending);
    assert!(!promise.is_settled());
}

#[test]
fn new_promise_has_no_result() {
    let promise = Promise::new();
    assert!(promise.value().is_none());
    assert!(promise.error().is_none());
}

#[test]
fn resolve_changes_state_to_fulfilled() {
    let promise = Promise::new();
    promise.resolve(Value::Smi(42));
    assert_eq!(promise.state(), PromiseState::Fulfilled);
    assert!(promise.is_settled());
}

#[test]
fn reject_changes_state_to_rejected() {
    let promise = Promise::new();
    promise.reject(JsError::new(ErrorKind::TypeError, "test"));
    assert_eq!(promise.state(), PromiseState::Rejected);
}

#[test]
fn cannot_resolve_already_fulfilled_promise() {
    let promise = Promise::new();
    promise.resolve(Value::Smi(42));
    promise.resolve(Value::Smi(100)); // Should be ignored
    assert_eq!(promise.value(), Some(Value::Smi(42)));
}

#[test]
fn cannot_reject_already_fulfilled_promise() {
    let promise = Promise::new();
    promise.resolve(Value::Smi(42));
    promise.reject(JsError::new(ErrorKind::TypeError, "test")); // Should be ignored
    assert_eq!(promise.state(), PromiseState::Fulfilled);
    assert!(promise.error().is_none());
}

#[test]
fn clones_share_state() {
    let promise = Promise::new();
    let clone = promise.clone();
    clone.resolve(Value::Null);
    assert_eq!(promise.value(), Some(Value::Null));
}

#[test]
fn reactions_run_once_in_registration_order() {
    let promise = Promise::new();
    let order = Arc::new(Mutex::new(vec![]));

    for tag in 1..=3 {
        let o = order.clone();
        promise.on_settled(Function::new(move |_| o.lock().unwrap().push(tag)));
    }

    promise.resolve(Value::Undefined);
    promise.resolve(Value::Undefined);
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn rejected_handler_receives_error() {
    let promise = Promise::new();
    let seen = Arc::new(Mutex::new(None));
    let s = seen.clone();
    promise.then(|_| panic!("should not fulfill"), move |e| {
        *s.lock().unwrap() = Some(e.kind);
    });
    promise.reject(JsError::abort("cancelled"));
    assert_eq!(*seen.lock().unwrap(), Some(ErrorKind::AbortError));
}

#[test]
fn resolver_from_registry_settles_promise() {
    let registry = ResolverRegistry::new();
    let (promise, resolver) = Promise::with_resolver();
    let id = registry.register(resolver);

    registry
        .resolve(id, Value::Array(vec![Value::Smi(1), Value::Smi(3), Value::Smi(5)]))
        .unwrap();

    assert_eq!(
        promise.value(),
        Some(Value::Array(vec![Value::Smi(1), Value::Smi(3), Value::Smi(5)]))
    );
}

#[test]
fn reaction_may_resolve_another_promise() {
    let first = Promise::new();
    let second = Promise::new();
    let s = second.clone();
    first.then(move |v| s.resolve(v), |_| {});
    first.resolve(Value::from("chained"));
    assert_eq!(second.value(), Some(Value::from("chained")));
}

#[test]
fn timer_settled_reaction_runs_before_next_timer() {
    let mut event_loop = EventLoop::new();
    let registry = Arc::new(ResolverRegistry::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let (promise, resolver) = Promise::with_resolver_on(&event_loop.microtasks());
    let id = registry.register(resolver);
    let o = order.clone();
    promise.then(move |_| o.lock().unwrap().push("reaction"), |_| {});

    let (r, o) = (registry.clone(), order.clone());
    event_loop.set_timeout(
        10,
        Task::new(move || {
            r.resolve(id, Value::Undefined).unwrap();
            o.lock().unwrap().push("settled");
            Ok(Value::Undefined)
        }),
    );
    let o = order.clone();
    event_loop.set_timeout(
        10,
        Task::new(move || {
            o.lock().unwrap().push("next timer");
            Ok(Value::Undefined)
        }),
    );

    event_loop.run_until_done().unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["settled", "reaction", "next timer"]);
}
