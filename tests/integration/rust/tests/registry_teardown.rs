//! Resolver registry behavior across the event loop and promise layers

use async_runtime::{EventLoop, Promise, PromiseState, RegistryError, ResolverRegistry, Task};
use core_types::{JsError, Value};
use std::sync::{Arc, Mutex};

#[test]
fn resolve_then_duplicate_resolve_reports_not_found() {
    let registry = ResolverRegistry::new();
    let (promise, resolver) = Promise::with_resolver();
    let id = registry.register(resolver);
    assert_eq!(id.as_u64(), 1);

    registry.resolve(id, Value::from("ok")).unwrap();
    assert_eq!(
        registry.resolve(id, Value::from("again")),
        Err(RegistryError::NotFound(id))
    );
    assert_eq!(promise.value(), Some(Value::from("ok")));
}

#[test]
fn shutdown_rejects_both_and_later_resolve_is_not_found() {
    let registry = ResolverRegistry::new();
    let (first, r1) = Promise::with_resolver();
    let (second, r2) = Promise::with_resolver();
    let id1 = registry.register(r1);
    let id2 = registry.register(r2);
    assert_eq!((id1.as_u64(), id2.as_u64()), (1, 2));

    assert_eq!(registry.reject_all(JsError::abort("shutdown")), 2);
    for promise in [&first, &second] {
        assert_eq!(promise.error().map(|e| e.message), Some("shutdown".to_string()));
    }
    assert_eq!(
        registry.resolve(id1, Value::Undefined),
        Err(RegistryError::NotFound(id1))
    );
}

#[test]
fn timeout_implemented_by_caller_timer() {
    let registry = Arc::new(ResolverRegistry::new());
    let mut event_loop = EventLoop::new();

    let (promise, resolver) = Promise::with_resolver();
    let id = registry.register(resolver);

    // Completion arrives at 500ms, the caller's own timeout at 200ms.
    let r = registry.clone();
    event_loop.set_timeout(
        500,
        Task::new(move || {
            let _ = r.resolve(id, Value::Smi(1));
            Ok(Value::Undefined)
        }),
    );
    let r = registry.clone();
    event_loop.set_timeout(
        200,
        Task::new(move || {
            let _ = r.reject(id, JsError::abort("timed out"));
            Ok(Value::Undefined)
        }),
    );

    event_loop.run_until_done().unwrap();
    assert_eq!(promise.state(), PromiseState::Rejected);
    assert_eq!(promise.error().map(|e| e.message), Some("timed out".to_string()));
}

#[test]
fn completion_handler_registering_new_request() {
    let registry: Arc<ResolverRegistry<Value, JsError>> = Arc::new(ResolverRegistry::new());
    let follow_up = Arc::new(Mutex::new(None));

    let (first, resolver) = Promise::with_resolver();
    registry.register(resolver);

    let r = registry.clone();
    let f = follow_up.clone();
    first.then(
        move |_| {
            let (next, resolver) = Promise::with_resolver();
            let id = r.register(resolver);
            *f.lock().unwrap() = Some((id, next));
        },
        |_| {},
    );

    let first_id = registry.pending_ids()[0];
    registry.resolve(first_id, Value::Null).unwrap();

    let (next_id, next) = follow_up.lock().unwrap().take().unwrap();
    assert!(next_id > first_id);
    assert_eq!(registry.reject_all(JsError::abort("bye")), 1);
    assert_eq!(next.state(), PromiseState::Rejected);
}
