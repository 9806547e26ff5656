//! Contract tests for async_runtime component
//!
//! These tests pin the public surface other components build on.

use async_runtime::{
    EventLoop, MicroTask, Promise, PromiseState, RegistryError, Resolver, ResolverId,
    ResolverRegistry, Task, TimerId,
};
use core_types::{JsError, Value};

mod event_loop_contract {
    use super::*;

    #[test]
    fn event_loop_enqueue_microtask_accepts_microtask() {
        let mut event_loop = EventLoop::new();
        event_loop.enqueue_microtask(MicroTask::new(|| Ok(Value::Undefined)));
    }

    #[test]
    fn set_timeout_returns_timer_id() {
        let mut event_loop = EventLoop::new();
        let a: TimerId = event_loop.set_timeout(10, Task::new(|| Ok(Value::Undefined)));
        let b: TimerId = event_loop.set_timeout(10, Task::new(|| Ok(Value::Undefined)));
        assert_ne!(a, b);
    }

    #[test]
    fn run_until_done_returns_result() {
        let mut event_loop = EventLoop::new();
        let result: Result<(), JsError> = event_loop.run_until_done();
        assert!(result.is_ok());
    }
}

mod registry_contract {
    use super::*;

    #[test]
    fn register_returns_resolver_id() {
        let registry: ResolverRegistry<Value, JsError> = ResolverRegistry::new();
        let _id: ResolverId = registry.register(Resolver::new(|_| {}, |_| {}));
    }

    #[test]
    fn resolve_returns_registry_error_on_unknown_id() {
        let registry: ResolverRegistry<Value, JsError> = ResolverRegistry::default();
        let id = registry.register(Resolver::new(|_| {}, |_| {}));
        registry.reject(id, JsError::internal("x")).unwrap();
        let result: Result<(), RegistryError> = registry.resolve(id, Value::Undefined);
        assert_eq!(result, Err(RegistryError::NotFound(id)));
    }

    #[test]
    fn reject_all_returns_count() {
        let registry: ResolverRegistry<Value, JsError> = ResolverRegistry::new();
        let count: usize = registry.reject_all(JsError::abort("teardown"));
        assert_eq!(count, 0);
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolverRegistry<Value, JsError>>();
    }

    #[test]
    fn debug_output_hides_continuations() {
        let registry: ResolverRegistry<Value, JsError> = ResolverRegistry::new();
        registry.register(Resolver::new(|_| {}, |_| {}));
        let text = format!("{:?}", registry);
        assert!(text.contains("pending: 1"));
    }
}

mod promise_contract {
    use super::*;

    #[test]
    fn with_resolver_returns_pending_promise() {
        let (promise, _resolver): (Promise, Resolver<Value, JsError>) = Promise::with_resolver();
        assert_eq!(promise.state(), PromiseState::Pending);
    }

    #[test]
    fn rejected_constructor_is_settled() {
        let promise = Promise::rejected(JsError::internal("nope"));
        assert_eq!(promise.state(), PromiseState::Rejected);
    }

    #[test]
    fn promise_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Promise>();
    }
}
