//! Promise handle for host operations.
//!
//! This module provides the consumer side of a pending host request: a
//! cloneable handle that settles at most once and runs registered reactions
//! when it does. A promise bound to an event loop queues each reaction as a
//! microtask instead of calling it from whoever settled the promise.

use crate::resolver_registry::Resolver;
use crate::task_queue::{MicroTask, MicrotaskQueue};
use core_types::{JsError, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been resolved with a value.
    Fulfilled,
    /// The promise has been rejected with an error.
    Rejected,
}

/// A reaction handler run when a Promise settles.
pub struct Function {
    callback: Box<dyn FnOnce(Result<Value, JsError>) + Send>,
}

impl Function {
    /// Creates a new Function from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Result<Value, JsError>) + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Calls the function with the settled outcome.
    pub fn call(self, outcome: Result<Value, JsError>) {
        (self.callback)(outcome)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function {{ ... }}")
    }
}

#[derive(Debug)]
struct PromiseInner {
    state: PromiseState,
    result: Option<Value>,
    error: Option<JsError>,
    reactions: Vec<Function>,
}

/// A shared handle to an eventually-settled host result.
///
/// Clones observe the same underlying state. Reactions of a promise created
/// with [`Promise::new_on`] run from the loop's microtask queue; reactions of
/// a detached promise ([`Promise::new`]) run synchronously.
///
/// # Examples
///
/// ```
/// use async_runtime::{Promise, PromiseState};
/// use core_types::Value;
///
/// let promise = Promise::new();
/// assert_eq!(promise.state(), PromiseState::Pending);
///
/// promise.resolve(Value::Smi(42));
/// assert_eq!(promise.state(), PromiseState::Fulfilled);
/// assert_eq!(promise.value(), Some(Value::Smi(42)));
/// ```
#[derive(Debug, Clone)]
pub struct Promise {
    inner: Arc<Mutex<PromiseInner>>,
    jobs: Option<MicrotaskQueue>,
}

impl Promise {
    /// Creates a new pending Promise that is not bound to an event loop.
    pub fn new() -> Self {
        Self::with_jobs(None)
    }

    /// Creates a new pending Promise whose reactions are queued on `jobs`.
    ///
    /// ```
    /// use async_runtime::{EventLoop, Promise};
    /// use core_types::Value;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let mut event_loop = EventLoop::new();
    /// let promise = Promise::new_on(&event_loop.microtasks());
    /// let ran = Arc::new(AtomicBool::new(false));
    /// let r = ran.clone();
    /// promise.then(move |_| r.store(true, Ordering::SeqCst), |_| {});
    ///
    /// promise.resolve(Value::Smi(1));
    /// assert!(!ran.load(Ordering::SeqCst));
    ///
    /// event_loop.run_all_microtasks().unwrap();
    /// assert!(ran.load(Ordering::SeqCst));
    /// ```
    pub fn new_on(jobs: &MicrotaskQueue) -> Self {
        Self::with_jobs(Some(jobs.clone()))
    }

    fn with_jobs(jobs: Option<MicrotaskQueue>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PromiseInner {
                state: PromiseState::Pending,
                result: None,
                error: None,
                reactions: Vec::new(),
            })),
            jobs,
        }
    }

    /// Creates a detached Promise that is already rejected with `error`.
    pub fn rejected(error: JsError) -> Self {
        let promise = Self::new();
        promise.reject(error);
        promise
    }

    /// Creates a Promise on `jobs` that is already rejected with `error`.
    pub fn rejected_on(jobs: &MicrotaskQueue, error: JsError) -> Self {
        let promise = Self::new_on(jobs);
        promise.reject(error);
        promise
    }

    /// Creates a detached pending Promise together with a [`Resolver`] that
    /// settles it.
    ///
    /// The resolver is what gets parked in a
    /// [`ResolverRegistry`](crate::ResolverRegistry).
    pub fn with_resolver() -> (Promise, Resolver<Value, JsError>) {
        Self::new().paired_with_resolver()
    }

    /// Like [`with_resolver`](Self::with_resolver), with reactions queued on
    /// `jobs`.
    pub fn with_resolver_on(jobs: &MicrotaskQueue) -> (Promise, Resolver<Value, JsError>) {
        Self::new_on(jobs).paired_with_resolver()
    }

    fn paired_with_resolver(self) -> (Promise, Resolver<Value, JsError>) {
        let on_resolve = self.clone();
        let on_reject = self.clone();
        let resolver = Resolver::new(
            move |value| on_resolve.resolve(value),
            move |error| on_reject.reject(error),
        );
        (self, resolver)
    }

    /// Resolves the Promise with a value.
    ///
    /// If the Promise is already settled this is a no-op.
    pub fn resolve(&self, value: Value) {
        self.settle(Ok(value));
    }

    /// Rejects the Promise with an error.
    ///
    /// If the Promise is already settled this is a no-op.
    pub fn reject(&self, error: JsError) {
        self.settle(Err(error));
    }

    /// Registers handlers for fulfillment and/or rejection.
    ///
    /// On an already-settled Promise the matching handler is dispatched
    /// right away: called directly when detached, queued when bound to a loop.
    pub fn then<F, R>(&self, on_fulfilled: F, on_rejected: R)
    where
        F: FnOnce(Value) + Send + 'static,
        R: FnOnce(JsError) + Send + 'static,
    {
        self.on_settled(Function::new(move |outcome| match outcome {
            Ok(value) => on_fulfilled(value),
            Err(error) => on_rejected(error),
        }));
    }

    /// Registers a reaction receiving the settled outcome.
    pub fn on_settled(&self, reaction: Function) {
        let outcome = {
            let mut inner = self.inner.lock();
            match inner.state {
                PromiseState::Pending => {
                    inner.reactions.push(reaction);
                    return;
                }
                PromiseState::Fulfilled => Ok(inner.result.clone().unwrap_or(Value::Undefined)),
                PromiseState::Rejected => match inner.error.clone() {
                    Some(error) => Err(error),
                    None => Ok(Value::Undefined),
                },
            }
        };
        self.dispatch(reaction, outcome);
    }

    /// The current state.
    pub fn state(&self) -> PromiseState {
        self.inner.lock().state
    }

    /// Returns true once fulfilled or rejected.
    pub fn is_settled(&self) -> bool {
        self.state() != PromiseState::Pending
    }

    /// The fulfillment value, if fulfilled.
    pub fn value(&self) -> Option<Value> {
        self.inner.lock().result.clone()
    }

    /// The rejection error, if rejected.
    pub fn error(&self) -> Option<JsError> {
        self.inner.lock().error.clone()
    }

    /// Checks if there are reactions waiting for this Promise to settle.
    pub fn has_pending_reactions(&self) -> bool {
        !self.inner.lock().reactions.is_empty()
    }

    fn settle(&self, outcome: Result<Value, JsError>) {
        let reactions = {
            let mut inner = self.inner.lock();
            if inner.state != PromiseState::Pending {
                return;
            }
            match &outcome {
                Ok(value) => {
                    inner.state = PromiseState::Fulfilled;
                    inner.result = Some(value.clone());
                }
                Err(error) => {
                    inner.state = PromiseState::Rejected;
                    inner.error = Some(error.clone());
                }
            }
            std::mem::take(&mut inner.reactions)
        };
        for reaction in reactions {
            self.dispatch(reaction, outcome.clone());
        }
    }

    fn dispatch(&self, reaction: Function, outcome: Result<Value, JsError>) {
        match &self.jobs {
            Some(jobs) => jobs.enqueue(MicroTask::new(move || {
                reaction.call(outcome);
                Ok(Value::Undefined)
            })),
            None => reaction.call(outcome),
        }
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}
