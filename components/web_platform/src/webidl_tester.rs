//! WebIDL tester host component.
//!
//! A privileged host object exposed to scripts for exercising the
//! promise-returning and event-firing paths of the bindings layer:
//!
//! - `sort(values)` returns a promise that settles from a timer
//! - a `getlocation` progress event fires from a second timer
//! - `info` is a fixed object
//! - `uninit()` rejects every outstanding request with `"got destroyed"`
//!
//! Outstanding requests live in a [`ResolverRegistry`]; the tester owns the
//! registry rather than extending a request-helper base.

use crate::config::TesterConfig;
use crate::event_target::{Event, EventTarget, TestEventDetail};
use async_runtime::{EventLoop, Promise, ResolverRegistry, Task};
use core_types::{JsError, Value};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Type of the progress event fired after a sort request.
pub const GETLOCATION_EVENT: &str = "getlocation";

/// Name of the handler attribute for [`GETLOCATION_EVENT`].
pub const ONGETLOCATION: &str = "ongetlocation";

/// Message every pending request is rejected with on teardown.
pub const TEARDOWN_REASON: &str = "got destroyed";

const PROGRESS_MESSAGE: &str = "javascript is weird";

/// The WebIDL tester.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use core_types::Value;
/// use web_platform::{TesterConfig, WebIdlTester};
///
/// let mut event_loop = EventLoop::new();
/// let tester = WebIdlTester::new(TesterConfig::default().with_seed(1));
/// tester.init();
///
/// let promise = tester.sort(&mut event_loop, vec![Value::Smi(5), Value::Smi(1), Value::Smi(3)]);
/// event_loop.run_until_done().unwrap();
///
/// assert_eq!(
///     promise.value(),
///     Some(Value::Array(vec![Value::Smi(1), Value::Smi(3), Value::Smi(5)]))
/// );
/// ```
pub struct WebIdlTester {
    registry: Arc<ResolverRegistry<Value, JsError>>,
    events: Arc<EventTarget>,
    alive: Arc<AtomicBool>,
    config: TesterConfig,
    rng: Mutex<StdRng>,
}

impl WebIdlTester {
    /// Creates a tester that is not yet attached to a host context.
    pub fn new(config: TesterConfig) -> Self {
        let rng = config.rng();
        Self {
            registry: Arc::new(ResolverRegistry::new()),
            events: Arc::new(EventTarget::new()),
            alive: Arc::new(AtomicBool::new(false)),
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Attaches the tester to its host context. Idempotent.
    pub fn init(&self) {
        if !self.alive.swap(true, Ordering::SeqCst) {
            info!(event = "webidl_tester.init", "tester initialized");
        }
    }

    /// Returns true between [`init`](Self::init) and [`uninit`](Self::uninit).
    pub fn is_initialized(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Detaches the tester and rejects every outstanding request.
    ///
    /// Returns the number of requests rejected. Timers already scheduled
    /// still fire, but their completions find nothing to settle and their
    /// events are not dispatched.
    pub fn uninit(&self) -> usize {
        let was_alive = self.alive.swap(false, Ordering::SeqCst);
        let rejected = self.registry.reject_all(JsError::abort(TEARDOWN_REASON));
        if was_alive {
            info!(
                event = "webidl_tester.uninit",
                rejected, "tester torn down"
            );
        }
        rejected
    }

    /// The fixed `info` object.
    pub fn info(&self) -> Value {
        Value::object([
            ("latitude", Value::from("123")),
            ("longitude", Value::from("456")),
        ])
    }

    /// Sets the `ongetlocation` handler attribute.
    pub fn set_ongetlocation<F>(&self, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.set_event_handler(ONGETLOCATION, handler);
    }

    /// Returns true if an `ongetlocation` handler is set.
    pub fn has_ongetlocation(&self) -> bool {
        self.events.event_handler(ONGETLOCATION).is_some()
    }

    /// Clears the `ongetlocation` handler attribute.
    pub fn clear_ongetlocation(&self) -> bool {
        self.events.clear_event_handler(ONGETLOCATION)
    }

    /// The tester's event target, for `addEventListener`-style access.
    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    /// Number of sort requests that have not settled.
    pub fn pending_requests(&self) -> usize {
        self.registry.len()
    }

    /// Starts an asynchronous sort of `values`.
    ///
    /// The returned promise fulfills with the sorted array once the sort
    /// timer fires, or rejects if the tester is torn down first. A second
    /// timer dispatches a [`GETLOCATION_EVENT`] progress event. On a tester
    /// that is not initialized the promise is already rejected. Reactions
    /// run from `event_loop`'s microtask queue.
    pub fn sort(&self, event_loop: &mut EventLoop, values: Vec<Value>) -> Promise {
        let jobs = event_loop.microtasks();
        if !self.is_initialized() {
            warn!(
                event = "webidl_tester.sort.uninitialized",
                "sort called on uninitialized tester"
            );
            return Promise::rejected_on(&jobs, JsError::internal("tester is not initialized"));
        }

        let (promise, resolver) = Promise::with_resolver_on(&jobs);
        let id = self.registry.register(resolver);

        // An uninit that landed between the check above and register has
        // already drained the registry without seeing this request.
        if !self.is_initialized() {
            if self.registry.reject(id, JsError::abort(TEARDOWN_REASON)).is_ok() {
                debug!(
                    event = "webidl_tester.sort.torn_down",
                    id = id.as_u64(),
                    "teardown raced sort request"
                );
            }
            return promise;
        }

        let (sort_delay, event_delay) = {
            let mut rng = self.rng.lock();
            (
                self.config.sort_delay_ms.sample(&mut *rng),
                self.config.event_delay_ms.sample(&mut *rng),
            )
        };
        debug!(
            event = "webidl_tester.sort",
            id = id.as_u64(),
            len = values.len(),
            sort_delay,
            event_delay,
            "sort request scheduled"
        );

        let events = Arc::clone(&self.events);
        let alive = Arc::clone(&self.alive);
        event_loop.set_timeout(
            event_delay,
            Task::new(move || {
                if alive.load(Ordering::SeqCst) {
                    let detail = TestEventDetail {
                        is_complete: true,
                        percentage: 100,
                        msg: PROGRESS_MESSAGE.to_string(),
                    };
                    events.dispatch_event(&Event::with_detail(GETLOCATION_EVENT, detail));
                }
                Ok(Value::Undefined)
            }),
        );

        let registry = Arc::clone(&self.registry);
        event_loop.set_timeout(
            sort_delay,
            Task::new(move || {
                // Sorts the caller's values rather than answering with a
                // fixed placeholder array.
                let mut sorted = values;
                sorted.sort_by(Value::sort_compare);
                match registry.resolve(id, Value::Array(sorted)) {
                    Err(err) if err.is_benign_after_teardown() => debug!(
                        event = "webidl_tester.sort.stale",
                        id = id.as_u64(),
                        %err,
                        "dropping late sort result"
                    ),
                    Err(err) => warn!(
                        event = "webidl_tester.sort.failed",
                        id = id.as_u64(),
                        %err,
                        "sort result not delivered"
                    ),
                    Ok(()) => {}
                }
                Ok(Value::Undefined)
            }),
        );

        promise
    }
}

impl Drop for WebIdlTester {
    fn drop(&mut self) {
        if self.is_initialized() {
            self.uninit();
        }
    }
}

impl fmt::Debug for WebIdlTester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebIdlTester")
            .field("initialized", &self.is_initialized())
            .field("pending", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
