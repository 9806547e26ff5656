//! Async runtime for host components.
//!
//! This crate provides the asynchronous plumbing a host component needs to
//! hand a promise to a script and settle it later:
//! - Resolver registry correlating request ids with pending completions
//! - Promise handles that settle at most once
//! - Event loop with task, microtask and timer queues
//!
//! # Overview
//!
//! - [`ResolverRegistry`] - id → pending [`Resolver`] map with bulk teardown
//! - [`Promise`] - shared handle to an eventually-settled result
//! - [`EventLoop`] - main loop coordinating tasks and timers
//!
//! # Examples
//!
//! ## Deferred completion
//!
//! ```
//! use async_runtime::{EventLoop, Promise, PromiseState, ResolverRegistry, Task};
//! use core_types::Value;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ResolverRegistry::new());
//! let mut event_loop = EventLoop::new();
//!
//! let (promise, resolver) = Promise::with_resolver();
//! let id = registry.register(resolver);
//!
//! let r = registry.clone();
//! event_loop.set_timeout(1000, Task::new(move || {
//!     let _ = r.resolve(id, Value::Smi(42));
//!     Ok(Value::Undefined)
//! }));
//!
//! assert_eq!(promise.state(), PromiseState::Pending);
//! event_loop.run_until_done().unwrap();
//! assert_eq!(promise.value(), Some(Value::Smi(42)));
//! ```
//!
//! ## Teardown
//!
//! ```
//! use async_runtime::{Promise, PromiseState, ResolverRegistry};
//! use core_types::JsError;
//!
//! let registry = ResolverRegistry::new();
//! let (promise, resolver) = Promise::with_resolver();
//! registry.register(resolver);
//!
//! assert_eq!(registry.reject_all(JsError::abort("got destroyed")), 1);
//! assert_eq!(promise.state(), PromiseState::Rejected);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event_loop;
pub mod promise;
pub mod resolver_registry;
pub mod task_queue;

// Re-export main types at crate root
pub use event_loop::EventLoop;
pub use promise::{Function, Promise, PromiseState};
pub use resolver_registry::{RegistryError, Resolver, ResolverId, ResolverRegistry};
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerId, TimerQueue};
