//! Pending-request resolver registry.
//!
//! Host operations that return a promise immediately but complete later
//! (from a timer, an external event, or the owning runtime) park their
//! completion handler here under an opaque [`ResolverId`]. The id is threaded
//! through to whatever eventually calls [`ResolverRegistry::resolve`] or
//! [`ResolverRegistry::reject`]. On teardown the owner calls
//! [`ResolverRegistry::reject_all`] so no caller is left waiting forever.
//!
//! ```text
//! register(resolver) ──► id ──► timer / event / runtime
//!                                     │
//!             resolve(id, v) ◄────────┘   (exactly once per id)
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// Opaque identifier of a pending request.
///
/// Ids are allocated from a counter that only moves forward, so an id that
/// has been resolved, rejected or torn down never names a different request
/// later on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverId(u64);

impl ResolverId {
    /// Returns the raw counter value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned by registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No pending request carries this id. Either it was already settled
    /// (double resolution) or it was cancelled by a teardown.
    #[error("no pending request with id {0}")]
    NotFound(ResolverId),
}

impl RegistryError {
    /// The id the failed operation was called with.
    pub fn id(&self) -> ResolverId {
        match self {
            RegistryError::NotFound(id) => *id,
        }
    }

    /// Returns true if the error is expected once the owner has torn the
    /// registry down, i.e. a completion arrived for a request that
    /// [`ResolverRegistry::reject_all`] already settled.
    ///
    /// ```
    /// use async_runtime::{RegistryError, Resolver, ResolverRegistry};
    ///
    /// let registry: ResolverRegistry<u32, &'static str> = ResolverRegistry::new();
    /// let id = registry.register(Resolver::new(|_| {}, |_| {}));
    /// registry.reject_all("got destroyed");
    ///
    /// let err = registry.resolve(id, 7).unwrap_err();
    /// assert!(err.is_benign_after_teardown());
    /// ```
    pub fn is_benign_after_teardown(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }
}

/// A two-branch completion handler awaiting exactly one outcome.
///
/// Both continuations are owned closures, so the handler stays bound to its
/// request even when it runs long after the call that created it.
pub struct Resolver<T, E> {
    on_resolve: Box<dyn FnOnce(T) + Send>,
    on_reject: Box<dyn FnOnce(E) + Send>,
}

impl<T, E> Resolver<T, E> {
    /// Creates a resolver from a success and a failure continuation.
    pub fn new<R, J>(on_resolve: R, on_reject: J) -> Self
    where
        R: FnOnce(T) + Send + 'static,
        J: FnOnce(E) + Send + 'static,
    {
        Self {
            on_resolve: Box::new(on_resolve),
            on_reject: Box::new(on_reject),
        }
    }

    /// Consumes the resolver, running the success continuation.
    pub fn resolve(self, value: T) {
        (self.on_resolve)(value)
    }

    /// Consumes the resolver, running the failure continuation.
    pub fn reject(self, reason: E) {
        (self.on_reject)(reason)
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolver {{ ... }}")
    }
}

struct Inner<T, E> {
    pending: HashMap<ResolverId, Resolver<T, E>>,
    next_id: u64,
}

/// Maps opaque request ids to their pending [`Resolver`]s.
///
/// All state sits behind a single mutex that is held only while the map is
/// looked up or mutated. Continuations always run after the lock is
/// released, so a continuation may register or settle other requests on the
/// same registry.
///
/// # Examples
///
/// ```
/// use async_runtime::{RegistryError, Resolver, ResolverRegistry};
/// use std::sync::{Arc, Mutex};
///
/// let registry: ResolverRegistry<&'static str, &'static str> = ResolverRegistry::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let s = seen.clone();
/// let id = registry.register(Resolver::new(move |v| s.lock().unwrap().push(v), |_| {}));
///
/// registry.resolve(id, "ok").unwrap();
/// assert_eq!(registry.resolve(id, "again"), Err(RegistryError::NotFound(id)));
/// assert_eq!(*seen.lock().unwrap(), vec!["ok"]);
/// ```
pub struct ResolverRegistry<T, E> {
    inner: Mutex<Inner<T, E>>,
}

impl<T, E> ResolverRegistry<T, E> {
    /// Creates an empty registry. The first id handed out is 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                pending: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Stores a resolver and returns the fresh id it was filed under.
    pub fn register(&self, resolver: Resolver<T, E>) -> ResolverId {
        let mut inner = self.inner.lock();
        let id = ResolverId(inner.next_id);
        inner.next_id += 1;
        inner.pending.insert(id, resolver);
        trace!(
            event = "resolver.register",
            id = id.as_u64(),
            pending = inner.pending.len(),
            "registered pending request"
        );
        id
    }

    /// Settles `id` successfully with `value`.
    ///
    /// The entry is removed before its continuation runs. Returns
    /// [`RegistryError::NotFound`] if nothing is pending under `id`; in that
    /// case `value` is dropped and no continuation runs.
    pub fn resolve(&self, id: ResolverId, value: T) -> Result<(), RegistryError> {
        let resolver = self.take(id)?;
        trace!(event = "resolver.resolve", id = id.as_u64(), "resolving request");
        resolver.resolve(value);
        Ok(())
    }

    /// Settles `id` with a failure `reason`.
    ///
    /// Symmetric to [`ResolverRegistry::resolve`].
    pub fn reject(&self, id: ResolverId, reason: E) -> Result<(), RegistryError> {
        let resolver = self.take(id)?;
        trace!(event = "resolver.reject", id = id.as_u64(), "rejecting request");
        resolver.reject(reason);
        Ok(())
    }

    /// Removes `id` without running either continuation.
    ///
    /// Useful when the caller wants to run the resolver itself.
    pub fn take(&self, id: ResolverId) -> Result<Resolver<T, E>, RegistryError> {
        let removed = self.inner.lock().pending.remove(&id);
        removed.ok_or_else(|| {
            debug!(
                event = "resolver.not_found",
                id = id.as_u64(),
                "no pending request for id"
            );
            RegistryError::NotFound(id)
        })
    }

    /// Returns true if a request is pending under `id`.
    pub fn contains(&self, id: ResolverId) -> bool {
        self.inner.lock().pending.contains_key(&id)
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Ids of all pending requests, in allocation order.
    pub fn pending_ids(&self) -> Vec<ResolverId> {
        let mut ids: Vec<_> = self.inner.lock().pending.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl<T, E: Clone> ResolverRegistry<T, E> {
    /// Rejects every request pending at call time with `reason`.
    ///
    /// The pending set is drained in one critical section; requests
    /// registered afterwards (including from inside a failure continuation)
    /// are left pending. Returns the number of requests rejected. Calling
    /// this on an empty registry does nothing.
    pub fn reject_all(&self, reason: E) -> usize {
        let drained: Vec<_> = self.inner.lock().pending.drain().collect();
        let count = drained.len();
        if count > 0 {
            debug!(
                event = "resolver.reject_all",
                count, "rejecting all pending requests"
            );
        }
        for (_, resolver) in drained {
            resolver.reject(reason.clone());
        }
        count
    }
}

impl<T, E> Default for ResolverRegistry<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for ResolverRegistry<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ResolverRegistry")
            .field("pending", &inner.pending.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}
