//! Event dispatch for host components.
//!
//! An [`EventTarget`] carries `on<type>` handler attributes and listeners
//! added by type. Host code dispatches [`Event`]s to it, possibly from a
//! timer long after the listener was registered.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Init dictionary of the tester's custom progress event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestEventDetail {
    /// Whether the reported operation finished
    pub is_complete: bool,
    /// Progress in percent
    pub percentage: u8,
    /// Free-form message
    pub msg: String,
}

/// An event delivered to an [`EventTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event type, e.g. `"getlocation"`
    pub event_type: String,
    /// Payload of custom test events; `None` for plain events
    pub detail: Option<TestEventDetail>,
}

impl Event {
    /// Creates a plain event without payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            detail: None,
        }
    }

    /// Creates a custom test event carrying `detail`.
    pub fn with_detail(event_type: impl Into<String>, detail: TestEventDetail) -> Self {
        Self {
            event_type: event_type.into(),
            detail: Some(detail),
        }
    }
}

/// Shared event callback.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`EventTarget::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registrations {
    handlers: HashMap<String, Listener>,
    listeners: Vec<(ListenerId, String, Listener)>,
}

/// Dispatches events to handler attributes and typed listeners.
///
/// For each dispatch the `on<type>` handler runs first, then listeners of
/// that type in the order they were added. Callbacks run after the
/// registration lock is released, so a callback may add or remove
/// listeners; such changes take effect from the next dispatch.
///
/// # Examples
///
/// ```
/// use web_platform::{Event, EventTarget};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let target = EventTarget::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = hits.clone();
/// target.set_event_handler("ongetlocation", move |_| {
///     h.fetch_add(1, Ordering::SeqCst);
/// });
///
/// assert_eq!(target.dispatch_event(&Event::new("getlocation")), 1);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct EventTarget {
    registrations: Mutex<Registrations>,
    next_id: AtomicU64,
}

impl EventTarget {
    /// Creates a target with no handlers or listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener for events of `event_type`.
    pub fn add_event_listener<F>(&self, event_type: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.registrations
            .lock()
            .listeners
            .push((id, event_type.into(), Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut regs = self.registrations.lock();
        let before = regs.listeners.len();
        regs.listeners.retain(|(lid, _, _)| *lid != id);
        regs.listeners.len() != before
    }

    /// Sets the handler attribute `name` (e.g. `"ongetlocation"`), replacing
    /// any previous handler.
    pub fn set_event_handler<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.registrations
            .lock()
            .handlers
            .insert(name.into(), Arc::new(handler));
    }

    /// Returns the handler attribute `name`, if set.
    pub fn event_handler(&self, name: &str) -> Option<Listener> {
        self.registrations.lock().handlers.get(name).cloned()
    }

    /// Clears the handler attribute `name`. Returns false if none was set.
    pub fn clear_event_handler(&self, name: &str) -> bool {
        self.registrations.lock().handlers.remove(name).is_some()
    }

    /// Delivers `event` and returns how many callbacks ran.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        let callbacks: Vec<Listener> = {
            let regs = self.registrations.lock();
            let handler_name = format!("on{}", event.event_type);
            regs.handlers
                .get(&handler_name)
                .cloned()
                .into_iter()
                .chain(
                    regs.listeners
                        .iter()
                        .filter(|(_, ty, _)| *ty == event.event_type)
                        .map(|(_, _, l)| l.clone()),
                )
                .collect()
        };
        trace!(
            event = "event_target.dispatch",
            event_type = %event.event_type,
            callbacks = callbacks.len(),
            "dispatching event"
        );
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let regs = self.registrations.lock();
        f.debug_struct("EventTarget")
            .field("handlers", &regs.handlers.keys().collect::<Vec<_>>())
            .field("listeners", &regs.listeners.len())
            .finish()
    }
}
