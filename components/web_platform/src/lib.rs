//! Web platform host components for the JavaScript runtime
//!
//! Implements the WebIDL tester: a privileged host object that hands
//! promises to scripts, settles them from timers, fires a custom progress
//! event and rejects everything outstanding when torn down.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod event_target;
pub mod webidl_tester;

// Re-export main types
pub use config::{ConfigError, DelayRange, TesterConfig};
pub use event_target::{Event, EventTarget, Listener, ListenerId, TestEventDetail};
pub use webidl_tester::{WebIdlTester, GETLOCATION_EVENT, ONGETLOCATION, TEARDOWN_REASON};
