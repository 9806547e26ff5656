//! Runner orchestrating a tester session
//!
//! The Runner owns the event loop and the tester, records every
//! `getlocation` event, and reports how the sort promise settled.

use crate::error::CliResult;
use async_runtime::{EventLoop, PromiseState};
use core_types::{JsError, Value};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};
use web_platform::{Event, TesterConfig, WebIdlTester, GETLOCATION_EVENT};

/// Outcome of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// How the sort promise settled
    pub outcome: Result<Value, JsError>,
    /// Events observed on the tester, in dispatch order
    pub events: Vec<Event>,
    /// Virtual time at the end of the session
    pub elapsed_ms: u64,
    /// Requests rejected by teardown
    pub rejected_on_teardown: usize,
}

/// Drives a [`WebIdlTester`] on a virtual event loop.
pub struct Runner {
    tester: WebIdlTester,
    event_loop: EventLoop,
    events: Arc<Mutex<Vec<Event>>>,
}

impl Runner {
    /// Create a runner with an initialized tester
    ///
    /// # Example
    /// ```
    /// use web_platform::TesterConfig;
    /// use webidl_cli::Runner;
    ///
    /// let runner = Runner::new(TesterConfig::default().with_seed(1));
    /// ```
    pub fn new(config: TesterConfig) -> Self {
        let tester = WebIdlTester::new(config);
        tester.init();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        tester
            .events()
            .add_event_listener(GETLOCATION_EVENT, move |event| {
                sink.lock().push(event.clone());
            });

        Self {
            tester,
            event_loop: EventLoop::new(),
            events,
        }
    }

    /// Sort `values`, optionally tearing down after `teardown_after_ms`
    ///
    /// # Errors
    /// Returns `CliError::JsError` if a task on the event loop fails
    ///
    /// # Example
    /// ```
    /// use core_types::Value;
    /// use web_platform::TesterConfig;
    /// use webidl_cli::Runner;
    ///
    /// let mut runner = Runner::new(TesterConfig::default().with_seed(1));
    /// let report = runner.run(vec![Value::Smi(2), Value::Smi(1)], None).unwrap();
    /// assert_eq!(report.outcome, Ok(Value::Array(vec![Value::Smi(1), Value::Smi(2)])));
    /// ```
    pub fn run(&mut self, values: Vec<Value>, teardown_after_ms: Option<u64>) -> CliResult<RunReport> {
        info!(count = values.len(), "starting sort request");
        let promise = self.tester.sort(&mut self.event_loop, values);

        let mut rejected_on_teardown = 0;
        if let Some(ms) = teardown_after_ms {
            self.event_loop.advance_by(ms)?;
            rejected_on_teardown = self.tester.uninit();
            debug!(at_ms = self.event_loop.now_ms(), rejected_on_teardown, "teardown");
        }
        self.event_loop.run_until_done()?;

        let outcome = match promise.state() {
            PromiseState::Fulfilled => Ok(promise.value().unwrap_or(Value::Undefined)),
            PromiseState::Rejected => Err(promise
                .error()
                .unwrap_or_else(|| JsError::internal("rejected without reason"))),
            PromiseState::Pending => Err(JsError::internal("sort request never settled")),
        };

        let events = std::mem::take(&mut *self.events.lock());

        Ok(RunReport {
            outcome,
            events,
            elapsed_ms: self.event_loop.now_ms(),
            rejected_on_teardown,
        })
    }

    /// Access the tester
    pub fn tester(&self) -> &WebIdlTester {
        &self.tester
    }
}
