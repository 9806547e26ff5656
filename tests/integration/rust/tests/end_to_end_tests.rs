//! End-to-end tests: tester, event loop and runner together

use async_runtime::{EventLoop, PromiseState};
use core_types::{ErrorKind, Value};
use std::sync::{Arc, Mutex};
use web_platform::{DelayRange, TesterConfig, WebIdlTester, GETLOCATION_EVENT};
use webidl_cli::{parse_value, Runner};

#[test]
fn sort_then_event_in_time_order() {
    let mut event_loop = EventLoop::new();
    let tester = WebIdlTester::new(TesterConfig::default().with_seed(3));
    tester.init();

    let timeline = Arc::new(Mutex::new(Vec::new()));
    let t = timeline.clone();
    tester
        .events()
        .add_event_listener(GETLOCATION_EVENT, move |_| t.lock().unwrap().push("event"));

    let promise = tester.sort(&mut event_loop, vec![Value::Smi(3), Value::Smi(1)]);
    let t = timeline.clone();
    promise.then(move |_| t.lock().unwrap().push("sorted"), |_| {});

    event_loop.run_until_done().unwrap();
    // Sort settles within 1-3s, the event fires within 5-7s.
    assert_eq!(*timeline.lock().unwrap(), vec!["sorted", "event"]);
}

#[test]
fn teardown_between_request_and_completion() {
    let mut event_loop = EventLoop::new();
    let tester = WebIdlTester::new(
        TesterConfig::default().with_sort_delay(DelayRange::fixed(2000)),
    );
    tester.init();

    let promise = tester.sort(&mut event_loop, vec![Value::Smi(1)]);
    event_loop.advance_by(1000).unwrap();
    assert_eq!(tester.uninit(), 1);

    event_loop.run_until_done().unwrap();
    let error = promise.error().unwrap();
    assert_eq!(error.kind, ErrorKind::AbortError);
    assert_eq!(error.message, "got destroyed");
    assert_eq!(tester.pending_requests(), 0);
}

#[test]
fn runner_with_parsed_cli_values() {
    let values = ["pear", "10", "9", "undefined", "apple"]
        .iter()
        .copied()
        .map(parse_value)
        .collect();
    let mut runner = Runner::new(TesterConfig::default().with_seed(5));
    let report = runner.run(values, None).unwrap();

    assert_eq!(
        report.outcome,
        Ok(Value::Array(vec![
            Value::Smi(9),
            Value::Smi(10),
            Value::from("apple"),
            Value::from("pear"),
            Value::Undefined,
        ]))
    );
    assert_eq!(promise_state_name(&report.outcome), "fulfilled");
}

fn promise_state_name<T, E>(outcome: &Result<T, E>) -> &'static str {
    match outcome {
        Ok(_) => "fulfilled",
        Err(_) => "rejected",
    }
}

#[test]
fn dropped_tester_rejects_outstanding() {
    let mut event_loop = EventLoop::new();
    let promise = {
        let tester = WebIdlTester::new(TesterConfig::default().with_seed(1));
        tester.init();
        tester.sort(&mut event_loop, vec![])
    };
    assert_eq!(promise.state(), PromiseState::Rejected);
    event_loop.run_until_done().unwrap();
    assert_eq!(promise.state(), PromiseState::Rejected);
}
