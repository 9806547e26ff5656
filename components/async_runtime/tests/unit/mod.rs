//! Unit test runner for async_runtime

mod promise_test;
