//! WebIDL tester CLI library
//!
//! Provides the argument parser and the [`Runner`] that drives a
//! [`web_platform::WebIdlTester`] on a virtual event loop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod runner;

pub use cli::{parse_value, Cli};
pub use error::{CliError, CliResult};
pub use runner::{RunReport, Runner};
