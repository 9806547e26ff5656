//! Error types for the CLI

use core_types::JsError;
use thiserror::Error;
use web_platform::ConfigError;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Error raised by a task on the event loop
    #[error("JavaScript error: {0}")]
    JsError(#[from] JsError),

    /// Tester configuration could not be loaded
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
