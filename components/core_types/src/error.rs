//! Script-visible error types.
//!
//! A [`JsError`] is what a host component hands back to script code when an
//! operation fails, most commonly as the reason a pending promise is rejected.

use std::fmt;
use thiserror::Error;

/// The kind of script error.
///
/// These correspond to the built-in error constructors a script can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Value out of allowed range
    RangeError,
    /// Operation aborted before it could complete
    AbortError,
    /// Internal host error
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::AbortError => "AbortError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// A script-visible error with a kind and a message.
///
/// # Examples
///
/// ```
/// use core_types::{JsError, ErrorKind};
///
/// let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
/// assert_eq!(error.kind, ErrorKind::TypeError);
/// assert_eq!(error.message, "undefined is not a function");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl JsError {
    /// Creates a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an [`ErrorKind::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    /// Shorthand for an [`ErrorKind::AbortError`].
    pub fn abort(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AbortError, message)
    }
}
