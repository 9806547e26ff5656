//! Core host value types and error handling.
//!
//! This crate provides the foundational types shared by the host runtime
//! components: the values that cross the boundary between privileged host
//! code and scripts, and the error type used as a rejection reason.
//!
//! # Overview
//!
//! - [`Value`] - Representation of script-visible values
//! - [`JsError`] - Script-visible errors
//! - [`ErrorKind`] - Types of script errors
//!
//! # Examples
//!
//! ```
//! use core_types::{Value, JsError, ErrorKind};
//!
//! let num = Value::Smi(42);
//! assert!(num.is_truthy());
//! assert_eq!(num.type_of(), "number");
//!
//! let error = JsError::new(ErrorKind::InternalError, "got destroyed");
//! assert_eq!(error.to_string(), "InternalError: got destroyed");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, JsError};
pub use value::Value;
