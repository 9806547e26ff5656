//! Script-visible value representation.
//!
//! This module provides the `Value` enum exchanged between host components
//! and script code: resolution values of promises, event payloads and the
//! results of host getters.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Represents any value a host component can hand to a script.
///
/// Numbers keep the small-integer/double split of the engine so that values
/// produced by scripts round-trip without conversion. Arrays and plain
/// objects are owned, which keeps `Value` `Send` and lets it travel through
/// timer callbacks on other threads.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let undefined = Value::Undefined;
/// let number = Value::Smi(42);
/// let float = Value::Double(3.14);
///
/// assert!(!undefined.is_truthy());
/// assert!(number.is_truthy());
/// assert_eq!(float.type_of(), "number");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The undefined value
    Undefined,
    /// The null value
    Null,
    /// Boolean (true or false)
    Boolean(bool),
    /// Small integer
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// String value
    String(String),
    /// Dense array of values
    Array(Vec<Value>),
    /// Plain object with string keys, kept in key order
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Builds a plain object from key/value pairs.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let info = Value::object([("latitude", Value::from("123"))]);
    /// assert_eq!(info.get("latitude"), Some(&Value::from("123")));
    /// ```
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Looks up a property of a plain object.
    ///
    /// Returns `None` for missing keys and for non-object values.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the numeric value for `Smi` and `Double`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Smi(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true for `Value::Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns whether this value is truthy.
    ///
    /// The falsy values are undefined, null, false, 0, NaN and the empty
    /// string. Arrays and objects are always truthy.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Undefined.is_truthy());
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::Boolean(false).is_truthy());
    /// assert!(!Value::Smi(0).is_truthy());
    /// assert!(!Value::Double(f64::NAN).is_truthy());
    ///
    /// assert!(Value::Boolean(true).is_truthy());
    /// assert!(Value::Array(vec![]).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Smi(n) => *n != 0,
            Value::Double(n) => !n.is_nan() && *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) => true,
            Value::Object(_) => true,
        }
    }

    /// Returns the `typeof` result for this value.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::Undefined.type_of(), "undefined");
    /// assert_eq!(Value::Null.type_of(), "object");
    /// assert_eq!(Value::Smi(42).type_of(), "number");
    /// assert_eq!(Value::Array(vec![]).type_of(), "object");
    /// ```
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Smi(_) | Value::Double(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
        }
    }

    /// Ordering used by the default array sort.
    ///
    /// `undefined` sorts after everything else and numbers sort before all
    /// other defined values. Two numbers compare numerically (NaN after
    /// other numbers); any other pair compares by string conversion. This is
    /// a total order, so it is safe to hand to `sort_by`.
    ///
    /// ```
    /// use core_types::Value;
    /// use std::cmp::Ordering;
    ///
    /// assert_eq!(Value::Smi(9).sort_compare(&Value::Smi(10)), Ordering::Less);
    /// assert_eq!(Value::Undefined.sort_compare(&Value::Smi(1)), Ordering::Greater);
    /// assert_eq!(Value::from("b").sort_compare(&Value::from("a")), Ordering::Greater);
    /// ```
    pub fn sort_compare(&self, other: &Value) -> Ordering {
        match (self.is_undefined(), other.is_undefined()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Smi(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// String conversion.
///
/// Arrays join their elements with commas (undefined and null become empty),
/// plain objects print as `[object Object]`.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Undefined.to_string(), "undefined");
/// assert_eq!(Value::Double(2.0).to_string(), "2");
/// assert_eq!(Value::Array(vec![Value::Smi(1), Value::Null, Value::Smi(3)]).to_string(), "1,,3");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued doubles display without decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !matches!(item, Value::Undefined | Value::Null) {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
        }
    }
}
