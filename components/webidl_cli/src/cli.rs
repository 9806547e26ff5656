//! Command line arguments

use clap::Parser;
use core_types::Value;

/// Drive the WebIDL tester through a sort request on a virtual clock
#[derive(Debug, Parser)]
#[command(name = "corten-webidl", version, about)]
pub struct Cli {
    /// Comma-separated values to sort, e.g. `5,3,1`
    #[arg(long, value_delimiter = ',', default_value = "5,3,1")]
    pub values: Vec<String>,

    /// JSON tester configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Seed for delay sampling (overrides the config file)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Tear the tester down after this many virtual milliseconds
    #[arg(short, long)]
    pub teardown_after_ms: Option<u64>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long)]
    pub verbose: bool,
}

/// Parses one command line item into a script value.
///
/// Integers that fit become `Smi`, other numbers `Double`, the literals
/// `undefined`, `null`, `true` and `false` map to their values, and
/// anything else is a string.
pub fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    match raw {
        "undefined" => return Value::Undefined,
        "null" => return Value::Null,
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i32>() {
        return Value::Smi(n);
    }
    match raw.parse::<f64>() {
        Ok(n) => Value::Double(n),
        Err(_) => Value::String(raw.to_string()),
    }
}
