//! Corten WebIDL tester CLI
//!
//! Entry point. Parses CLI arguments, sets up logging, and delegates to
//! the Runner for execution.

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;
use web_platform::TesterConfig;
use webidl_cli::{parse_value, Cli, CliError, CliResult, Runner};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> CliResult<TesterConfig> {
    let mut config = match &cli.config {
        Some(path) => TesterConfig::from_json_file(path)?,
        None => TesterConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(CliError::ConfigError(e)) => {
            eprintln!("Config Error: {}", e);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let values = cli.values.iter().map(String::as_str).map(parse_value).collect();
    let mut runner = Runner::new(config);

    match runner.run(values, cli.teardown_after_ms) {
        Ok(report) => {
            for event in &report.events {
                match &event.detail {
                    Some(detail) => println!(
                        "event {} complete={} percentage={} msg={:?}",
                        event.event_type, detail.is_complete, detail.percentage, detail.msg
                    ),
                    None => println!("event {}", event.event_type),
                }
            }
            match report.outcome {
                Ok(value) => println!("fulfilled [{}] at {}ms", value, report.elapsed_ms),
                Err(error) => {
                    println!("rejected {} at {}ms", error, report.elapsed_ms);
                    std::process::exit(3);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
