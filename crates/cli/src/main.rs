//! cdb: query file metadata held in an in-memory containerdb.
//!
//! The store is rebuilt on every invocation from `--data` (or by scanning
//! `--path`), indexed by each `--index` metric, queried once and discarded.

mod commands;
mod format;
mod parse;
mod run;
mod scan;

use std::process::ExitCode;

use containerdb_engine::DatabaseConfig;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::build_cli;
use parse::Options;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    if matches.get_flag("default-config") {
        print!("{}", DatabaseConfig::default_toml());
        return ExitCode::SUCCESS;
    }

    let options = Options::from_matches(&matches);

    let log_level = if options.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(options.verbose)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Some(message) = options.metric_error() {
        eprintln!("{}", message);
        return ExitCode::FAILURE;
    }

    match run::run(&options) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
