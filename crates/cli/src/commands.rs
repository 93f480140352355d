//! Clap command definition.

use clap::{Arg, ArgAction, Command};

/// Indices declared when `--index` is not given.
pub const DEFAULT_INDICES: [&str; 2] = ["size", "sha256"];

/// Build the `cdb` command.
pub fn build_cli() -> Command {
    Command::new("cdb")
        .about("Query file metadata held in an in-memory containerdb")
        .version(clap::crate_version!())
        .arg(
            Arg::new("data")
                .long("data")
                .value_name("FILE")
                .help("JSON object mapping each key to its metadata document"),
        )
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("DIR")
                .help("Seed from the files under DIR (size and sha256 of each)")
                .conflicts_with("data"),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .value_name("GLOB")
                .help("File name pattern for --path")
                .default_value("*"),
        )
        .arg(
            Arg::new("index")
                .long("index")
                .value_name("NAME")
                .help("Metric to index over all keys (repeatable)")
                .action(ArgAction::Append)
                .default_values(DEFAULT_INDICES),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("TOML database configuration"),
        )
        .arg(
            Arg::new("default-config")
                .long("default-config")
                .help("Print the default configuration file and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("search")
                .long("search")
                .value_name("TERM")
                .help("Search term, matched against --metric"),
        )
        .arg(
            Arg::new("get")
                .long("get")
                .value_name("TERM")
                .help("Show metadata for keys containing TERM"),
        )
        .arg(
            Arg::new("metric")
                .long("metric")
                .value_name("NAME")
                .help("Order by (or with --search, search within) an indexed metric"),
        )
        .arg(
            Arg::new("ls")
                .long("ls")
                .help("List all keys")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}
