//! Database setup and action execution.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use containerdb_core::index_json;
use containerdb_engine::{ascend, Database, DatabaseConfig};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::parse::{CliAction, Options};

/// Result of one action, ready for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Keys(Vec<String>),
    Entries(Vec<(String, String)>),
    Ordered {
        metric: String,
        entries: Vec<(String, String)>,
    },
}

/// Load the configuration named by `--config`, or the default.
pub fn load_config(path: Option<&Path>) -> Result<DatabaseConfig> {
    match path {
        Some(path) => Ok(DatabaseConfig::from_file(path)?),
        None => Ok(DatabaseConfig::default()),
    }
}

/// Read a data file: a JSON object whose values are the stored documents.
pub fn load_data(path: &Path) -> Result<Vec<(String, String)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;
    let object: Map<String, Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object", path.display()))?;
    Ok(object
        .into_iter()
        .map(|(key, doc)| (key, doc.to_string()))
        .collect())
}

/// Open a database, declare the indices and load the entries.
pub fn open(
    config: DatabaseConfig,
    indices: &[String],
    entries: &[(String, String)],
) -> Result<Database> {
    let db = Database::open_with_config(config);
    for name in indices {
        db.create_index(name, "*", index_json(name.as_str()))
            .with_context(|| format!("failed to declare index {}", name))?;
    }
    db.update(|txn| {
        for (key, doc) in entries {
            txn.set(key, doc)?;
        }
        Ok(())
    })
    .context("failed to load entries")?;
    info!(entries = entries.len(), indices = indices.len(), "Database ready");
    Ok(db)
}

/// Run the requested action in a read-only transaction.
pub fn execute(db: &Database, action: &CliAction) -> Result<Output> {
    debug!(?action, "Executing");
    let output = db.view(|txn| {
        Ok(match action {
            CliAction::List => Output::Keys(ascend::list(txn)?),
            CliAction::Get(term) => Output::Entries(ascend::search_keys(txn, term)?),
            CliAction::Search { metric, term } => {
                Output::Entries(ascend::search_metric(txn, metric, term)?)
            }
            CliAction::OrderBy(metric) => Output::Ordered {
                metric: metric.clone(),
                entries: ascend::order_by(txn, metric)?,
            },
            CliAction::Dump => Output::Entries(ascend::dump(txn)?),
        })
    })?;
    Ok(output)
}

/// Full invocation minus logging setup: returns the lines to print.
pub fn run(options: &Options) -> Result<Vec<String>> {
    let config = load_config(options.config.as_deref())?;
    let entries = match (&options.data, &options.path) {
        (Some(data), _) => load_data(data)?,
        (None, Some(root)) => crate::scan::scan(root, &options.pattern)?,
        (None, None) => Vec::new(),
    };
    let db = open(config, &options.indices, &entries)?;
    let output = execute(&db, &options.action)?;
    db.close()?;
    Ok(crate::format::lines(&output))
}
