//! ArgMatches → Options/CliAction conversion.
//!
//! Exactly one action runs per invocation. Flags are checked in this
//! order: `--ls`, `--get`, `--search` with `--metric`, `--metric`; with
//! none of them the whole store is dumped.

use std::path::PathBuf;

use clap::ArgMatches;

/// What to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Every key in key order.
    List,
    /// Entries whose key contains the term.
    Get(String),
    /// Keys whose metric value contains the term.
    Search { metric: String, term: String },
    /// Entries in index order of the metric.
    OrderBy(String),
    /// Every entry in key order.
    Dump,
}

/// Everything the invocation asked for.
#[derive(Debug, Clone)]
pub struct Options {
    pub data: Option<PathBuf>,
    pub path: Option<PathBuf>,
    pub pattern: String,
    pub indices: Vec<String>,
    pub config: Option<PathBuf>,
    pub metric: Option<String>,
    pub action: CliAction,
    pub verbose: bool,
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let text = |id: &str| {
            matches
                .get_one::<String>(id)
                .filter(|value| !value.is_empty())
                .cloned()
        };
        let metric = text("metric");
        Options {
            data: matches.get_one::<String>("data").map(PathBuf::from),
            path: matches.get_one::<String>("path").map(PathBuf::from),
            pattern: matches
                .get_one::<String>("pattern")
                .cloned()
                .unwrap_or_else(|| "*".to_string()),
            indices: matches
                .get_many::<String>("index")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            config: matches.get_one::<String>("config").map(PathBuf::from),
            action: action(matches.get_flag("ls"), text("get"), text("search"), metric.clone()),
            metric,
            verbose: matches.get_flag("verbose"),
        }
    }

    /// `None` if `--metric` names a declared index (or was not given),
    /// otherwise the offending metric.
    pub fn invalid_metric(&self) -> Option<&str> {
        self.metric
            .as_deref()
            .filter(|metric| !self.indices.iter().any(|index| index == metric))
    }

    /// Message printed to stderr for an undeclared `--metric`.
    pub fn metric_error(&self) -> Option<String> {
        self.invalid_metric()
            .map(|metric| format!("{} is not a valid metric", metric))
    }
}

fn action(
    ls: bool,
    get: Option<String>,
    search: Option<String>,
    metric: Option<String>,
) -> CliAction {
    if ls {
        return CliAction::List;
    }
    if let Some(term) = get {
        return CliAction::Get(term);
    }
    match (search, metric) {
        (Some(term), Some(metric)) => CliAction::Search { metric, term },
        (_, Some(metric)) => CliAction::OrderBy(metric),
        _ => CliAction::Dump,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["cdb"];
        argv.extend_from_slice(args);
        Options::from_matches(&build_cli().try_get_matches_from(argv).unwrap())
    }

    #[test]
    fn dispatch_order() {
        assert_eq!(parse(&[]).action, CliAction::Dump);
        assert_eq!(parse(&["--ls", "--get", "f1"]).action, CliAction::List);
        assert_eq!(
            parse(&["--get", "f1", "--metric", "size"]).action,
            CliAction::Get("f1".into())
        );
        assert_eq!(
            parse(&["--search", "12", "--metric", "size"]).action,
            CliAction::Search {
                metric: "size".into(),
                term: "12".into()
            }
        );
        assert_eq!(
            parse(&["--metric", "size"]).action,
            CliAction::OrderBy("size".into())
        );
        // search without a metric has nothing to search in
        assert_eq!(parse(&["--search", "12"]).action, CliAction::Dump);
    }

    #[test]
    fn empty_values_count_as_absent() {
        assert_eq!(parse(&["--get", ""]).action, CliAction::Dump);
        assert_eq!(parse(&["--metric", ""]).invalid_metric(), None);
    }

    #[test]
    fn metric_must_be_indexed() {
        assert_eq!(parse(&["--metric", "size"]).invalid_metric(), None);
        assert_eq!(parse(&["--metric", "colour"]).invalid_metric(), Some("colour"));
        assert_eq!(
            parse(&["--index", "name", "--metric", "size"]).invalid_metric(),
            Some("size")
        );
    }

    #[test]
    fn paths_and_flags() {
        let options = parse(&["--data", "files.json", "--config", "db.toml", "-v"]);
        assert_eq!(options.data, Some(PathBuf::from("files.json")));
        assert_eq!(options.config, Some(PathBuf::from("db.toml")));
        assert!(options.verbose);
        assert_eq!(options.indices, vec!["size", "sha256"]);
        assert_eq!(options.path, None);
        assert_eq!(options.pattern, "*");

        let options = parse(&["--path", "/srv/files", "--pattern", "*.txt"]);
        assert_eq!(options.path, Some(PathBuf::from("/srv/files")));
        assert_eq!(options.pattern, "*.txt");
    }

    #[test]
    fn metric_error_message() {
        assert_eq!(parse(&["--metric", "size"]).metric_error(), None);
        assert_eq!(
            parse(&["--metric", "colour"]).metric_error().as_deref(),
            Some("colour is not a valid metric")
        );
    }
}
