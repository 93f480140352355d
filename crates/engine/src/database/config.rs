//! Database configuration via `containerdb.toml`
//!
//! The store is purely in-memory, so configuration only covers behavior:
//! what deleting a missing key does and how indices order values unless
//! told otherwise. Every field has a default, so an empty file is valid.

use std::path::Path;

use containerdb_core::{Comparator, Error, MissingKeyPolicy, Result};
use serde::{Deserialize, Serialize};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "containerdb.toml";

/// Database configuration.
///
/// # Example
///
/// ```toml
/// # "error" (default) or "ignore"
/// missing_key = "error"
///
/// # "lexical" (default), "case_insensitive" or "numeric"
/// default_comparator = "lexical"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Deleting an absent key: `"error"` or `"ignore"`.
    #[serde(default)]
    pub missing_key: MissingKeyPolicy,
    /// Comparator for indices created without an explicit one.
    #[serde(default)]
    pub default_comparator: Comparator,
}

impl DatabaseConfig {
    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Serialize this config to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# containerdb configuration
#
# Deleting a key that does not exist: "error" (default) or "ignore"
#   "error"  = the delete fails with a not-found error
#   "ignore" = the delete succeeds and reports that nothing existed
missing_key = "error"

# Ordering for indices created without an explicit comparator
#   "lexical" (default), "case_insensitive" or "numeric"
# Note: with "lexical", numeric metrics sort as strings ("10" before "2").
default_comparator = "lexical"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.missing_key, MissingKeyPolicy::Error);
        assert_eq!(config.default_comparator, Comparator::Lexical);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(DatabaseConfig::from_toml_str("").unwrap(), DatabaseConfig::default());
    }

    #[test]
    fn parse_all_fields() {
        let config = DatabaseConfig::from_toml_str(
            "missing_key = \"ignore\"\ndefault_comparator = \"numeric\"\n",
        )
        .unwrap();
        assert_eq!(config.missing_key, MissingKeyPolicy::Ignore);
        assert_eq!(config.default_comparator, Comparator::Numeric);
    }

    #[test]
    fn parse_invalid_value_returns_error() {
        let err = DatabaseConfig::from_toml_str("missing_key = \"explode\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn parse_unknown_field_returns_error() {
        assert!(DatabaseConfig::from_toml_str("durability = \"always\"").is_err());
    }

    #[test]
    fn default_toml_parses_correctly() {
        let config = DatabaseConfig::from_toml_str(DatabaseConfig::default_toml()).unwrap();
        assert_eq!(config, DatabaseConfig::default());
    }

    #[test]
    fn to_toml_parses_back() {
        let config = DatabaseConfig {
            missing_key: MissingKeyPolicy::Ignore,
            default_comparator: Comparator::CaseInsensitive,
        };
        let text = config.to_toml().unwrap();
        assert_eq!(DatabaseConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn from_file_reads_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "default_comparator = \"numeric\"\n").unwrap();

        let config = DatabaseConfig::from_file(&path).unwrap();
        assert_eq!(config.default_comparator, Comparator::Numeric);
    }

    #[test]
    fn from_missing_file_returns_error() {
        let dir = TempDir::new().unwrap();
        let err = DatabaseConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
