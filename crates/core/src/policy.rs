//! Recovery policies selectable through configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// What deleting an absent key inside a transaction does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Fail with `Error::KeyNotFound`
    #[default]
    Error,
    /// Succeed, reporting that nothing existed
    Ignore,
}

impl MissingKeyPolicy {
    /// Name as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            MissingKeyPolicy::Error => "error",
            MissingKeyPolicy::Ignore => "ignore",
        }
    }
}

impl fmt::Display for MissingKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingKeyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(MissingKeyPolicy::Error),
            "ignore" => Ok(MissingKeyPolicy::Ignore),
            other => Err(Error::Config(format!(
                "unknown missing_key policy '{}', expected \"error\" or \"ignore\"",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("error".parse::<MissingKeyPolicy>().unwrap(), MissingKeyPolicy::Error);
        assert_eq!("ignore".parse::<MissingKeyPolicy>().unwrap(), MissingKeyPolicy::Ignore);
        assert!("skip".parse::<MissingKeyPolicy>().is_err());
    }

    #[test]
    fn test_display_round_trips_config_name() {
        assert_eq!(MissingKeyPolicy::Ignore.to_string(), "ignore");
        assert_eq!(MissingKeyPolicy::default(), MissingKeyPolicy::Error);
    }
}
