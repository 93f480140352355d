//! Ordering of extracted index values
//!
//! Extracted values are strings. By default they are ordered
//! byte-lexicographically, so a numeric metric such as file size sorts
//! `"10"` before `"2"`. Indices that want numeric order opt in with
//! [`Comparator::Numeric`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How an index orders the values its extractor produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Byte-lexicographic string order
    #[default]
    Lexical,
    /// Lexical order after lowercasing
    CaseInsensitive,
    /// Numbers first in numeric order, then non-numeric values lexically
    Numeric,
}

impl Comparator {
    /// Build the sort key for an extracted value
    pub fn sort_key(self, extracted: String) -> SortKey {
        match self {
            Comparator::Lexical => SortKey::Text(extracted),
            Comparator::CaseInsensitive => SortKey::Text(extracted.to_lowercase()),
            Comparator::Numeric => match extracted.trim().parse::<f64>() {
                Ok(n) if !n.is_nan() => SortKey::Number(n),
                _ => SortKey::Text(extracted),
            },
        }
    }

    /// Name as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Lexical => "lexical",
            Comparator::CaseInsensitive => "case_insensitive",
            Comparator::Numeric => "numeric",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(Comparator::Lexical),
            "case_insensitive" => Ok(Comparator::CaseInsensitive),
            "numeric" => Ok(Comparator::Numeric),
            other => Err(Error::Config(format!(
                "unknown comparator '{}', expected \"lexical\", \"case_insensitive\" or \"numeric\"",
                other
            ))),
        }
    }
}

/// An extracted value in comparable form
///
/// `Number` always sorts before `Text`. Numbers use `f64::total_cmp`, so
/// the ordering is total and `Eq` is sound.
#[derive(Debug, Clone)]
pub enum SortKey {
    /// Parsed numeric value
    Number(f64),
    /// Raw or normalized text
    Text(String),
}

impl SortKey {
    /// Text form of the key, for display and pivots
    pub fn to_text(&self) -> String {
        match self {
            SortKey::Number(n) => n.to_string(),
            SortKey::Text(s) => s.clone(),
        }
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        }
    }
}
