//! PrimaryTable: the authoritative ordered key-value map
//!
//! Keys are unique strings kept in ascending byte order by a `BTreeMap`.
//! Values are opaque strings; the table never looks inside them.
//!
//! The table has no knowledge of indices. Keeping indices in step with
//! writes is the job of [`crate::Store`].

use std::collections::BTreeMap;
use std::ops::Bound;

use containerdb_core::{Error, Result};

/// Ordered map from unique key to value
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrimaryTable {
    entries: BTreeMap<String, String>,
}

impl PrimaryTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or overwrite an entry
    ///
    /// Returns the previous value, if the key existed.
    pub fn set(&mut self, key: String, value: String) -> Option<String> {
        self.entries.insert(key, value)
    }

    /// Get the value for a key
    ///
    /// # Errors
    /// `Error::KeyNotFound` if the key is absent.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Get the value for a key without failing
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Remove an entry, returning its value
    ///
    /// # Errors
    /// `Error::KeyNotFound` if the key is absent.
    pub fn delete(&mut self, key: &str) -> Result<String> {
        self.entries
            .remove(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Visit entries in ascending key order until `visit` returns false
    pub fn ascend<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (key, value) in &self.entries {
            if !visit(key, value) {
                break;
            }
        }
    }

    /// Iterate entries in ascending key order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate entries with key `>= pivot` in ascending order
    pub fn range_from<'a>(
        &'a self,
        pivot: &str,
    ) -> impl DoubleEndedIterator<Item = (&'a str, &'a str)> + 'a {
        self.entries
            .range::<str, _>((Bound::Included(pivot), Bound::Unbounded))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, returning them in key order
    pub fn clear(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }
}
