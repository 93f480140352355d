//! Secondary indices ordered by an extracted value
//!
//! An [`Index`] covers every table key matching its glob pattern and keeps
//! one `(SortKey, key)` pair per covered entry. The pair order is the
//! comparator order of the extracted value, with the key breaking ties.
//!
//! Only the pair is stored, never a copy of the value: readers re-fetch
//! the value from the table, so an index cannot serve stale content.
//! A reverse map `key → SortKey` lets a stale pair be found and removed
//! without re-running the extractor on the old value.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Bound;

use containerdb_core::{matches, Comparator, Extractor, SortKey};
use tracing::warn;

/// Named, ordered secondary index over a subset of keys
#[derive(Clone)]
pub struct Index {
    name: String,
    pattern: String,
    extractor: Extractor,
    comparator: Comparator,
    /// Ordered pairs, the index proper
    entries: BTreeSet<(SortKey, String)>,
    /// Current sort key of every covered key
    by_key: HashMap<String, SortKey>,
}

impl Index {
    /// Create a new empty index
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        extractor: Extractor,
        comparator: Comparator,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            extractor,
            comparator,
            entries: BTreeSet::new(),
            by_key: HashMap::new(),
        }
    }

    /// Index name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Glob pattern selecting covered keys
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Comparator applied to extracted values
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Whether this index covers `key`
    pub fn covers(&self, key: &str) -> bool {
        matches(&self.pattern, key)
    }

    /// Compute the sort key for a value
    ///
    /// A failing extractor indexes the entry under the empty string so a
    /// single malformed document never blocks the rest of the index.
    pub fn sort_key(&self, key: &str, value: &str) -> SortKey {
        let extracted = match self.extractor.extract(value) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(
                    target: "containerdb::index",
                    index = %self.name,
                    key = %key,
                    error = %e,
                    "Extractor failed, indexing as empty value"
                );
                String::new()
            }
        };
        self.comparator.sort_key(extracted)
    }

    /// Sort key for a caller-supplied pivot value
    pub fn pivot(&self, value: &str) -> SortKey {
        self.comparator.sort_key(value.to_string())
    }

    /// Insert or refresh the pair for `key`
    ///
    /// Any stale pair for the same key is removed first. Callers check
    /// [`Index::covers`] beforehand.
    pub fn insert(&mut self, key: &str, value: &str) {
        let sort_key = self.sort_key(key, value);
        if let Some(stale) = self.by_key.insert(key.to_string(), sort_key.clone()) {
            self.entries.remove(&(stale, key.to_string()));
        }
        self.entries.insert((sort_key, key.to_string()));
    }

    /// Remove the pair for `key`, if present
    pub fn remove(&mut self, key: &str) {
        if let Some(stale) = self.by_key.remove(key) {
            self.entries.remove(&(stale, key.to_string()));
        }
    }

    /// Remove every pair
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_key.clear();
    }

    /// Rebuild from scratch over the given entries
    ///
    /// Only entries whose key is covered are inserted.
    pub fn build<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.clear();
        for (key, value) in entries {
            if self.covers(key) {
                self.insert(key, value);
            }
        }
    }

    /// Covered keys in index order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.entries.iter().map(|(_, key)| key.as_str())
    }

    /// Covered keys whose sort key is `>= pivot`, in index order
    pub fn keys_from<'a>(&'a self, pivot: SortKey) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .range((Bound::Included((pivot, String::new())), Bound::Unbounded))
            .map(|(_, key)| key.as_str())
    }

    /// Ordered `(SortKey, key)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = &(SortKey, String)> + '_ {
        self.entries.iter()
    }

    /// Sort key currently recorded for `key`
    pub fn get(&self, key: &str) -> Option<&SortKey> {
        self.by_key.get(key)
    }

    /// Number of covered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index covers no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A fresh, empty index with the same definition
    pub fn empty_copy(&self) -> Self {
        Self::new(
            self.name.clone(),
            self.pattern.clone(),
            self.extractor.clone(),
            self.comparator,
        )
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("comparator", &self.comparator)
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containerdb_core::{index_json, Error, Result};
    use std::sync::Arc;

    fn size_index(comparator: Comparator) -> Index {
        Index::new("size", "*", index_json("size"), comparator)
    }

    fn keys(index: &Index) -> Vec<&str> {
        index.keys().collect()
    }

    #[test]
    fn test_insert_orders_by_extracted_value() {
        let mut index = size_index(Comparator::Lexical);
        index.insert("a", r#"{"size":5}"#);
        index.insert("b", r#"{"size":2}"#);
        index.insert("c", r#"{"size":9}"#);
        assert_eq!(keys(&index), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ties_broken_by_key() {
        let mut index = size_index(Comparator::Lexical);
        index.insert("z", r#"{"size":1}"#);
        index.insert("m", r#"{"size":1}"#);
        index.insert("a", r#"{"size":1}"#);
        assert_eq!(keys(&index), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_reinsert_removes_stale_pair() {
        let mut index = size_index(Comparator::Lexical);
        index.insert("a", r#"{"size":1}"#);
        index.insert("b", r#"{"size":2}"#);
        index.insert("a", r#"{"size":3}"#);
        assert_eq!(index.len(), 2);
        assert_eq!(keys(&index), vec!["b", "a"]);
        assert_eq!(index.get("a"), Some(&SortKey::Text("3".into())));
    }

    #[test]
    fn test_remove() {
        let mut index = size_index(Comparator::Lexical);
        index.insert("a", r#"{"size":1}"#);
        index.remove("a");
        index.remove("never-there");
        assert!(index.is_empty());
        assert_eq!(index.get("a"), None);
    }

    #[test]
    fn test_lexical_vs_numeric() {
        let mut lexical = size_index(Comparator::Lexical);
        let mut numeric = size_index(Comparator::Numeric);
        for (k, v) in [("a", r#"{"size":10}"#), ("b", r#"{"size":2}"#)] {
            lexical.insert(k, v);
            numeric.insert(k, v);
        }
        assert_eq!(keys(&lexical), vec!["a", "b"]);
        assert_eq!(keys(&numeric), vec!["b", "a"]);
    }

    #[test]
    fn test_extractor_failure_indexes_empty() {
        let mut index = size_index(Comparator::Lexical);
        index.insert("good", r#"{"size":1}"#);
        index.insert("bad", "not json");
        assert_eq!(keys(&index), vec!["bad", "good"]);
        assert_eq!(index.get("bad"), Some(&SortKey::Text(String::new())));
    }

    #[test]
    fn test_custom_extractor() {
        let failing = |_: &str| -> Result<String> { Err(Error::ExtractorFailure("nope".into())) };
        let mut index = Index::new("broken", "*", Arc::new(failing), Comparator::Lexical);
        index.insert("a", "anything");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_build_respects_pattern() {
        let mut index = Index::new("size", "img:*", index_json("size"), Comparator::Lexical);
        index.build(vec![
            ("doc:1", r#"{"size":1}"#),
            ("img:1", r#"{"size":3}"#),
            ("img:2", r#"{"size":2}"#),
        ]);
        assert_eq!(keys(&index), vec!["img:2", "img:1"]);
    }

    #[test]
    fn test_keys_from_pivot() {
        let mut index = size_index(Comparator::Numeric);
        for (k, v) in [("a", r#"{"size":1}"#), ("b", r#"{"size":5}"#), ("c", r#"{"size":9}"#)] {
            index.insert(k, v);
        }
        let from: Vec<&str> = index.keys_from(index.pivot("5")).collect();
        assert_eq!(from, vec!["b", "c"]);
        let from: Vec<&str> = index.keys_from(index.pivot("6")).collect();
        assert_eq!(from, vec!["c"]);
    }

    #[test]
    fn test_empty_copy_keeps_definition() {
        let mut index = Index::new("size", "img:*", index_json("size"), Comparator::Numeric);
        index.insert("img:1", r#"{"size":1}"#);
        let copy = index.empty_copy();
        assert!(copy.is_empty());
        assert_eq!(copy.name(), "size");
        assert_eq!(copy.pattern(), "img:*");
        assert_eq!(copy.comparator(), Comparator::Numeric);
    }
}
