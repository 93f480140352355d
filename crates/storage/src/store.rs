//! Store: primary table plus its indices
//!
//! Every write goes through [`Store::set`] or [`Store::delete`], which
//! mutate the table and then route the change through the
//! [`IndexManager`]. Reads come back either in key order or in the order
//! of a named index.
//!
//! # Ordered reads
//!
//! The empty index name means primary key order. Any other name must be a
//! declared index. Values are always read from the table, never from the
//! index.

use containerdb_core::{matches, Comparator, Extractor, Result};

use crate::index::Index;
use crate::manager::IndexManager;
use crate::table::PrimaryTable;

/// Ordered `(key, value)` entries produced by an ascent or descent
///
/// Dropping the iterator early is the pull-style equivalent of a visitor
/// returning false.
pub struct Entries<'a> {
    inner: Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>,
}

impl<'a> Entries<'a> {
    fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = (&'a str, &'a str)> + 'a,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    fn from_keys<I>(keys: I, table: &'a PrimaryTable) -> Self
    where
        I: Iterator<Item = &'a str> + 'a,
    {
        Self::new(keys.filter_map(move |key| table.lookup(key).map(|value| (key, value))))
    }

    /// Feed entries to `visit` until it returns false
    pub fn visit<F>(self, mut visit: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (key, value) in self {
            if !visit(key, value) {
                break;
            }
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Primary table and index manager, kept consistent with each other
#[derive(Debug, Default, Clone)]
pub struct Store {
    table: PrimaryTable,
    indices: IndexManager,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            table: PrimaryTable::new(),
            indices: IndexManager::new(),
        }
    }

    // ========================================
    // Writes
    // ========================================

    /// Insert or overwrite an entry and refresh covering indices
    ///
    /// Returns the previous value, if any.
    pub fn set(&mut self, key: &str, value: &str) -> Option<String> {
        let previous = self.table.set(key.to_string(), value.to_string());
        self.indices.on_set(key, value);
        previous
    }

    /// Remove an entry and its index pairs
    ///
    /// # Errors
    /// `Error::KeyNotFound` if the key is absent.
    pub fn delete(&mut self, key: &str) -> Result<String> {
        let previous = self.table.delete(key)?;
        self.indices.on_delete(key);
        Ok(previous)
    }

    /// Put `key` back to an earlier state: `Some` value or absent
    pub fn restore(&mut self, key: &str, previous: Option<&str>) {
        match previous {
            Some(value) => {
                self.set(key, value);
            }
            None => {
                // Absent before; nothing to undo if it is absent now
                let _ = self.delete(key);
            }
        }
    }

    /// Remove every entry, keeping index declarations
    ///
    /// Returns the removed entries in key order.
    pub fn delete_all(&mut self) -> Vec<(String, String)> {
        self.indices.clear_entries();
        self.table.clear()
    }

    /// Drop all entries and all indices
    pub fn clear(&mut self) {
        self.table.clear();
        self.indices.clear();
    }

    // ========================================
    // Index declarations
    // ========================================

    /// Declare an index, building it from current entries
    pub fn create_index(
        &mut self,
        name: &str,
        pattern: &str,
        extractor: Extractor,
        comparator: Comparator,
    ) -> Result<()> {
        self.indices
            .create(name, pattern, extractor, comparator, &self.table)
    }

    /// Remove an index declaration
    pub fn drop_index(&mut self, name: &str) -> Result<Index> {
        self.indices.drop_index(name)
    }

    /// Re-register a dropped index
    ///
    /// The index is rebuilt, since entries may have changed since it was
    /// dropped.
    pub fn restore_index(&mut self, mut index: Index) {
        index.build(self.table.iter());
        self.indices.restore(index);
    }

    /// Declared index names in ascending order
    pub fn index_names(&self) -> Vec<String> {
        self.indices.names()
    }

    /// Look up a declared index
    pub fn index(&self, name: &str) -> Result<&Index> {
        self.indices.get(name)
    }

    /// Check that an index matches a from-scratch rebuild
    ///
    /// # Errors
    /// `Error::IndexNotFound` if the name is not declared.
    pub fn verify_index(&self, name: &str) -> Result<bool> {
        let index = self.indices.get(name)?;
        let mut rebuilt = index.empty_copy();
        rebuilt.build(self.table.iter());
        Ok(index.pairs().eq(rebuilt.pairs()))
    }

    // ========================================
    // Reads
    // ========================================

    /// Get the value for a key
    ///
    /// # Errors
    /// `Error::KeyNotFound` if the key is absent.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.table.get(key)
    }

    /// Get the value for a key without failing
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.table.lookup(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the store has no entries
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries in ascending order of `index` (key order for `""`)
    ///
    /// # Errors
    /// `Error::IndexNotFound` if a non-empty name is not declared.
    pub fn iter(&self, index: &str) -> Result<Entries<'_>> {
        if index.is_empty() {
            return Ok(Entries::new(self.table.iter()));
        }
        let index = self.indices.get(index)?;
        Ok(Entries::from_keys(index.keys(), &self.table))
    }

    /// Entries in descending order of `index` (key order for `""`)
    pub fn iter_rev(&self, index: &str) -> Result<Entries<'_>> {
        if index.is_empty() {
            return Ok(Entries::new(self.table.iter().rev()));
        }
        let index = self.indices.get(index)?;
        Ok(Entries::from_keys(index.keys().rev(), &self.table))
    }

    /// Entries at or after `pivot` in ascending order of `index`
    ///
    /// For key order the pivot is a key; for an index it is a value that
    /// goes through the index comparator.
    pub fn iter_from(&self, index: &str, pivot: &str) -> Result<Entries<'_>> {
        if index.is_empty() {
            return Ok(Entries::new(self.table.range_from(pivot)));
        }
        let index = self.indices.get(index)?;
        Ok(Entries::from_keys(index.keys_from(index.pivot(pivot)), &self.table))
    }

    /// Entries whose key matches the glob `pattern`, in key order
    pub fn iter_keys<'a>(&'a self, pattern: &'a str) -> Entries<'a> {
        Entries::new(self.table.iter().filter(move |(key, _)| matches(pattern, key)))
    }

    /// Visit entries in ascending order of `index` until `visit` returns false
    pub fn ascend<F>(&self, index: &str, visit: F) -> Result<()>
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.iter(index)?.visit(visit);
        Ok(())
    }

    /// Access the primary table
    pub fn table(&self) -> &PrimaryTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containerdb_core::{index_json, Error};

    fn store_with_sizes() -> Store {
        let mut store = Store::new();
        store
            .create_index("size", "*", index_json("size"), Comparator::Lexical)
            .unwrap();
        store.set("a", r#"{"size":5}"#);
        store.set("b", r#"{"size":2}"#);
        store.set("c", r#"{"size":9}"#);
        store
    }

    fn collect_keys(entries: Entries<'_>) -> Vec<String> {
        entries.map(|(k, _)| k.to_string()).collect()
    }

    #[test]
    fn test_ascend_by_index() {
        let store = store_with_sizes();
        let mut seen = Vec::new();
        store
            .ascend("size", |k, _| {
                seen.push(k.to_string());
                true
            })
            .unwrap();
        assert_eq!(seen, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ascend_empty_name_is_key_order() {
        let store = store_with_sizes();
        assert_eq!(collect_keys(store.iter("").unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ascend_unknown_index() {
        let store = store_with_sizes();
        let err = store.ascend("hash", |_, _| true).unwrap_err();
        assert_eq!(err, Error::IndexNotFound("hash".into()));
    }

    #[test]
    fn test_ascend_returns_current_values() {
        let mut store = store_with_sizes();
        store.set("a", r#"{"size":1}"#);
        let first = store.iter("size").unwrap().next().unwrap();
        assert_eq!(first, ("a", r#"{"size":1}"#));
    }

    #[test]
    fn test_delete_removes_index_pair() {
        let mut store = store_with_sizes();
        assert_eq!(store.delete("b").unwrap(), r#"{"size":2}"#);
        assert_eq!(collect_keys(store.iter("size").unwrap()), vec!["a", "c"]);
        assert!(matches!(store.delete("b"), Err(Error::KeyNotFound(_))));
    }

    #[test]
    fn test_restore() {
        let mut store = store_with_sizes();
        store.set("d", r#"{"size":0}"#);
        store.restore("d", None);
        store.restore("a", Some(r#"{"size":7}"#));
        assert_eq!(collect_keys(store.iter("size").unwrap()), vec!["b", "a", "c"]);
        assert_eq!(store.get("a").unwrap(), r#"{"size":7}"#);
        assert!(store.lookup("d").is_none());
    }

    #[test]
    fn test_descend_and_pivot() {
        let store = store_with_sizes();
        assert_eq!(collect_keys(store.iter_rev("size").unwrap()), vec!["c", "a", "b"]);
        assert_eq!(collect_keys(store.iter_rev("").unwrap()), vec!["c", "b", "a"]);
        assert_eq!(collect_keys(store.iter_from("size", "5").unwrap()), vec!["a", "c"]);
        assert_eq!(collect_keys(store.iter_from("", "b").unwrap()), vec!["b", "c"]);
    }

    #[test]
    fn test_iter_keys_pattern() {
        let mut store = Store::new();
        store.set("img:1", "{}");
        store.set("doc:1", "{}");
        store.set("img:2", "{}");
        assert_eq!(collect_keys(store.iter_keys("img:*")), vec!["img:1", "img:2"]);
    }

    #[test]
    fn test_delete_all_keeps_declarations() {
        let mut store = store_with_sizes();
        let removed = store.delete_all();
        assert_eq!(removed.len(), 3);
        assert!(store.is_empty());
        assert_eq!(store.index_names(), vec!["size"]);
        assert!(store.index("size").unwrap().is_empty());
    }

    #[test]
    fn test_index_on_populated_store_verifies() {
        let mut store = Store::new();
        store.set("x", r#"{"name":"b"}"#);
        store.set("y", r#"{"name":"a"}"#);
        store
            .create_index("name", "*", index_json("name"), Comparator::Lexical)
            .unwrap();
        store.set("z", r#"{"name":"c"}"#);
        store.delete("x").unwrap();
        assert!(store.verify_index("name").unwrap());
        assert_eq!(collect_keys(store.iter("name").unwrap()), vec!["y", "z"]);
    }

    #[test]
    fn test_restore_index_rebuilds() {
        let mut store = store_with_sizes();
        let dropped = store.drop_index("size").unwrap();
        store.set("d", r#"{"size":0}"#);
        store.restore_index(dropped);
        assert!(store.verify_index("size").unwrap());
        assert_eq!(store.index("size").unwrap().len(), 4);
    }

    #[test]
    fn test_early_stop_visits_one() {
        let store = store_with_sizes();
        let mut visits = 0;
        store
            .ascend("size", |_, _| {
                visits += 1;
                false
            })
            .unwrap();
        assert_eq!(visits, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Incremental maintenance always equals a rebuild
            #[test]
            fn indices_match_rebuild(
                ops in prop::collection::vec(("[a-d]{1,2}", prop::option::of(0u32..20)), 0..40)
            ) {
                let mut store = Store::new();
                store.create_index("lex", "*", index_json("n"), Comparator::Lexical).unwrap();
                store.create_index("num", "a*", index_json("n"), Comparator::Numeric).unwrap();
                for (key, value) in &ops {
                    match value {
                        Some(n) => {
                            store.set(key, &format!(r#"{{"n":{}}}"#, n));
                        }
                        None => {
                            let _ = store.delete(key);
                        }
                    }
                }
                prop_assert!(store.verify_index("lex").unwrap());
                prop_assert!(store.verify_index("num").unwrap());
                prop_assert_eq!(store.iter("lex").unwrap().count(), store.len());
            }
        }
    }
}
