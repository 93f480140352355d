//! IndexManager: owns every declared index and keeps them in sync
//!
//! Every mutation of the primary table is followed by a call to
//! [`IndexManager::on_set`] or [`IndexManager::on_delete`], which updates
//! each index whose pattern covers the key.

use std::collections::BTreeMap;

use containerdb_core::{Comparator, Error, Extractor, Result};
use tracing::info;

use crate::index::Index;
use crate::table::PrimaryTable;

/// The set of declared indices, keyed by name
#[derive(Debug, Default, Clone)]
pub struct IndexManager {
    indices: BTreeMap<String, Index>,
}

impl IndexManager {
    /// Create a manager with no indices
    pub fn new() -> Self {
        Self {
            indices: BTreeMap::new(),
        }
    }

    /// Declare a new index and build it from the table
    ///
    /// The build scans every entry before returning, so no partially built
    /// index is ever observable.
    ///
    /// # Errors
    /// - `Error::InvalidIndexName` for the empty name
    /// - `Error::DuplicateIndex` if the name is already declared
    pub fn create(
        &mut self,
        name: &str,
        pattern: &str,
        extractor: Extractor,
        comparator: Comparator,
        table: &PrimaryTable,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidIndexName(name.to_string()));
        }
        if self.indices.contains_key(name) {
            return Err(Error::DuplicateIndex(name.to_string()));
        }

        let mut index = Index::new(name, pattern, extractor, comparator);
        index.build(table.iter());

        info!(
            target: "containerdb::index",
            name = %name,
            pattern = %pattern,
            comparator = %comparator,
            entries = index.len(),
            "Index created"
        );

        self.indices.insert(name.to_string(), index);
        Ok(())
    }

    /// Re-register a previously dropped index as is
    pub fn restore(&mut self, index: Index) {
        self.indices.insert(index.name().to_string(), index);
    }

    /// Remove an index
    ///
    /// # Errors
    /// `Error::IndexNotFound` if the name is not declared.
    pub fn drop_index(&mut self, name: &str) -> Result<Index> {
        let index = self
            .indices
            .remove(name)
            .ok_or_else(|| Error::IndexNotFound(name.to_string()))?;
        info!(target: "containerdb::index", name = %name, "Index dropped");
        Ok(index)
    }

    /// Look up an index by name
    ///
    /// # Errors
    /// `Error::IndexNotFound` if the name is not declared.
    pub fn get(&self, name: &str) -> Result<&Index> {
        self.indices
            .get(name)
            .ok_or_else(|| Error::IndexNotFound(name.to_string()))
    }

    /// Refresh `key` in every index covering it
    pub fn on_set(&mut self, key: &str, value: &str) {
        for index in self.indices.values_mut() {
            if index.covers(key) {
                index.insert(key, value);
            }
        }
    }

    /// Remove `key` from every index covering it
    pub fn on_delete(&mut self, key: &str) {
        for index in self.indices.values_mut() {
            if index.covers(key) {
                index.remove(key);
            }
        }
    }

    /// Empty every index, keeping the declarations
    pub fn clear_entries(&mut self) {
        for index in self.indices.values_mut() {
            index.clear();
        }
    }

    /// Remove every index
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Declared index names in ascending order
    pub fn names(&self) -> Vec<String> {
        self.indices.keys().cloned().collect()
    }

    /// Number of declared indices
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if no index is declared
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
