//! Database handle and open/close logic
//!
//! A [`Database`] owns one [`Store`] behind a `parking_lot::RwLock`. There
//! is no global instance: every caller opens its own handle and shares it
//! across threads with `Arc`.
//!
//! ## Transaction API
//!
//! - `db.update(|txn| { ... })` takes the write lock. Mutations are kept
//!   when the closure returns `Ok` and undone when it returns `Err`.
//! - `db.view(|txn| { ... })` takes the read lock. Mutations fail with
//!   `Error::ReadOnlyViolation`.
//!
//! Index management (`create_index`, `drop_index`) runs as a one-shot
//! `update` and therefore waits for in-flight transactions like any writer.

pub mod config;
mod transactions;

pub use config::{DatabaseConfig, CONFIG_FILE_NAME};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use containerdb_concurrency::TransactionGuard;
use containerdb_core::{Comparator, Error, Extractor, Result};
use containerdb_storage::Store;
use parking_lot::RwLock;
use tracing::info;

use crate::coordinator::{TransactionCoordinator, TransactionMetrics};

/// Source of per-process database ids, used for nested transaction detection
static NEXT_DATABASE_ID: AtomicU64 = AtomicU64::new(1);

/// In-memory key/value database with secondary indices
pub struct Database {
    id: u64,
    store: RwLock<Store>,
    config: DatabaseConfig,
    coordinator: TransactionCoordinator,
    closed: AtomicBool,
}

impl Database {
    /// Open an empty database with default configuration
    pub fn open() -> Self {
        Self::open_with_config(DatabaseConfig::default())
    }

    /// Open an empty database with the given configuration
    pub fn open_with_config(config: DatabaseConfig) -> Self {
        let id = NEXT_DATABASE_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            target: "containerdb::db",
            db_id = id,
            missing_key = %config.missing_key,
            default_comparator = %config.default_comparator,
            "Database opened"
        );
        Self {
            id,
            store: RwLock::new(Store::new()),
            config,
            coordinator: TransactionCoordinator::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Release all entries and indices
    ///
    /// Waits for in-flight transactions to finish. Every later call on this
    /// handle, including another `close`, returns `Error::DatabaseClosed`.
    ///
    /// # Errors
    /// - `Error::TransactionInProgress` when called from inside a transaction
    ///   on this database
    /// - `Error::DatabaseClosed` if already closed
    pub fn close(&self) -> Result<()> {
        if TransactionGuard::is_active(self.id) {
            return Err(Error::TransactionInProgress);
        }
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(Error::DatabaseClosed);
        }
        let mut store = self.store.write();
        let entries = store.len();
        store.clear();
        info!(target: "containerdb::db", db_id = self.id, entries, "Database closed");
        Ok(())
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::DatabaseClosed)
        } else {
            Ok(())
        }
    }

    /// Configuration this database was opened with
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Transaction statistics since open
    pub fn metrics(&self) -> TransactionMetrics {
        self.coordinator.metrics()
    }

    // ========================================================================
    // Index management
    // ========================================================================

    /// Declare an index ordered by the configured default comparator
    ///
    /// The index covers keys matching the glob `pattern` and orders them by
    /// `extractor(value)`. Existing matching entries are indexed immediately.
    ///
    /// # Errors
    /// `Error::DuplicateIndex` if `name` is already declared,
    /// `Error::InvalidIndexName` for an empty name.
    pub fn create_index(&self, name: &str, pattern: &str, extractor: Extractor) -> Result<()> {
        self.create_index_with(name, pattern, extractor, self.config.default_comparator)
    }

    /// Declare an index with an explicit comparator
    pub fn create_index_with(
        &self,
        name: &str,
        pattern: &str,
        extractor: Extractor,
        comparator: Comparator,
    ) -> Result<()> {
        self.update(|txn| txn.create_index(name, pattern, extractor, comparator))
    }

    /// Remove an index declaration
    ///
    /// # Errors
    /// `Error::IndexNotFound` if no index has that name.
    pub fn drop_index(&self, name: &str) -> Result<()> {
        self.update(|txn| txn.drop_index(name))
    }

    /// Declared index names in ascending order
    pub fn indexes(&self) -> Result<Vec<String>> {
        self.view(|txn| Ok(txn.indexes()))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}
