//! Transaction handle for read-write and read-only units of work
//!
//! A [`Transaction`] wraps a locked [`Store`] for the duration of one
//! `update` or `view` call. The engine acquires the lock, builds the
//! handle and hands it to [`Transaction::execute`], which runs the
//! caller's closure and then either commits or rolls back. The closure
//! only ever sees `&mut Transaction`, so it cannot end the transaction
//! itself.
//!
//! # Rollback
//!
//! Read-write transactions apply mutations to the store in place and
//! record an undo entry for each one before touching the store: the key
//! and the value it held before, or the index definition that was
//! dropped. A mutation interrupted by a panic (for example inside an
//! extractor) is therefore still undone. Rolling back replays
//! the undo log in reverse through the store's normal write path, which
//! restores the table and every index to their pre-transaction state.
//! Because the store is exclusively locked for the whole transaction, no
//! other caller ever sees a mutation before commit.
//!
//! A transaction dropped while still `Active` (for example while a panic
//! unwinds out of the closure) rolls itself back.
//!
//! # Lifecycle
//!
//! 1. **BEGIN**: `Transaction::read_write` or `Transaction::read_only`, status `Active`
//! 2. **WORK**: `execute` runs the closure: `get`, `set`, `delete`, `ascend`, ...
//! 3. **END**: `Ok` → `Committed`, `Err` → `RolledBack`

use containerdb_core::{Comparator, Error, Extractor, MissingKeyPolicy, Result};
use containerdb_storage::{Entries, Index, Store};
use tracing::{debug, trace};

/// Status of a transaction in its lifecycle
///
/// State transitions:
/// - `Active` → `Committed`
/// - `Active` → `RolledBack`
///
/// Terminal states admit no further operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing
    Active,
    /// Mutations were kept
    Committed,
    /// Mutations were undone
    RolledBack {
        /// Human-readable reason for the rollback
        reason: String,
    },
}

/// A recorded inverse of one mutation
#[derive(Debug)]
enum UndoEntry {
    /// Key held `previous` (or was absent) before a set/delete
    Entry {
        key: String,
        previous: Option<String>,
    },
    /// Every entry removed by `delete_all`
    Cleared(Vec<(String, String)>),
    /// Index was created by this transaction
    IndexCreated(String),
    /// Index was dropped by this transaction
    IndexDropped(Index),
}

/// Summary of mutations that would be undone on rollback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingOperations {
    /// Number of set operations
    pub sets: usize,
    /// Number of delete operations
    pub deletes: usize,
    /// Number of index creations and drops
    pub index_changes: usize,
}

impl PendingOperations {
    /// Total number of pending operations
    pub fn total(&self) -> usize {
        self.sets + self.deletes + self.index_changes
    }

    /// Check if there are no pending operations
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

enum Access<'a> {
    ReadOnly(&'a Store),
    ReadWrite(&'a mut Store),
}

/// Handle passed to `update` and `view` closures
pub struct Transaction<'a> {
    /// Unique transaction ID
    txn_id: u64,
    access: Access<'a>,
    undo_log: Vec<UndoEntry>,
    pending: PendingOperations,
    missing_key: MissingKeyPolicy,
    status: TransactionStatus,
}

impl<'a> Transaction<'a> {
    /// Begin a read-write transaction over an exclusively locked store
    pub fn read_write(txn_id: u64, store: &'a mut Store, missing_key: MissingKeyPolicy) -> Self {
        Self {
            txn_id,
            access: Access::ReadWrite(store),
            undo_log: Vec::new(),
            pending: PendingOperations::default(),
            missing_key,
            status: TransactionStatus::Active,
        }
    }

    /// Begin a read-only transaction over a shared store
    pub fn read_only(txn_id: u64, store: &'a Store) -> Self {
        Self {
            txn_id,
            access: Access::ReadOnly(store),
            undo_log: Vec::new(),
            pending: PendingOperations::default(),
            missing_key: MissingKeyPolicy::default(),
            status: TransactionStatus::Active,
        }
    }

    fn store(&self) -> &Store {
        match &self.access {
            Access::ReadOnly(store) => *store,
            Access::ReadWrite(store) => &**store,
        }
    }

    fn store_mut(&mut self) -> Result<&mut Store> {
        match &mut self.access {
            Access::ReadOnly(_) => Err(Error::ReadOnlyViolation),
            Access::ReadWrite(store) => Ok(&mut **store),
        }
    }

    // === Identity & State ===

    /// Transaction ID
    pub fn txn_id(&self) -> u64 {
        self.txn_id
    }

    /// Current status
    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    /// Whether this transaction may mutate the store
    pub fn is_writable(&self) -> bool {
        matches!(self.access, Access::ReadWrite(_))
    }

    /// Check if transaction is in Active state
    pub fn is_active(&self) -> bool {
        matches!(self.status, TransactionStatus::Active)
    }

    /// Counts of mutations recorded so far
    pub fn pending_operations(&self) -> PendingOperations {
        self.pending
    }

    // === Read Operations ===

    /// Get the value stored under `key`
    ///
    /// Sees this transaction's own writes.
    ///
    /// # Errors
    /// `Error::KeyNotFound` if the key is absent.
    pub fn get(&self, key: &str) -> Result<String> {
        self.store().get(key).map(str::to_string)
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.store().len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    /// Declared index names in ascending order
    pub fn indexes(&self) -> Vec<String> {
        self.store().index_names()
    }

    /// Compare `index` against a from-scratch rebuild over the current table
    ///
    /// # Errors
    /// `Error::IndexNotFound` if no index has that name.
    pub fn verify_index(&self, index: &str) -> Result<bool> {
        self.store().verify_index(index)
    }

    /// Pull-style ascent over `index` (key order for `""`)
    ///
    /// # Errors
    /// `Error::IndexNotFound` if a non-empty name is not declared.
    pub fn iter(&self, index: &str) -> Result<Entries<'_>> {
        self.store().iter(index)
    }

    /// Visit entries in ascending order of `index` until `visit` returns false
    ///
    /// The empty name visits in key order. Values are read from the table.
    ///
    /// # Errors
    /// `Error::IndexNotFound` if a non-empty name is not declared.
    pub fn ascend<F>(&self, index: &str, visit: F) -> Result<()>
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.store().iter(index)?.visit(visit);
        Ok(())
    }

    /// Visit entries in descending order of `index` until `visit` returns false
    pub fn descend<F>(&self, index: &str, visit: F) -> Result<()>
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.store().iter_rev(index)?.visit(visit);
        Ok(())
    }

    /// Visit entries at or after `pivot` in ascending order of `index`
    ///
    /// The pivot is a key for key order and an index value otherwise.
    pub fn ascend_greater_or_equal<F>(&self, index: &str, pivot: &str, visit: F) -> Result<()>
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.store().iter_from(index, pivot)?.visit(visit);
        Ok(())
    }

    /// Visit entries whose key matches the glob `pattern`, in key order
    pub fn ascend_keys<F>(&self, pattern: &str, visit: F) -> Result<()>
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.store().iter_keys(pattern).visit(visit);
        Ok(())
    }

    // === Write Operations ===

    /// Insert or overwrite an entry
    ///
    /// Returns the previous value; `Some` means the key existed.
    ///
    /// # Errors
    /// `Error::ReadOnlyViolation` inside a read-only transaction.
    pub fn set(&mut self, key: &str, value: &str) -> Result<Option<String>> {
        self.ensure_writable()?;
        let previous = self.store().lookup(key).map(str::to_string);
        self.undo_log.push(UndoEntry::Entry {
            key: key.to_string(),
            previous: previous.clone(),
        });
        self.store_mut()?.set(key, value);
        trace!(target: "containerdb::txn", txn_id = self.txn_id, key = %key, "set");
        self.pending.sets += 1;
        Ok(previous)
    }

    /// Remove an entry
    ///
    /// Returns the removed value. When the key is absent the outcome
    /// depends on the missing-key policy: `Error::KeyNotFound`, or
    /// `Ok(None)`.
    ///
    /// # Errors
    /// - `Error::ReadOnlyViolation` inside a read-only transaction
    /// - `Error::KeyNotFound` for an absent key under `MissingKeyPolicy::Error`
    pub fn delete(&mut self, key: &str) -> Result<Option<String>> {
        self.ensure_writable()?;
        let previous = match self.store().lookup(key) {
            Some(previous) => previous.to_string(),
            None if self.missing_key == MissingKeyPolicy::Ignore => return Ok(None),
            None => return Err(Error::KeyNotFound(key.to_string())),
        };
        self.undo_log.push(UndoEntry::Entry {
            key: key.to_string(),
            previous: Some(previous.clone()),
        });
        self.store_mut()?.delete(key)?;
        trace!(target: "containerdb::txn", txn_id = self.txn_id, key = %key, "delete");
        self.pending.deletes += 1;
        Ok(Some(previous))
    }

    /// Remove every entry, keeping index declarations
    ///
    /// Returns the number of entries removed.
    pub fn delete_all(&mut self) -> Result<usize> {
        self.ensure_active()?;
        let removed = self.store_mut()?.delete_all();
        let count = removed.len();
        self.undo_log.push(UndoEntry::Cleared(removed));
        self.pending.deletes += count;
        Ok(count)
    }

    /// Declare an index inside this transaction
    ///
    /// Undone on rollback like any other mutation.
    ///
    /// # Errors
    /// `Error::DuplicateIndex`, `Error::InvalidIndexName` or
    /// `Error::ReadOnlyViolation`.
    pub fn create_index(
        &mut self,
        name: &str,
        pattern: &str,
        extractor: Extractor,
        comparator: Comparator,
    ) -> Result<()> {
        self.ensure_active()?;
        self.store_mut()?
            .create_index(name, pattern, extractor, comparator)?;
        self.undo_log.push(UndoEntry::IndexCreated(name.to_string()));
        self.pending.index_changes += 1;
        Ok(())
    }

    /// Drop an index inside this transaction
    ///
    /// # Errors
    /// `Error::IndexNotFound` or `Error::ReadOnlyViolation`.
    pub fn drop_index(&mut self, name: &str) -> Result<()> {
        self.ensure_active()?;
        let index = self.store_mut()?.drop_index(name)?;
        self.undo_log.push(UndoEntry::IndexDropped(index));
        self.pending.index_changes += 1;
        Ok(())
    }

    // === Completion ===

    /// Active and read-write, checked before any undo entry is recorded
    fn ensure_writable(&self) -> Result<()> {
        self.ensure_active()?;
        if self.is_writable() {
            Ok(())
        } else {
            Err(Error::ReadOnlyViolation)
        }
    }

    /// Check if transaction can accept operations
    ///
    /// # Errors
    /// `Error::Aborted` once the transaction has ended.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::Aborted(format!(
                "transaction {} is not active: {:?}",
                self.txn_id, self.status
            )))
        }
    }

    /// Run `f` against this transaction, then commit on `Ok` or roll back on `Err`
    ///
    /// The closure receives `&mut Transaction` and so cannot commit or roll
    /// back on its own; every `Err` undoes every mutation it made.
    ///
    /// ```compile_fail
    /// # use containerdb_concurrency::Transaction;
    /// # use containerdb_core::{Error, MissingKeyPolicy};
    /// # use containerdb_storage::Store;
    /// let mut store = Store::new();
    /// let txn = Transaction::read_write(1, &mut store, MissingKeyPolicy::Error);
    /// let _ = txn.execute(|txn| {
    ///     txn.set("k", "v")?;
    ///     txn.commit();
    ///     Err::<(), _>(Error::aborted("too late"))
    /// });
    /// ```
    pub fn execute<F, T>(mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'a>) -> Result<T>,
    {
        match f(&mut self) {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(e) => {
                self.rollback(e.to_string());
                Err(e)
            }
        }
    }

    /// Keep all mutations
    fn commit(&mut self) {
        if !self.is_active() {
            return;
        }
        debug!(
            target: "containerdb::txn",
            txn_id = self.txn_id,
            operations = self.pending.total(),
            "Transaction committed"
        );
        self.undo_log.clear();
        self.status = TransactionStatus::Committed;
    }

    /// Undo all mutations, newest first
    fn rollback(&mut self, reason: impl Into<String>) {
        if !self.is_active() {
            return;
        }
        let reason = reason.into();
        let undo_log = std::mem::take(&mut self.undo_log);
        if let Access::ReadWrite(store) = &mut self.access {
            for entry in undo_log.into_iter().rev() {
                match entry {
                    UndoEntry::Entry { key, previous } => store.restore(&key, previous.as_deref()),
                    UndoEntry::Cleared(entries) => {
                        for (key, value) in &entries {
                            store.set(key, value);
                        }
                    }
                    UndoEntry::IndexCreated(name) => {
                        let _ = store.drop_index(&name);
                    }
                    UndoEntry::IndexDropped(index) => store.restore_index(index),
                }
            }
        }
        debug!(
            target: "containerdb::txn",
            txn_id = self.txn_id,
            operations = self.pending.total(),
            reason = %reason,
            "Transaction rolled back"
        );
        self.status = TransactionStatus::RolledBack { reason };
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.is_active() && !self.undo_log.is_empty() {
            self.rollback("transaction dropped while active");
        }
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("txn_id", &self.txn_id)
            .field("writable", &self.is_writable())
            .field("status", &self.status)
            .field("pending", &self.pending)
            .finish()
    }
}
