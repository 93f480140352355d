//! Closure-based transaction execution
//!
//! Both entry points follow the same sequence:
//! 1. Register the transaction on this thread (refuses nesting)
//! 2. Acquire the store lock
//! 3. Run the closure through [`Transaction::execute`], which commits on
//!    `Ok` and rolls back on `Err`
//! 4. Record the outcome with the coordinator
//!
//! Step 1 happens before step 2 so that a nested call fails instead of
//! deadlocking on the lock its own thread already holds.

use containerdb_concurrency::{Transaction, TransactionGuard};
use containerdb_core::Result;

use super::Database;
use crate::coordinator::TransactionCoordinator;

/// Records an abort for a transaction that never reached `finish`
///
/// Covers closures that panic: the `Transaction` rolls itself back on drop
/// and this keeps the coordinator's active count honest.
struct Attempt<'a> {
    coordinator: &'a TransactionCoordinator,
    txn_id: u64,
    finished: bool,
}

impl<'a> Attempt<'a> {
    fn start(coordinator: &'a TransactionCoordinator, writable: bool) -> Self {
        Self {
            coordinator,
            txn_id: coordinator.start_transaction(writable),
            finished: false,
        }
    }

    fn finish<T>(mut self, result: Result<T>) -> Result<T> {
        self.finished = true;
        match &result {
            Ok(_) => self.coordinator.record_commit(),
            Err(e) => self.coordinator.record_abort(self.txn_id, &e.to_string()),
        }
        result
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.coordinator
                .record_abort(self.txn_id, "transaction closure panicked");
        }
    }
}

impl Database {
    /// Run `f` as an exclusive read-write transaction
    ///
    /// The closure sees its own writes. If it returns `Err`, every mutation
    /// it made (entries, index contents, index declarations) is undone and
    /// the error is returned unchanged.
    ///
    /// # Errors
    /// - `Error::TransactionInProgress` when called from inside another
    ///   transaction on this database
    /// - `Error::DatabaseClosed` after `close`
    /// - whatever `f` returns
    ///
    /// # Example
    /// ```
    /// use containerdb_engine::Database;
    ///
    /// let db = Database::open();
    /// let existed = db.update(|txn| Ok(txn.set("f1.txt", "{}")?.is_some())).unwrap();
    /// assert!(!existed);
    /// ```
    pub fn update<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let _guard = TransactionGuard::enter(self.id)?;
        self.check_open()?;
        let mut store = self.store.write();
        // close may have won the race for the lock
        self.check_open()?;

        let attempt = Attempt::start(&self.coordinator, true);
        let txn = Transaction::read_write(attempt.txn_id, &mut *store, self.config.missing_key);
        attempt.finish(txn.execute(f))
    }

    /// Run `f` as a shared read-only transaction
    ///
    /// Many `view` calls may run at once; none of them overlaps an `update`.
    ///
    /// # Errors
    /// - `Error::TransactionInProgress` when called from inside another
    ///   transaction on this database
    /// - `Error::DatabaseClosed` after `close`
    /// - `Error::ReadOnlyViolation` if `f` tries to mutate and propagates it
    /// - whatever else `f` returns
    pub fn view<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let _guard = TransactionGuard::enter(self.id)?;
        self.check_open()?;
        let store = self.store.read();
        self.check_open()?;

        let attempt = Attempt::start(&self.coordinator, false);
        let txn = Transaction::read_only(attempt.txn_id, &store);
        attempt.finish(txn.execute(f))
    }
}

#[cfg(test)]
mod tests {
    use containerdb_concurrency::TransactionStatus;
    use containerdb_core::{index_json, Error};

    use super::*;

    #[test]
    fn test_update_commits_on_ok() {
        let db = Database::open();
        let previous = db.update(|txn| txn.set("k", "v1")).unwrap();
        assert_eq!(previous, None);
        let previous = db.update(|txn| txn.set("k", "v2")).unwrap();
        assert_eq!(previous.as_deref(), Some("v1"));
        assert_eq!(db.view(|txn| txn.get("k")).unwrap(), "v2");
    }

    #[test]
    fn test_update_rolls_back_on_err() {
        let db = Database::open();
        db.create_index("size", "*", index_json("size")).unwrap();
        db.update(|txn| txn.set("a", r#"{"size":1}"#).map(|_| ())).unwrap();

        let err = db
            .update(|txn| {
                txn.set("a", r#"{"size":7}"#)?;
                txn.set("b", r#"{"size":3}"#)?;
                Err::<(), _>(Error::aborted("changed my mind"))
            })
            .unwrap_err();
        assert_eq!(err, Error::Aborted("changed my mind".into()));

        db.view(|txn| {
            assert_eq!(txn.get("a")?, r#"{"size":1}"#);
            assert!(txn.get("b").unwrap_err().is_not_found());
            assert!(txn.verify_index("size")?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_view_rejects_mutation() {
        let db = Database::open();
        let err = db.view(|txn| txn.set("k", "v")).unwrap_err();
        assert_eq!(err, Error::ReadOnlyViolation);
        assert!(db.view(|txn| Ok(txn.is_empty())).unwrap());
    }

    #[test]
    fn test_nested_calls_refused() {
        let db = Database::open();
        let err = db.update(|_| db.view(|_| Ok(()))).unwrap_err();
        assert_eq!(err, Error::TransactionInProgress);
        let err = db.view(|_| db.update(|_| Ok(()))).unwrap_err();
        assert_eq!(err, Error::TransactionInProgress);
        // guard released afterwards
        assert!(db.update(|_| Ok(())).is_ok());
    }

    #[test]
    fn test_metrics_count_outcomes() {
        let db = Database::open();
        db.update(|txn| txn.set("k", "v")).unwrap();
        let _ = db.update(|txn| txn.delete("missing"));
        db.view(|txn| txn.get("k")).unwrap();

        let metrics = db.metrics();
        assert_eq!(metrics.total_started, 3);
        assert_eq!(metrics.total_committed, 2);
        assert_eq!(metrics.total_aborted, 1);
        assert_eq!(metrics.active_count, 0);
    }

    #[test]
    fn test_failed_update_is_never_committed() {
        let db = Database::open();
        let err = db
            .update(|txn| {
                txn.set("k", r#"{"size":1}"#)?;
                assert_eq!(txn.status(), &TransactionStatus::Active);
                Err::<(), _>(Error::aborted("fail"))
            })
            .unwrap_err();
        assert_eq!(err, Error::aborted("fail"));

        let metrics = db.metrics();
        assert_eq!(metrics.total_committed, 0);
        assert_eq!(metrics.total_aborted, 1);
        assert!(db.view(|txn| Ok(txn.is_empty())).unwrap());
    }

    #[test]
    fn test_panic_rolls_back() {
        let db = Database::open();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = db.update(|txn| -> Result<()> {
                txn.set("k", "v")?;
                panic!("closure failed")
            });
        }));
        assert!(result.is_err());
        assert!(db.view(|txn| txn.get("k")).unwrap_err().is_not_found());
        assert_eq!(db.metrics().active_count, 0);
        assert_eq!(db.metrics().total_aborted, 1);
    }
}
