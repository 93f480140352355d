//! Nested transaction detection
//!
//! A transaction closure runs while its database lock is held. Calling
//! `update` or `view` on the same database from inside that closure would
//! either deadlock (write after read, or write after write) or observe a
//! half-finished transaction. Each thread therefore records the databases
//! it is currently inside, and a second entry is refused.
//!
//! The guard must be acquired before the database lock.

use std::cell::RefCell;

use containerdb_core::{Error, Result};

thread_local! {
    static ACTIVE: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Marks a database as having an active transaction on this thread
///
/// Released on drop, including during unwinding.
#[derive(Debug)]
pub struct TransactionGuard {
    db_id: u64,
}

impl TransactionGuard {
    /// Enter a transaction on database `db_id`
    ///
    /// # Errors
    /// `Error::TransactionInProgress` if this thread is already inside a
    /// transaction on the same database.
    pub fn enter(db_id: u64) -> Result<Self> {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&db_id) {
                return Err(Error::TransactionInProgress);
            }
            active.push(db_id);
            Ok(TransactionGuard { db_id })
        })
    }

    /// Whether this thread is inside a transaction on `db_id`
    pub fn is_active(db_id: u64) -> bool {
        ACTIVE.with(|active| active.borrow().contains(&db_id))
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|id| *id == self.db_id) {
                active.remove(pos);
            }
        });
    }
}
