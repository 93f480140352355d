//! Concurrency layer for containerdb
//!
//! This crate implements the transaction side of the store:
//! - Transaction: read-write and read-only handles over a locked `Store`
//! - Undo log: in-place mutation with full rollback on error or panic
//! - TransactionGuard: per-thread detection of nested transactions
//!
//! The locks themselves are owned by the engine; a `Transaction` only ever
//! sees a store that is already exclusively (read-write) or shared
//! (read-only) locked.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod guard;
pub mod transaction;

pub use guard::TransactionGuard;
pub use transaction::{PendingOperations, Transaction, TransactionStatus};
