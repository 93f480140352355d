//! containerdb - embedded in-memory ordered key-value store
//!
//! Keys and values are strings. Secondary indices order any subset of keys
//! (chosen by a glob pattern) by a value derived from each document, and
//! every read and write happens inside a closure-scoped transaction.
//!
//! # Quick Start
//!
//! ```
//! use containerdb::{index_json, Database, Error};
//!
//! let db = Database::open();
//! db.create_index("name", "*", index_json("name"))?;
//!
//! db.update(|txn| {
//!     txn.set("f1.txt", r#"{"name":"f1.txt","size":120}"#)?;
//!     txn.set("f2.txt", r#"{"name":"f2.txt","size":30}"#)?;
//!     Ok(())
//! })?;
//!
//! db.view(|txn| {
//!     txn.ascend("name", |key, value| {
//!         println!("{}: {}", key, value);
//!         true
//!     })?;
//!     assert!(txn.get("missing").unwrap_err().is_not_found());
//!     Ok(())
//! })?;
//! # Ok::<(), Error>(())
//! ```
//!
//! # Architecture
//!
//! - `containerdb-core`: errors, extractors, comparators, glob patterns
//! - `containerdb-storage`: primary table, indices, index manager
//! - `containerdb-concurrency`: transactions with undo-log rollback
//! - `containerdb-engine`: the `Database` handle, config and helpers

#![warn(missing_docs)]

pub use containerdb_core::{
    index_json, matches, scalar_string, Comparator, Error, Extract, Extractor, JsonPath,
    MissingKeyPolicy, Result, SortKey,
};
pub use containerdb_engine::{
    ascend, Database, DatabaseConfig, Entries, PendingOperations, Transaction,
    TransactionMetrics, TransactionStatus, CONFIG_FILE_NAME,
};
