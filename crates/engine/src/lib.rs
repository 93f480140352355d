//! Database engine for containerdb
//!
//! This crate orchestrates the lower layers into the public handle:
//! - `Database`: open/close, index management, `update` and `view`
//! - `DatabaseConfig`: TOML configuration
//! - `TransactionCoordinator`: transaction IDs and metrics
//! - `ascend`: listing, search and order-by helpers
//!
//! # Example
//!
//! ```
//! use containerdb_engine::{ascend, Database};
//! use containerdb_core::index_json;
//!
//! let db = Database::open();
//! db.create_index("size", "*", index_json("size")).unwrap();
//! db.update(|txn| {
//!     txn.set("a", r#"{"size":5}"#)?;
//!     txn.set("b", r#"{"size":2}"#)?;
//!     txn.set("c", r#"{"size":9}"#)?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let ordered = db.view(|txn| ascend::order_by(txn, "size")).unwrap();
//! let keys: Vec<&str> = ordered.iter().map(|(k, _)| k.as_str()).collect();
//! assert_eq!(keys, ["b", "a", "c"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ascend;
pub mod coordinator;
pub mod database;

pub use coordinator::{TransactionCoordinator, TransactionMetrics};
pub use database::{Database, DatabaseConfig, CONFIG_FILE_NAME};

pub use containerdb_concurrency::{PendingOperations, Transaction, TransactionStatus};
pub use containerdb_storage::Entries;
