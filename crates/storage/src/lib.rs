//! Storage layer for containerdb
//!
//! This crate implements the in-memory storage structures:
//! - PrimaryTable: BTreeMap-based ordered key-value map, the source of truth
//! - Index: ordered `(extracted value, key)` pairs over keys matching a pattern
//! - IndexManager: owns every index and applies table changes to them
//! - Store: table and indices behind a single write path
//!
//! Nothing here is synchronized. Locking and transactions live in
//! `containerdb-concurrency`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod manager;
pub mod store;
pub mod table;

pub use index::Index;
pub use manager::IndexManager;
pub use store::{Entries, Store};
pub use table::PrimaryTable;
