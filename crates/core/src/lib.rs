//! Core types for containerdb
//!
//! This crate defines the foundational pieces shared by every layer:
//! - Error: Error type and `Result` alias
//! - Pattern: glob matching that selects the keys an index covers
//! - Extract: pluggable value extractors, including the JSON path extractor
//! - Comparator: ordering of extracted index values
//! - Policy: configurable recovery policies

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod comparator;
pub mod error;
pub mod extract;
pub mod pattern;
pub mod policy;

pub use comparator::{Comparator, SortKey};
pub use error::{Error, Result};
pub use extract::{index_json, scalar_string, Extract, Extractor, JsonPath};
pub use pattern::matches;
pub use policy::MissingKeyPolicy;
