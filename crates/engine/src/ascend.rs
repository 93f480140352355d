//! Read helpers built on ordered ascent
//!
//! Each helper is one visitor passed to [`Transaction::ascend`]; search and
//! ordering need no machinery beyond that. They work inside both `view`
//! and `update`.

use containerdb_concurrency::Transaction;
use containerdb_core::{Extract, JsonPath, Result};

/// All keys in key order
pub fn list(txn: &Transaction<'_>) -> Result<Vec<String>> {
    let mut keys = Vec::with_capacity(txn.len());
    txn.ascend("", |key, _| {
        keys.push(key.to_string());
        true
    })?;
    Ok(keys)
}

/// All entries in key order
pub fn dump(txn: &Transaction<'_>) -> Result<Vec<(String, String)>> {
    order_by(txn, "")
}

/// Entries whose key contains `term`, in key order
pub fn search_keys(txn: &Transaction<'_>, term: &str) -> Result<Vec<(String, String)>> {
    let mut found = Vec::new();
    txn.ascend("", |key, value| {
        if key.contains(term) {
            found.push((key.to_string(), value.to_string()));
        }
        true
    })?;
    Ok(found)
}

/// Keys whose JSON value at `metric` contains `term`
///
/// Returns `(key, extracted)` pairs in key order. The metric is read
/// straight from each document, so it need not be a declared index.
/// Documents that are not valid JSON never match.
pub fn search_metric(
    txn: &Transaction<'_>,
    metric: &str,
    term: &str,
) -> Result<Vec<(String, String)>> {
    let path = JsonPath::new(metric);
    let mut found = Vec::new();
    txn.ascend("", |key, value| {
        if let Ok(contender) = path.extract(value) {
            if contender.contains(term) {
                found.push((key.to_string(), contender));
            }
        }
        true
    })?;
    Ok(found)
}

/// All entries in ascending order of the index `metric`
///
/// # Errors
/// `Error::IndexNotFound` if `metric` is not a declared index.
pub fn order_by(txn: &Transaction<'_>, metric: &str) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::with_capacity(txn.len());
    txn.ascend(metric, |key, value| {
        entries.push((key.to_string(), value.to_string()));
        true
    })?;
    Ok(entries)
}

/// The first `limit` entries in ascending order of `index`
///
/// Stops the ascent as soon as `limit` entries were collected.
pub fn first_n(txn: &Transaction<'_>, index: &str, limit: usize) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::with_capacity(limit);
    if limit == 0 {
        return Ok(entries);
    }
    txn.ascend(index, |key, value| {
        entries.push((key.to_string(), value.to_string()));
        entries.len() < limit
    })?;
    Ok(entries)
}
