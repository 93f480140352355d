//! Value extractors used to compute index keys
//!
//! An index never interprets stored values itself; it asks an [`Extract`]
//! implementation for the scalar to order by. The stock implementation is
//! [`JsonPath`], which reads a dotted field path out of a JSON document.
//!
//! Extraction follows these rules:
//! - a string field yields its contents without quotes
//! - numbers and booleans yield their JSON text (`5`, `1.5`, `true`)
//! - `null` and missing paths yield the empty string
//! - objects and arrays yield their compact JSON text
//! - a document that is not valid JSON is an [`crate::Error::ExtractorFailure`]

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::Result;

/// Computes the index value for a stored document
pub trait Extract: Send + Sync {
    /// Extract the scalar used for ordering from `value`
    fn extract(&self, value: &str) -> Result<String>;
}

impl<F> Extract for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn extract(&self, value: &str) -> Result<String> {
        self(value)
    }
}

/// Shared, type-erased extractor as stored by an index
pub type Extractor = Arc<dyn Extract>;

/// Dotted-path extractor over JSON documents
///
/// Segments are separated by `.`; a literal dot inside a field name is
/// written `\.`. A segment that parses as an unsigned integer also indexes
/// into arrays.
///
/// ```
/// use containerdb_core::{Extract, JsonPath};
///
/// let path = JsonPath::new("meta.size");
/// assert_eq!(path.extract(r#"{"meta":{"size":42}}"#).unwrap(), "42");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<String>,
}

impl JsonPath {
    /// Parse a dotted path
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = split_path(&raw);
        JsonPath { raw, segments }
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Look up the path in an already parsed document
    pub fn lookup<'a>(&self, doc: &'a JsonValue) -> Option<&'a JsonValue> {
        self.segments
            .iter()
            .try_fold(doc, |node, segment| match node {
                JsonValue::Object(map) => map.get(segment),
                JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Box this path as a shared [`Extractor`]
    pub fn into_extractor(self) -> Extractor {
        Arc::new(self)
    }
}

impl Extract for JsonPath {
    fn extract(&self, value: &str) -> Result<String> {
        let doc: JsonValue = serde_json::from_str(value)?;
        Ok(self.lookup(&doc).map(scalar_string).unwrap_or_default())
    }
}

impl fmt::Debug for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonPath({:?})", self.raw)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Render a JSON node the way index values are compared
pub fn scalar_string(node: &JsonValue) -> String {
    match node {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Extractor for a JSON field path, boxed for `create_index`
pub fn index_json(path: impl Into<String>) -> Extractor {
    JsonPath::new(path).into_extractor()
}

fn split_path(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}
