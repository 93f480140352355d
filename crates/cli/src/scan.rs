//! Seed entries from a directory tree.
//!
//! Every regular file below the root whose name matches the glob becomes
//! one entry: the key is the file's path, the document is
//! `{"sha256": <hex digest>, "size": <bytes>}`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use containerdb_core::matches;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Collect `(path, document)` pairs for files under `root` matching `pattern`.
///
/// Symlinked directories are not followed. Results are sorted by path.
pub fn scan(root: &Path, pattern: &str) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();
    walk(root, pattern, &mut files)?;
    files.sort();

    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let doc = basic(&path)?;
        entries.push((path.display().to_string(), doc.to_string()));
    }
    debug!(root = %root.display(), pattern, files = entries.len(), "Scanned");
    Ok(entries)
}

fn walk(dir: &Path, pattern: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let listing =
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
    for entry in listing {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            walk(&path, pattern, out)?;
        } else if file_type.is_file()
            && matches(pattern, &entry.file_name().to_string_lossy())
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Size and SHA-256 of one file.
pub fn basic(path: &Path) -> Result<serde_json::Value> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let size = file.metadata()?.len();
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash {}", path.display()))?;
    Ok(json!({
        "size": size,
        "sha256": hex::encode(hasher.finalize()),
    }))
}
