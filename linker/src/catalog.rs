//! The reference catalog: a newline-delimited list of descriptor-set files.
//!
//! Each contributing build module appends the name of the descriptor set it
//! produced; consumers read every catalog visible to them, merge the entries,
//! and load the referenced sets. The format allows no blank lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use protolink_schema::RawFileDescriptor;

use crate::error::LinkError;
use crate::loader;

/// Conventional file name of the catalog within a resource root.
pub const CATALOG_NAME: &str = "descriptor_sets.catalog";

/// Parses one catalog file's text into its entries.
/// A blank line anywhere in the body is a format violation.
pub fn parse_entries(path: &Path, text: &str) -> Result<Vec<String>, LinkError> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            return Err(LinkError::Catalog {
                path: path.to_path_buf(),
                msg: format!("blank line at line {}", index + 1),
            });
        }
        entries.push(line.trim().to_owned());
    }
    Ok(entries)
}

/// Merges entry lists from several contributing catalogs, deduplicating
/// while preserving first-seen order.
pub fn merge_entries(contributions: impl IntoIterator<Item = Vec<String>>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for contribution in contributions {
        for entry in contribution {
            if !merged.contains(&entry) {
                merged.push(entry);
            }
        }
    }
    merged
}

/// Appends an entry to a catalog file, creating it if needed. Existing lines
/// are never truncated or rewritten.
pub fn append_entry(path: &Path, entry: &str) -> Result<(), LinkError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    writeln!(file, "{entry}").map_err(|source| LinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads every given catalog file, merges their entries, resolves each entry
/// relative to the directory of the catalog that first contributed it, and
/// loads the referenced descriptor sets into one deduplicated file list
/// (first occurrence of a file name wins).
pub fn load_catalogs<P: AsRef<Path>>(
    catalogs: impl IntoIterator<Item = P>,
) -> Result<Vec<RawFileDescriptor>, LinkError> {
    let mut contributions: Vec<(PathBuf, Vec<String>)> = Vec::new();
    for catalog in catalogs {
        let path = catalog.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        contributions.push((base, parse_entries(path, &text)?));
    }

    let merged = merge_entries(contributions.iter().map(|(_, entries)| entries.clone()));
    // Each merged entry resolves relative to the catalog that first
    // contributed it.
    let referenced: Vec<PathBuf> = merged
        .iter()
        .filter_map(|entry| {
            contributions
                .iter()
                .find(|(_, entries)| entries.iter().any(|e| e == entry))
                .map(|(base, _)| base.join(entry))
        })
        .collect();
    debug!(sets = referenced.len(), "loading catalog-referenced descriptor sets");
    loader::load_descriptor_sets(referenced)
}
