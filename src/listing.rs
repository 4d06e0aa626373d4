//! Flat listing files.
//!
//! A listing is the backend's flat array of file records for one notebook,
//! saved as JSON. Both a bare array and an object with a `files` key (the
//! shape of a notebook listing response) are accepted.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::models::FileRecord;

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingFile {
    Records(Vec<FileRecord>),
    Wrapped { files: Vec<FileRecord> },
}

/// Read a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_listing(path: &Path) -> Result<Vec<FileRecord>> {
    let records = match read_json::<ListingFile>(path)? {
        ListingFile::Records(records) => records,
        ListingFile::Wrapped { files } => files,
    };
    tracing::debug!(path = %path.display(), records = records.len(), "loaded listing");
    Ok(records)
}
