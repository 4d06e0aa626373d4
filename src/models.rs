//! Core data models used throughout Codex.
//!
//! These types mirror the records returned by the notebook backend's flat
//! file listings. The tree in [`crate::tree`] wraps them without altering
//! their contents except through explicit update calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open, user-defined properties attached to files and folders.
///
/// The set of keys is workspace-defined, so values stay as raw JSON.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A file as known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub notebook_id: i64,
    /// Slash-delimited path, unique within the notebook. No leading slash.
    pub path: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_content_type() -> String {
    "text/markdown".to_string()
}

impl FileRecord {
    /// Minimal record with the filename derived from the last path segment.
    pub fn new(id: i64, notebook_id: i64, path: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            id,
            notebook_id,
            path,
            filename,
            title: None,
            content_type: default_content_type(),
            description: None,
            properties: Properties::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Folder-level metadata, fetched lazily when a folder is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// A sub-folder entry in a folder contents response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FolderMeta>,
}

/// Response for a lazily fetched folder: its own metadata plus its direct
/// children. May be partial; absence of a child never means deletion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderContents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FolderMeta>,
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}
