//! Build a flat listing from a notebook directory on disk.
//!
//! Notebooks are stored as plain directories; scanning one yields the same
//! flat record shape the backend serves, so it can feed the tree builder
//! directly. Ids are assigned 1..N in path order.

use anyhow::{bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{Config, ScanConfig};
use crate::listing::read_json;
use crate::models::{FileRecord, FolderContents};
use crate::tree::{build_file_tree, FileTree};

pub fn scan_notebook(scan: &ScanConfig) -> Result<Vec<FileRecord>> {
    let root = &scan.root;
    if !root.is_dir() {
        bail!("Notebook root is not a directory: {}", root.display());
    }

    let include_set = build_globset(&scan.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/.codex/**".to_string(),
    ];
    default_excludes.extend(scan.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut records = Vec::new();

    let walker = WalkDir::new(root).follow_links(scan.follow_symlinks);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        // Listing paths are always '/'-joined, whatever the host separator.
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        records.push(file_to_record(path, rel_str, scan.notebook_id)?);
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    for (i, record) in records.iter_mut().enumerate() {
        record.id = i as i64 + 1;
    }

    debug!(root = %root.display(), files = records.len(), "scanned notebook");
    Ok(records)
}

fn file_to_record(path: &Path, relative_path: String, notebook_id: i64) -> Result<FileRecord> {
    let metadata = std::fs::metadata(path)?;
    let modified = to_utc(metadata.modified().ok());
    let created = to_utc(metadata.created().ok()).or(modified);

    let content_type = content_type_for(path);
    let title = if content_type == "text/markdown" {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|body| first_heading(&body))
    } else {
        None
    };

    let mut record = FileRecord::new(0, notebook_id, relative_path);
    record.title = title;
    record.content_type = content_type.to_string();
    record.created_at = created;
    record.updated_at = modified;
    Ok(record)
}

fn to_utc(time: Option<std::time::SystemTime>) -> Option<DateTime<Utc>> {
    let secs = time?
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .ok()?
        .as_secs() as i64;
    Utc.timestamp_opt(secs, 0).single()
}

/// Content type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "md" | "markdown" => "text/markdown",
        "txt" => "text/plain",
        "json" => "application/json",
        "csv" => "text/csv",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Text of the first level-one `# ` heading, skipping YAML frontmatter.
fn first_heading(body: &str) -> Option<String> {
    let mut lines = body.lines();
    let mut in_frontmatter = false;
    if let Some(first) = lines.next() {
        if first.trim() == "---" {
            in_frontmatter = true;
        } else if let Some(title) = heading_text(first) {
            return Some(title);
        }
    }
    for line in lines {
        if in_frontmatter {
            if line.trim() == "---" {
                in_frontmatter = false;
            }
            continue;
        }
        if let Some(title) = heading_text(line) {
            return Some(title);
        }
    }
    None
}

fn heading_text(line: &str) -> Option<String> {
    let title = line.strip_prefix("# ")?.trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// CLI entry point for `codex scan`.
pub fn run_scan(
    config: &Config,
    root: Option<&Path>,
    notebook_id: Option<i64>,
    merge_into: Option<&Path>,
    as_tree: bool,
) -> Result<()> {
    let mut scan = config.scan.clone();
    if let Some(root) = root {
        scan.root = root.to_path_buf();
    }
    if let Some(id) = notebook_id {
        scan.notebook_id = id;
    }

    let records = scan_notebook(&scan)?;
    eprintln!("Scanned {} files under {}", records.len(), scan.root.display());

    if as_tree {
        let tree = match merge_into {
            // Overlay onto a saved tree; files missing from disk are kept.
            Some(saved) => {
                let mut tree: FileTree = read_json(saved)?;
                tree.merge_folder_contents(
                    "",
                    FolderContents {
                        files: records,
                        ..FolderContents::default()
                    },
                );
                tree
            }
            None => build_file_tree(records),
        };
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn notebook() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("protocols")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("protocols/pcr.md"), "# PCR\n\nSteps.").unwrap();
        fs::write(
            root.join("index.md"),
            "---\ntitle: ignored\n---\n\n# Lab Journal\n",
        )
        .unwrap();
        fs::write(root.join("data.csv"), "a,b\n1,2\n").unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        tmp
    }

    fn config_for(root: &Path) -> ScanConfig {
        ScanConfig {
            root: root.to_path_buf(),
            notebook_id: 3,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn scans_sorted_with_ids_and_types() {
        let tmp = notebook();
        let records = scan_notebook(&config_for(tmp.path())).unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["data.csv", "index.md", "protocols/pcr.md"]);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[2].id, 3);
        assert_eq!(records[0].content_type, "text/csv");
        assert_eq!(records[1].title.as_deref(), Some("Lab Journal"));
        assert_eq!(records[2].title.as_deref(), Some("PCR"));
        assert_eq!(records[2].filename, "pcr.md");
        assert!(records.iter().all(|r| r.notebook_id == 3));
    }

    #[test]
    fn include_and_exclude_globs_apply() {
        let tmp = notebook();
        let mut cfg = config_for(tmp.path());
        cfg.include_globs = vec!["**/*.md".to_string()];
        cfg.exclude_globs = vec!["protocols/**".to_string()];
        let records = scan_notebook(&cfg).unwrap();
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["index.md"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let cfg = config_for(&tmp.path().join("nope"));
        assert!(scan_notebook(&cfg).is_err());
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for(Path::new("a.MD")), "text/markdown");
        assert_eq!(content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
    }
}
