//! Cross-notebook file search over the flat view.
//!
//! Searches filenames, titles, and paths of every file loaded into a
//! [`NotebookTrees`]. This is the consumer that still wants a flat list
//! after the listing has been turned into per-notebook trees.
//!
//! # Scoring
//!
//! The query is lowercased and split on whitespace. Each term scores one
//! point for every field (filename, title, path) containing it. Files with
//! a zero score are dropped; the rest are sorted by score (desc), then
//! notebook id and path (asc), and truncated to the limit.

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::listing::load_listing;
use crate::models::FileRecord;
use crate::store::NotebookTrees;

/// Inputs for a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    /// Only return files from this notebook.
    pub notebook_id: Option<i64>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub notebook_id: i64,
    pub id: i64,
    pub path: String,
    pub title: Option<String>,
    pub score: u32,
}

pub fn search(trees: &NotebookTrees, req: &SearchRequest<'_>) -> Vec<SearchResultItem> {
    let query = req.query.to_lowercase();
    let terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() || req.limit == 0 {
        return Vec::new();
    }

    let mut results: Vec<SearchResultItem> = trees
        .all_files()
        .into_iter()
        .filter(|r| req.notebook_id.map_or(true, |id| r.notebook_id == id))
        .filter_map(|record| {
            let score = score_record(&record, &terms);
            (score > 0).then(|| SearchResultItem {
                notebook_id: record.notebook_id,
                id: record.id,
                path: record.path,
                title: record.title,
                score,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.notebook_id.cmp(&b.notebook_id))
            .then_with(|| a.path.cmp(&b.path))
    });
    results.truncate(req.limit);
    results
}

fn score_record(record: &FileRecord, terms: &[&str]) -> u32 {
    let filename = record.filename.to_lowercase();
    let title = record.title.as_deref().unwrap_or_default().to_lowercase();
    let path = record.path.to_lowercase();
    terms
        .iter()
        .map(|term| {
            [&filename, &title, &path]
                .iter()
                .filter(|field| field.contains(*term))
                .count() as u32
        })
        .sum()
}

/// Load one listing per notebook into a session store.
///
/// The notebook id is taken from the first record. An empty listing names
/// no notebook and is skipped with a warning. A second listing for an
/// already loaded notebook is merged into that notebook's tree.
pub fn load_listings(listings: &[PathBuf]) -> Result<NotebookTrees> {
    let mut trees = NotebookTrees::new();
    for path in listings {
        let records = load_listing(path)?;
        let Some(first) = records.first() else {
            warn!(path = %path.display(), "listing is empty, no notebook loaded");
            continue;
        };
        let id = first.notebook_id;
        match trees.get_mut(id) {
            Some(tree) => {
                warn!(
                    path = %path.display(),
                    notebook_id = id,
                    files = records.len(),
                    "notebook already loaded, merging listing into it"
                );
                for record in records {
                    tree.insert_file_node(record);
                }
            }
            None => {
                trees.load(id, records);
            }
        }
    }
    Ok(trees)
}

/// CLI entry point: load listings into a session store, search, print.
pub fn run_search(
    config: &Config,
    query: &str,
    listings: &[PathBuf],
    notebook_id: Option<i64>,
    limit: Option<usize>,
) -> Result<()> {
    if listings.is_empty() {
        bail!("at least one listing file is required");
    }

    let trees = load_listings(listings)?;

    let limit = limit.unwrap_or(config.search.limit);
    let results = search(
        &trees,
        &SearchRequest {
            query,
            notebook_id,
            limit,
        },
    );

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, item) in results.iter().enumerate() {
        println!(
            "{}. [{}] notebook {} · {}",
            i + 1,
            item.score,
            item.notebook_id,
            item.path
        );
        if let Some(title) = &item.title {
            println!("    title: {}", title);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trees() -> NotebookTrees {
        let mut trees = NotebookTrees::new();
        trees.load(
            1,
            vec![
                FileRecord::new(1, 1, "protocols/pcr.md").with_title("PCR protocol"),
                FileRecord::new(2, 1, "notes/meeting.md"),
            ],
        );
        trees.load(
            2,
            vec![
                FileRecord::new(3, 2, "pcr/results.csv"),
                FileRecord::new(4, 2, "readme.md"),
            ],
        );
        trees
    }

    fn req(query: &str) -> SearchRequest<'_> {
        SearchRequest {
            query,
            notebook_id: None,
            limit: 10,
        }
    }

    #[test]
    fn ranks_by_field_hits_across_notebooks() {
        let results = search(&trees(), &req("PCR"));
        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        // pcr.md hits filename, title, path; results.csv only its path.
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(results[0].score, 3);
        assert_eq!(results[1].score, 1);
    }

    #[test]
    fn notebook_filter_and_limit() {
        let mut r = req("md");
        r.notebook_id = Some(2);
        let results = search(&trees(), &r);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, "readme.md");

        let mut r = req("md");
        r.limit = 2;
        assert_eq!(search(&trees(), &r).len(), 2);
    }

    #[test]
    fn blank_query_returns_nothing() {
        assert!(search(&trees(), &req("   ")).is_empty());
    }

    #[test]
    fn listings_for_same_notebook_are_merged() {
        let tmp = tempfile::TempDir::new().unwrap();
        let write = |name: &str, body: &str| {
            let path = tmp.path().join(name);
            std::fs::write(&path, body).unwrap();
            path
        };
        let listings = vec![
            write(
                "part1.json",
                r#"[{"id": 1, "notebook_id": 5, "path": "a.md", "filename": "a.md"}]"#,
            ),
            write("empty.json", "[]"),
            write(
                "part2.json",
                r#"[{"id": 2, "notebook_id": 5, "path": "notes/b.md", "filename": "b.md"}]"#,
            ),
        ];

        let trees = load_listings(&listings).unwrap();
        assert_eq!(trees.notebook_ids(), vec![5]);
        let mut ids: Vec<i64> = trees.all_files().iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }
}
