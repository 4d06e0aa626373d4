//! Text rendering of notebook trees and the read-only CLI commands.
//!
//! Output goes to stdout; diagnostics go through `tracing` on stderr so
//! the JSON variants stay parseable for scripts.

use anyhow::{bail, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::listing::load_listing;
use crate::tree::{build_file_tree, FileTree, TreeNode};

/// Indented outline: two spaces per level, folders suffixed with `/`,
/// files followed by their title when one is set.
pub fn render_outline(tree: &FileTree) -> String {
    let mut out = String::new();
    render_level(tree.roots(), 0, &mut out);
    out
}

fn render_level(level: &[TreeNode], depth: usize, out: &mut String) {
    for node in level {
        let indent = "  ".repeat(depth);
        match node {
            TreeNode::Folder(folder) => {
                let _ = write!(out, "{}{}/", indent, folder.name);
                if let Some(title) = folder.folder_meta.as_ref().and_then(|m| m.title.as_deref()) {
                    let _ = write!(out, "  ({})", title);
                }
                out.push('\n');
                render_level(&folder.children, depth + 1, out);
            }
            TreeNode::File(file) => {
                let _ = write!(out, "{}{}", indent, file.name);
                if let Some(title) = &file.record.title {
                    let _ = write!(out, "  \"{}\"", title);
                }
                out.push('\n');
            }
        }
    }
}

pub fn summary(tree: &FileTree) -> String {
    let folders = tree.folder_count();
    let files = tree.file_count();
    format!(
        "{} folder{}, {} file{}",
        folders,
        if folders == 1 { "" } else { "s" },
        files,
        if files == 1 { "" } else { "s" }
    )
}

/// Print a tree as an outline with a summary line, or as JSON.
pub fn print_tree(tree: &FileTree, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tree)?);
    } else {
        print!("{}", render_outline(tree));
        println!();
        println!("{}", summary(tree));
    }
    Ok(())
}

/// `codex tree`: build from a listing and print.
pub fn run_tree(listing: &Path, json: bool) -> Result<()> {
    let tree = build_file_tree(load_listing(listing)?);
    print_tree(&tree, json)
}

/// `codex find`: print the node at `path` as JSON.
pub fn run_find(listing: &Path, path: &str) -> Result<()> {
    let tree = build_file_tree(load_listing(listing)?);
    match tree.find_node(path) {
        Some(node) => {
            println!("{}", serde_json::to_string_pretty(node)?);
            Ok(())
        }
        None => bail!("no node at path: {}", path),
    }
}

/// `codex files`: flatten through the tree and print the records.
pub fn run_files(listing: &Path) -> Result<()> {
    let tree = build_file_tree(load_listing(listing)?);
    println!("{}", serde_json::to_string_pretty(&tree.get_all_files())?);
    Ok(())
}
