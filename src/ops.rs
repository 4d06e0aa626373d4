//! Serializable tree mutations.
//!
//! A [`TreeOp`] records one UI-side mutation (create, save, delete, move,
//! folder expand) so a sequence of them can be stored and replayed against
//! a freshly built tree. Scripts are JSON arrays:
//!
//! ```json
//! [
//!   { "op": "insert", "record": { "id": 9, "notebook_id": 1, "path": "notes/new.md", "filename": "new.md" } },
//!   { "op": "move", "from": "notes", "to": "archive/notes" },
//!   { "op": "remove", "path": "scratch.md" }
//! ]
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::listing::{load_listing, read_json};
use crate::models::{FileRecord, FolderContents};
use crate::render::print_tree;
use crate::tree::{build_file_tree, FileTree, MoveResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOp {
    Insert { record: FileRecord },
    Update { record: FileRecord },
    Remove { path: String },
    Move { from: String, to: String },
    Merge {
        folder: String,
        #[serde(default)]
        contents: FolderContents,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Applied,
    /// The target path did not resolve; the tree is unchanged.
    NotFound,
    /// The op is well-formed but would corrupt the tree, e.g. moving a
    /// folder into its own subtree. The tree is unchanged.
    Refused,
}

impl TreeOp {
    pub fn describe(&self) -> String {
        match self {
            TreeOp::Insert { record } => format!("insert {}", record.path),
            TreeOp::Update { record } => format!("update {}", record.path),
            TreeOp::Remove { path } => format!("remove {}", path),
            TreeOp::Move { from, to } => format!("move {} -> {}", from, to),
            TreeOp::Merge { folder, contents } => format!(
                "merge {} ({} folders, {} files)",
                if folder.is_empty() { "/" } else { folder.as_str() },
                contents.folders.len(),
                contents.files.len()
            ),
        }
    }
}

pub fn apply(tree: &mut FileTree, op: TreeOp) -> OpOutcome {
    let applied = match op {
        TreeOp::Move { from, to } => {
            return match tree.try_move_node(&from, &to) {
                MoveResult::Moved | MoveResult::Unchanged => OpOutcome::Applied,
                MoveResult::NotFound => OpOutcome::NotFound,
                MoveResult::IntoOwnSubtree => OpOutcome::Refused,
            };
        }
        TreeOp::Insert { record } => {
            tree.insert_file_node(record);
            true
        }
        TreeOp::Update { record } => tree.update_file_node(record),
        TreeOp::Remove { path } => tree.remove_node(&path),
        TreeOp::Merge { folder, contents } => {
            tree.merge_folder_contents(&folder, contents);
            true
        }
    };
    if applied {
        OpOutcome::Applied
    } else {
        OpOutcome::NotFound
    }
}

/// `codex apply`: build from a listing, replay a script, print the result.
pub fn run_apply(listing: &Path, script: &Path, json: bool) -> Result<()> {
    let mut tree = build_file_tree(load_listing(listing)?);
    let ops: Vec<TreeOp> = read_json(script)?;

    let mut not_found = 0usize;
    let mut refused = 0usize;
    for (i, op) in ops.into_iter().enumerate() {
        let label = op.describe();
        let outcome = apply(&mut tree, op);
        match outcome {
            OpOutcome::Applied => {}
            OpOutcome::NotFound => not_found += 1,
            OpOutcome::Refused => refused += 1,
        }
        eprintln!("[{}] {}: {:?}", i + 1, label, outcome);
    }
    if not_found > 0 {
        eprintln!("{} op(s) did not match any node", not_found);
    }
    if refused > 0 {
        eprintln!("{} op(s) refused", refused);
    }

    print_tree(&tree, json)
}
