//! Session-scoped map of notebook trees.
//!
//! One [`FileTree`] per notebook, keyed by notebook id and scoped to the
//! selected workspace. Trees are built on the first listing, mutated in
//! place afterwards, and discarded together when the workspace changes.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::models::FileRecord;
use crate::tree::{build_file_tree, FileTree};

#[derive(Debug, Default)]
pub struct NotebookTrees {
    workspace_id: Option<i64>,
    trees: BTreeMap<i64, FileTree>,
}

impl NotebookTrees {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace_id(&self) -> Option<i64> {
        self.workspace_id
    }

    /// Switch workspaces. Selecting a different workspace discards every
    /// tree; re-selecting the current one keeps them.
    pub fn select_workspace(&mut self, workspace_id: i64) {
        if self.workspace_id == Some(workspace_id) {
            return;
        }
        if !self.trees.is_empty() {
            info!(
                previous = ?self.workspace_id,
                workspace_id,
                discarded = self.trees.len(),
                "workspace changed, discarding notebook trees"
            );
        }
        self.trees.clear();
        self.workspace_id = Some(workspace_id);
    }

    /// Build (or rebuild) the tree for a notebook from a flat listing.
    pub fn load<I>(&mut self, notebook_id: i64, records: I) -> &mut FileTree
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let tree = build_file_tree(records);
        debug!(notebook_id, files = tree.file_count(), "loaded notebook tree");
        let slot = self.trees.entry(notebook_id).or_default();
        *slot = tree;
        slot
    }

    pub fn get(&self, notebook_id: i64) -> Option<&FileTree> {
        self.trees.get(&notebook_id)
    }

    pub fn get_mut(&mut self, notebook_id: i64) -> Option<&mut FileTree> {
        self.trees.get_mut(&notebook_id)
    }

    pub fn contains(&self, notebook_id: i64) -> bool {
        self.trees.contains_key(&notebook_id)
    }

    /// Loaded notebook ids, ascending.
    pub fn notebook_ids(&self) -> Vec<i64> {
        self.trees.keys().copied().collect()
    }

    pub fn remove_notebook(&mut self, notebook_id: i64) -> bool {
        self.trees.remove(&notebook_id).is_some()
    }

    /// Flat view across every loaded notebook, by ascending notebook id.
    pub fn all_files(&self) -> Vec<FileRecord> {
        self.trees
            .values()
            .flat_map(|tree| tree.get_all_files())
            .collect()
    }
}
