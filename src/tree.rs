//! Notebook file tree.
//!
//! Converts the backend's flat file listing into a nested tree of folder
//! and file nodes, and keeps that tree current through targeted mutations
//! instead of full rebuilds.
//!
//! # Invariants
//!
//! - A node's path is its parent's path and its own name joined by `/`.
//! - Paths are unique within one tree.
//! - Among siblings, folders come before files; each group is ordered by
//!   name, case-insensitively (exact name breaks ties).
//!
//! Folders are synthesized from path segments and need not correspond to
//! any backend folder record. Path is identity: nodes carry no parent
//! back-references, so a subtree can be detached and re-attached freely.
//!
//! # Conflict policy
//!
//! The backend is the source of truth, so duplicates and missing paths are
//! treated as refresh races rather than faults:
//!
//! | Situation | Behavior |
//! |-----------|----------|
//! | insert/move onto an occupied path | occupant is replaced |
//! | remove/move of a missing path | returns `false` |
//! | update of a missing file | no-op, returns `false` |
//! | merge of a partial folder listing | local-only children are kept |

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{FileRecord, FolderContents, FolderMeta};

/// A folder synthesized from path segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    pub path: String,
    pub name: String,
    pub children: Vec<TreeNode>,
    /// Absent until the folder is opened and its metadata fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_meta: Option<FolderMeta>,
}

impl FolderNode {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: last_segment(path).to_string(),
            children: Vec::new(),
            folder_meta: None,
        }
    }
}

/// A leaf wrapping a backend file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    pub name: String,
    pub record: FileRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Folder(FolderNode),
    File(FileNode),
}

impl TreeNode {
    pub fn path(&self) -> &str {
        match self {
            TreeNode::Folder(f) => &f.path,
            TreeNode::File(f) => &f.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(f) => &f.name,
            TreeNode::File(f) => &f.name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            TreeNode::Folder(f) => Some(f),
            TreeNode::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            TreeNode::File(f) => Some(f),
            TreeNode::Folder(_) => None,
        }
    }

    pub fn children(&self) -> Option<&Vec<TreeNode>> {
        self.as_folder().map(|f| &f.children)
    }

    fn children_mut(&mut self) -> Option<&mut Vec<TreeNode>> {
        match self {
            TreeNode::Folder(f) => Some(&mut f.children),
            TreeNode::File(_) => None,
        }
    }

    /// Rewrite this node's path, and for folders every descendant's path,
    /// so the subtree lives under `new_path`.
    fn relocate(&mut self, new_path: &str) {
        match self {
            TreeNode::File(file) => {
                file.path = new_path.to_string();
                file.name = last_segment(new_path).to_string();
                file.record.path = file.path.clone();
                file.record.filename = file.name.clone();
            }
            TreeNode::Folder(folder) => {
                folder.path = new_path.to_string();
                folder.name = last_segment(new_path).to_string();
                for child in &mut folder.children {
                    let child_path = join_path(new_path, child.name());
                    child.relocate(&child_path);
                }
            }
        }
    }
}

/// Result of [`FileTree::try_move_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Moved,
    /// Source and target are the same existing path.
    Unchanged,
    NotFound,
    /// The target lies inside the subtree being moved; nothing changed.
    IntoOwnSubtree,
}

/// One notebook's tree: the ordered root-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<TreeNode>,
}

/// Build a tree from an unordered flat listing.
///
/// Deterministic: the same records (in any order, paths unique) always
/// produce the same tree. Empty input gives an empty tree.
pub fn build_file_tree<I>(records: I) -> FileTree
where
    I: IntoIterator<Item = FileRecord>,
{
    let mut tree = FileTree::default();
    for record in records {
        tree.insert_file_node(record);
    }
    tree
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Add one file, creating intermediate folders as needed. An existing
    /// node at the same path is replaced.
    ///
    /// The stored record carries the normalized path (`/a//b.md` becomes
    /// `a/b.md`) and a filename matching the last segment.
    pub fn insert_file_node(&mut self, mut record: FileRecord) {
        let path = normalize_path(&record.path);
        if path.is_empty() {
            debug!(id = record.id, "ignoring file record with empty path");
            return;
        }
        let name = last_segment(&path).to_string();
        record.path = path.clone();
        record.filename = name.clone();
        self.attach(TreeNode::File(FileNode { path, name, record }));
    }

    /// Detach the node at `path`, discarding its subtree. Returns whether
    /// anything was removed.
    pub fn remove_node(&mut self, path: &str) -> bool {
        let removed = self.detach(path).is_some();
        debug!(path, removed, "remove node");
        removed
    }

    /// Replace the record of the file at `record.path`, keeping its
    /// position. Returns `false` (and changes nothing) if no file is there.
    pub fn update_file_node(&mut self, mut record: FileRecord) -> bool {
        match self.find_node_mut(&record.path) {
            Some(TreeNode::File(file)) => {
                record.path = file.path.clone();
                record.filename = file.name.clone();
                file.record = record;
                true
            }
            _ => {
                debug!(path = %record.path, "update skipped, no file at path");
                false
            }
        }
    }

    /// Relocate the node at `old_path` to `new_path`, which may change its
    /// parent, its name, or both. Folder subtrees move intact, with every
    /// descendant path rewritten.
    ///
    /// Returns `false` if nothing exists at `old_path`, or if `new_path`
    /// lies inside the subtree being moved. [`FileTree::try_move_node`]
    /// tells the two apart.
    pub fn move_node(&mut self, old_path: &str, new_path: &str) -> bool {
        matches!(
            self.try_move_node(old_path, new_path),
            MoveResult::Moved | MoveResult::Unchanged
        )
    }

    pub fn try_move_node(&mut self, old_path: &str, new_path: &str) -> MoveResult {
        let old_path = normalize_path(old_path);
        let new_path = normalize_path(new_path);
        if old_path.is_empty() || new_path.is_empty() {
            return MoveResult::NotFound;
        }
        if old_path == new_path {
            return match self.find_node(&old_path) {
                Some(_) => MoveResult::Unchanged,
                None => MoveResult::NotFound,
            };
        }
        if is_descendant(&new_path, &old_path) {
            debug!(%old_path, %new_path, "refusing to move a folder into itself");
            return MoveResult::IntoOwnSubtree;
        }

        let Some(mut node) = self.detach(&old_path) else {
            debug!(%old_path, "move skipped, nothing at source path");
            return MoveResult::NotFound;
        };
        node.relocate(&new_path);
        self.attach(node);
        debug!(%old_path, %new_path, "moved node");
        MoveResult::Moved
    }

    /// Merge a lazily fetched folder listing into the tree.
    ///
    /// The folder at `folder_path` is created if missing. Fetched children
    /// already present are refreshed in place, new ones are inserted in
    /// order, and children present only locally are left alone. An empty
    /// `folder_path` merges into the root level.
    ///
    /// Entries whose path does not lie under `folder_path` are skipped.
    pub fn merge_folder_contents(&mut self, folder_path: &str, contents: FolderContents) {
        let folder_path = normalize_path(folder_path);
        let FolderContents {
            meta,
            folders,
            files,
        } = contents;

        if folder_path.is_empty() {
            if meta.is_some() {
                debug!("root level has no folder node, dropping folder meta");
            }
        } else {
            let folder = self.ensure_folder(&folder_path);
            if meta.is_some() {
                folder.folder_meta = meta;
            }
        }

        let outside = |path: &str| !folder_path.is_empty() && !is_descendant(path, &folder_path);

        let mut skipped = 0usize;
        for entry in folders {
            let path = normalize_path(&entry.path);
            if path.is_empty() {
                continue;
            }
            if outside(&path) {
                debug!(%folder_path, %path, "skipping folder entry outside merged folder");
                skipped += 1;
                continue;
            }
            let folder = self.ensure_folder(&path);
            if entry.meta.is_some() {
                folder.folder_meta = entry.meta;
            }
        }

        let mut inserted = 0usize;
        let mut refreshed = 0usize;
        for record in files {
            let path = normalize_path(&record.path);
            if path.is_empty() || outside(&path) {
                debug!(%folder_path, path = %record.path, "skipping file outside merged folder");
                skipped += 1;
                continue;
            }
            if matches!(self.find_node(&path), Some(TreeNode::File(_))) {
                self.update_file_node(record);
                refreshed += 1;
            } else {
                self.insert_file_node(record);
                inserted += 1;
            }
        }
        debug!(%folder_path, inserted, refreshed, skipped, "merged folder contents");
    }

    /// Look up a node by exact path.
    pub fn find_node(&self, path: &str) -> Option<&TreeNode> {
        let segments = segments(path);
        let (name, parents) = segments.split_last()?;
        let mut level = &self.roots;
        for segment in parents {
            level = level
                .iter()
                .find(|n| n.is_folder() && n.name() == *segment)?
                .children()?;
        }
        level.iter().find(|n| n.name() == *name)
    }

    /// Mutable lookup, e.g. to edit the metadata of the selected folder.
    pub fn find_node_mut(&mut self, path: &str) -> Option<&mut TreeNode> {
        let segments = segments(path);
        let (name, parents) = segments.split_last()?;
        let level = find_level_mut(&mut self.roots, parents)?;
        level.iter_mut().find(|n| n.name() == *name)
    }

    /// Every file record, depth-first in stored order.
    pub fn get_all_files(&self) -> Vec<FileRecord> {
        let mut out = Vec::new();
        collect_files(&self.roots, &mut out);
        out
    }

    pub fn file_count(&self) -> usize {
        count_nodes(&self.roots).1
    }

    pub fn folder_count(&self) -> usize {
        count_nodes(&self.roots).0
    }

    fn detach(&mut self, path: &str) -> Option<TreeNode> {
        let segments = segments(path);
        let (name, parents) = segments.split_last()?;
        let level = find_level_mut(&mut self.roots, parents)?;
        let idx = level.iter().position(|n| n.name() == *name)?;
        Some(level.remove(idx))
    }

    /// Place `node` at its own path, creating parents and replacing any
    /// occupant.
    fn attach(&mut self, node: TreeNode) {
        let segments: Vec<String> = segments(node.path()).into_iter().map(String::from).collect();
        let parents = &segments[..segments.len().saturating_sub(1)];
        let level = ensure_level(&mut self.roots, parents);
        if let Some(idx) = level.iter().position(|n| n.name() == node.name()) {
            let occupant = level.remove(idx);
            match (&occupant, &node) {
                (TreeNode::File(_), TreeNode::File(_)) => {
                    debug!(path = node.path(), "replacing existing file");
                }
                (TreeNode::Folder(folder), _) => {
                    let (folders, files) = count_nodes(&folder.children);
                    warn!(
                        path = node.path(),
                        dropped_folders = folders + 1,
                        dropped_files = files,
                        "replacing folder, its subtree is discarded"
                    );
                }
                (TreeNode::File(_), TreeNode::Folder(_)) => {
                    warn!(path = node.path(), dropped_files = 1, "replacing file with folder");
                }
            }
        }
        insert_sorted(level, node);
    }

    fn ensure_folder(&mut self, path: &str) -> &mut FolderNode {
        let segments: Vec<String> = segments(path).into_iter().map(String::from).collect();
        let (name, parents) = match segments.split_last() {
            Some(split) => split,
            None => unreachable!("ensure_folder is only called with non-empty paths"),
        };
        let level = ensure_level(&mut self.roots, parents);
        ensure_child_folder(level, &segments.join("/"), name)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn normalize_path(path: &str) -> String {
    segments(path).join("/")
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Sibling order: folders first, then case-insensitive name, then exact name.
pub(crate) fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.is_folder()
        .cmp(&a.is_folder())
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

fn insert_sorted(level: &mut Vec<TreeNode>, node: TreeNode) -> usize {
    let idx = level.partition_point(|n| compare_nodes(n, &node) == Ordering::Less);
    level.insert(idx, node);
    idx
}

fn find_level_mut<'a>(
    mut level: &'a mut Vec<TreeNode>,
    parents: &[&str],
) -> Option<&'a mut Vec<TreeNode>> {
    for segment in parents {
        let idx = level
            .iter()
            .position(|n| n.is_folder() && n.name() == *segment)?;
        level = level[idx].children_mut()?;
    }
    Some(level)
}

fn ensure_level<'a>(mut level: &'a mut Vec<TreeNode>, parents: &[String]) -> &'a mut Vec<TreeNode> {
    let mut path = String::new();
    for segment in parents {
        path = join_path(&path, segment);
        level = &mut ensure_child_folder(level, &path, segment).children;
    }
    level
}

/// Find or create the folder `name` in `level`. A file occupying the name
/// is replaced by the folder.
fn ensure_child_folder<'a>(
    level: &'a mut Vec<TreeNode>,
    path: &str,
    name: &str,
) -> &'a mut FolderNode {
    let idx = match level.iter().position(|n| n.name() == name) {
        Some(idx) if level[idx].is_folder() => idx,
        occupied => {
            if let Some(idx) = occupied {
                warn!(path, dropped_files = 1, "replacing file with folder");
                level.remove(idx);
            }
            insert_sorted(level, TreeNode::Folder(FolderNode::new(path)))
        }
    };
    match &mut level[idx] {
        TreeNode::Folder(folder) => folder,
        TreeNode::File(_) => unreachable!("slot {} holds the folder just ensured", idx),
    }
}

fn collect_files(level: &[TreeNode], out: &mut Vec<FileRecord>) {
    for node in level {
        match node {
            TreeNode::Folder(folder) => collect_files(&folder.children, out),
            TreeNode::File(file) => out.push(file.record.clone()),
        }
    }
}

fn count_nodes(level: &[TreeNode]) -> (usize, usize) {
    level.iter().fold((0, 0), |(folders, files), node| match node {
        TreeNode::Folder(folder) => {
            let (f, d) = count_nodes(&folder.children);
            (folders + 1 + f, files + d)
        }
        TreeNode::File(_) => (folders, files + 1),
    })
}
