//! # Codex Notebook
//!
//! File-tree synchronization for Codex, a markdown-first notebook and lab
//! journal. The backend serves each notebook as a flat listing of file
//! records; this crate turns a listing into a sorted folder/file tree and
//! keeps it current through incremental, path-keyed mutations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ Flat listing │──▶│  FileTree    │──▶│ NotebookTrees │
//! │ (JSON / scan)│   │ build + ops  │   │ per notebook  │
//! └──────────────┘   └──────────────┘   └───────┬───────┘
//!                                               │
//!                                    ┌──────────┴──────────┐
//!                                    ▼                     ▼
//!                               ┌─────────┐          ┌──────────┐
//!                               │ render  │          │  search  │
//!                               └─────────┘          └──────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codex_notebook::models::FileRecord;
//! use codex_notebook::tree::build_file_tree;
//!
//! let mut tree = build_file_tree(vec![FileRecord::new(1, 1, "notes/todo.md")]);
//! tree.insert_file_node(FileRecord::new(2, 1, "notes/ideas.md"));
//! assert!(tree.move_node("notes", "archive/notes"));
//! assert!(tree.find_node("archive/notes/ideas.md").is_some());
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`tree`] | Tree construction and incremental mutation |
//! | [`models`] | File records and folder metadata |
//! | [`store`] | Per-notebook tree map for a workspace session |
//! | [`ops`] | Serializable mutations and replay |
//! | [`search`] | Cross-notebook file search |
//! | [`scan`] | Flat listing from a notebook directory |
//! | [`listing`] | Listing file I/O |
//! | [`render`] | Text outline and read-only commands |
//! | [`config`] | TOML configuration parsing |

pub mod config;
pub mod listing;
pub mod models;
pub mod ops;
pub mod render;
pub mod scan;
pub mod search;
pub mod store;
pub mod tree;
