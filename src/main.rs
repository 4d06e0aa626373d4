//! # Codex CLI (`codex`)
//!
//! Builds, inspects, and mutates notebook file trees from flat listings.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `codex tree <listing>` | Build the tree and print it |
//! | `codex find <listing> <path>` | Print the node at a path |
//! | `codex files <listing>` | Print the flattened records |
//! | `codex apply <listing> <ops>` | Replay a mutation script |
//! | `codex scan` | List a notebook directory as flat records |
//! | `codex search "<query>" <listing>...` | Search across notebooks |
//!
//! ## Examples
//!
//! ```bash
//! codex tree ./listings/lab.json
//! codex apply ./listings/lab.json ./ops/reorg.json --json
//! codex scan --root ~/notebooks/lab --tree
//! codex search "pcr protocol" ./listings/*.json --limit 5
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use codex_notebook::config::{self, Config};
use codex_notebook::{ops, render, scan, search};

/// Codex notebook tree tool.
///
/// Reads the flat file listings the Codex backend serves (JSON arrays of
/// file records) and works with them as folder trees.
#[derive(Parser)]
#[command(
    name = "codex",
    about = "Codex — build and maintain notebook file trees from flat listings",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/codex.toml`. Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/codex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tree from a listing and print it.
    Tree {
        /// Listing file (JSON array of file records, or `{"files": [...]}`).
        listing: PathBuf,

        /// Print the tree as JSON instead of an outline.
        #[arg(long)]
        json: bool,
    },

    /// Print the node at an exact path.
    ///
    /// Exits non-zero when nothing exists at the path.
    Find { listing: PathBuf, path: String },

    /// Print every file record, flattened depth-first through the tree.
    Files { listing: PathBuf },

    /// Replay a mutation script against the tree built from a listing.
    ///
    /// Per-op outcomes are reported on stderr; the resulting tree is
    /// printed on stdout.
    Apply {
        listing: PathBuf,
        /// JSON array of ops (`insert`, `update`, `remove`, `move`, `merge`).
        script: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Scan a notebook directory into a flat listing.
    Scan {
        /// Notebook directory. Overrides `[scan].root`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Notebook id stamped on every record. Overrides `[scan].notebook_id`.
        #[arg(long)]
        notebook_id: Option<i64>,

        /// Print a tree (JSON) instead of the flat listing.
        #[arg(long)]
        tree: bool,

        /// Saved tree (JSON) to merge the scan into. Implies `--tree`.
        #[arg(long)]
        merge_into: Option<PathBuf>,
    },

    /// Search file names, titles, and paths across notebooks.
    Search {
        query: String,

        /// One listing file per notebook.
        #[arg(required = true)]
        listings: Vec<PathBuf>,

        /// Only search this notebook.
        #[arg(long)]
        notebook_id: Option<i64>,

        /// Maximum number of results. Defaults to `[search].limit`.
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::minimal()
    };
    init_logging(&cfg);

    match cli.command {
        Commands::Tree { listing, json } => {
            render::run_tree(&listing, json)?;
        }
        Commands::Find { listing, path } => {
            render::run_find(&listing, &path)?;
        }
        Commands::Files { listing } => {
            render::run_files(&listing)?;
        }
        Commands::Apply {
            listing,
            script,
            json,
        } => {
            ops::run_apply(&listing, &script, json)?;
        }
        Commands::Scan {
            root,
            notebook_id,
            tree,
            merge_into,
        } => {
            scan::run_scan(
                &cfg,
                root.as_deref(),
                notebook_id,
                merge_into.as_deref(),
                tree || merge_into.is_some(),
            )?;
        }
        Commands::Search {
            query,
            listings,
            notebook_id,
            limit,
        } => {
            search::run_search(&cfg, &query, &listings, notebook_id, limit)?;
        }
    }

    Ok(())
}
