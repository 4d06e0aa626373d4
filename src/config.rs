use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_notebook_id")]
    pub notebook_id: i64,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            notebook_id: default_notebook_id(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_notebook_id() -> i64 {
    1
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Defaults used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.search.limit == 0 {
        anyhow::bail!("search.limit must be >= 1");
    }

    if config.scan.include_globs.is_empty() {
        anyhow::bail!("scan.include_globs must not be empty");
    }

    if config.scan.notebook_id < 0 {
        anyhow::bail!("scan.notebook_id must be >= 0");
    }

    if config.logging.level.trim().is_empty() {
        anyhow::bail!("logging.level must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("codex.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let (_tmp, path) = write("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.search.limit, 20);
        assert_eq!(cfg.scan.include_globs, vec!["**/*"]);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn parses_sections() {
        let (_tmp, path) = write(
            r#"
[scan]
root = "/data/lab"
notebook_id = 4
include_globs = ["**/*.md"]
exclude_globs = ["drafts/**"]

[search]
limit = 5

[logging]
level = "codex_notebook=debug"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.scan.root, PathBuf::from("/data/lab"));
        assert_eq!(cfg.scan.notebook_id, 4);
        assert_eq!(cfg.scan.exclude_globs, vec!["drafts/**"]);
        assert_eq!(cfg.search.limit, 5);
        assert_eq!(cfg.logging.level, "codex_notebook=debug");
    }

    #[test]
    fn rejects_zero_limit() {
        let (_tmp, path) = write("[search]\nlimit = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("search.limit"));
    }
}
