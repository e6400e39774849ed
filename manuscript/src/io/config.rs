//! Book configuration stored in `manuscript.toml` at the repository root.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::io::paths::{CHAPTERS_DIR, PLANNING_DIR};

/// Book configuration (TOML).
///
/// This file is intended to be edited by humans and committed with the book.
/// Missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BookConfig {
    /// Chapters directory, relative to the repository root.
    pub chapters_dir: PathBuf,

    pub git: GitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    /// Extra paths (relative to the root) staged with the chapters on sync.
    pub add_paths: Vec<PathBuf>,

    /// Commit message used by `manuscript sync` when none is given.
    pub commit_message: String,

    /// Remote pushed to by `manuscript sync --push`.
    pub remote: String,

    /// Kill `git push` after this many seconds.
    pub push_timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            add_paths: vec![PathBuf::from(PLANNING_DIR)],
            commit_message: "Update chapters".to_string(),
            remote: "origin".to_string(),
            push_timeout_secs: 120,
        }
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            chapters_dir: PathBuf::from(CHAPTERS_DIR),
            git: GitConfig::default(),
        }
    }
}

impl BookConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chapters_dir.as_os_str().is_empty() {
            return Err(anyhow!("chapters_dir must not be empty"));
        }
        if self.git.commit_message.trim().is_empty() {
            return Err(anyhow!("git.commit_message must not be empty"));
        }
        if self.git.remote.trim().is_empty() {
            return Err(anyhow!("git.remote must not be empty"));
        }
        if self.git.push_timeout_secs == 0 {
            return Err(anyhow!("git.push_timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BookConfig::default()`.
pub fn load_config(path: &Path) -> Result<BookConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = BookConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BookConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &BookConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
