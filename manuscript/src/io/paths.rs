//! Canonical paths within a book repository.

use std::path::{Path, PathBuf};

pub const CHAPTERS_DIR: &str = "Chapters";
/// Staged with the chapters by `manuscript sync` unless configured otherwise.
pub const PLANNING_DIR: &str = "planning";
pub const CONFIG_FILE: &str = "manuscript.toml";

/// All canonical paths for a book repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPaths {
    pub root: PathBuf,
    pub chapters_dir: PathBuf,
    pub config_path: PathBuf,
}

impl BookPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_chapters_dir(root, CHAPTERS_DIR)
    }

    /// Paths with a chapters directory relative to `root` (or absolute).
    pub fn with_chapters_dir(root: impl Into<PathBuf>, chapters_dir: impl AsRef<Path>) -> Self {
        let root = root.into();
        Self {
            chapters_dir: root.join(chapters_dir),
            config_path: root.join(CONFIG_FILE),
            root,
        }
    }
}
