//! Explicit context for one invocation: resolved paths plus loaded config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::config::{BookConfig, load_config};
use crate::io::paths::BookPaths;

/// Everything a command needs to know about the book it operates on.
#[derive(Debug, Clone)]
pub struct Session {
    pub paths: BookPaths,
    pub config: BookConfig,
}

impl Session {
    /// Load `manuscript.toml` under `root` and resolve paths from it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config_path = BookPaths::new(&root).config_path;
        let config = load_config(&config_path).context("load manuscript.toml")?;
        let paths = BookPaths::with_chapters_dir(&root, &config.chapters_dir);
        debug!(
            root = %paths.root.display(),
            chapters = %paths.chapters_dir.display(),
            "session opened"
        );
        Ok(Self { paths, config })
    }

    pub fn chapters_dir(&self) -> &Path {
        &self.paths.chapters_dir
    }
}
