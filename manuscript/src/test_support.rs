//! Test-only helpers for building chapter trees on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::types::chapter_dir_name;
use crate::io::paths::BookPaths;

/// A temporary book repository with an empty `Chapters/` directory.
pub struct BookFixture {
    temp: TempDir,
    chapters_dir: PathBuf,
}

impl BookFixture {
    pub fn new() -> io::Result<Self> {
        let temp = tempfile::tempdir()?;
        let chapters_dir = BookPaths::new(temp.path()).chapters_dir;
        fs::create_dir_all(&chapters_dir)?;
        Ok(Self { temp, chapters_dir })
    }

    /// Fixture with chapters `1..=count`, each at `v1.0.0` with content
    /// `"chapter {n} body"`.
    pub fn with_chapters(count: u32) -> io::Result<Self> {
        let book = Self::new()?;
        for num in 1..=count {
            book.add_chapter(num, &body(num))?;
        }
        Ok(book)
    }

    /// Book repository root (parent of `Chapters/`).
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn chapters_dir(&self) -> &Path {
        &self.chapters_dir
    }

    pub fn chapter_path(&self, num: u32) -> PathBuf {
        self.chapters_dir.join(chapter_dir_name(num))
    }

    /// Add `Chapter {num}/v1.0.0/chapter.md`.
    pub fn add_chapter(&self, num: u32, contents: &str) -> io::Result<PathBuf> {
        self.add_version(num, "v1.0.0", "chapter.md", contents)
    }

    /// Add `Chapter {num}/{version}/{file}` with `contents`.
    pub fn add_version(
        &self,
        num: u32,
        version: &str,
        file: &str,
        contents: &str,
    ) -> io::Result<PathBuf> {
        let dir = self.chapter_path(num).join(version);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Contents of the markdown file in the highest-sorting `v*` directory.
    ///
    /// Reads disk directly so assertions do not depend on the store under test.
    pub fn latest_contents(&self, num: u32) -> io::Result<String> {
        let mut versions: Vec<(Vec<u32>, PathBuf)> = Vec::new();
        for entry in fs::read_dir(self.chapter_path(num))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(rest) = name.strip_prefix('v') else {
                continue;
            };
            let parts: Option<Vec<u32>> = rest.split('.').map(|p| p.parse().ok()).collect();
            if let Some(parts) = parts {
                versions.push((parts, entry.path()));
            }
        }
        versions.sort();
        let (_, dir) = versions
            .pop()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no versions"))?;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                return fs::read_to_string(path);
            }
        }
        Err(io::Error::new(io::ErrorKind::NotFound, "no markdown"))
    }

    /// Names of every entry directly under `Chapters/`, sorted.
    pub fn entry_names(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.chapters_dir)? {
            names.push(entry?.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }
}

/// Default body used by [`BookFixture::with_chapters`].
pub fn body(num: u32) -> String {
    format!("chapter {num} body")
}
