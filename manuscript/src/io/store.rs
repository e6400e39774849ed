//! Read model over a `Chapters/` directory.
//!
//! The filesystem is the only source of truth: every call rescans disk and
//! nothing is cached between calls. Bad entries are skipped during scans and
//! only become errors when a specific chapter is looked up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::types::{Version, chapter_dir_name, parse_chapter_dir_name};
use crate::error::{ChapterError, ChapterResult, IoContext};

/// A directory whose name parsed as a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDir {
    pub number: u32,
    pub path: PathBuf,
}

impl ChapterDir {
    /// True when the directory already carries the canonical `Chapter {n}` name.
    pub fn is_canonical(&self) -> bool {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == chapter_dir_name(self.number))
    }
}

/// A version subdirectory of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDir {
    pub version: Version,
    pub path: PathBuf,
}

/// One row of the chapter listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterEntry {
    pub chapter: u32,
    pub version: Version,
    pub markdown: PathBuf,
}

/// A chapter directory that was left out of the listing, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChapter {
    pub number: u32,
    pub path: PathBuf,
    pub reason: String,
}

/// Listing plus the chapters that could not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub entries: Vec<ChapterEntry>,
    pub skipped: Vec<SkippedChapter>,
}

/// List every usable chapter with its latest version, ascending by number.
///
/// A missing chapters directory yields an empty listing.
pub fn list_chapters(root: &Path) -> ChapterResult<Vec<ChapterEntry>> {
    Ok(scan(root)?.entries)
}

/// Scan `root`, resolving the latest version and markdown file per chapter.
///
/// Chapters without a usable latest version are reported in `skipped`
/// instead of failing the scan.
pub fn scan(root: &Path) -> ChapterResult<ScanReport> {
    if !root.is_dir() {
        debug!(root = %root.display(), "chapters directory missing, empty listing");
        return Ok(ScanReport::default());
    }
    let mut report = ScanReport::default();
    for dir in scan_chapter_dirs(root)? {
        match resolve_latest(&dir.path) {
            Ok((latest, markdown)) => report.entries.push(ChapterEntry {
                chapter: dir.number,
                version: latest.version,
                markdown,
            }),
            Err(err) => {
                warn!(chapter = dir.number, path = %dir.path.display(), error = %err, "skipping chapter");
                report.skipped.push(SkippedChapter {
                    number: dir.number,
                    path: dir.path,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Every immediate subdirectory of `root` whose name parses as a chapter,
/// sorted by number (then by name, so duplicates order deterministically).
pub fn scan_chapter_dirs(root: &Path) -> ChapterResult<Vec<ChapterDir>> {
    ensure_chapters_root(root)?;
    let mut dirs = Vec::new();
    for (name, path) in subdirectories(root)? {
        match parse_chapter_dir_name(&name) {
            Some(number) => dirs.push(ChapterDir { number, path }),
            None => debug!(name = %name, "not a chapter directory, skipping"),
        }
    }
    dirs.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.path.cmp(&b.path)));
    Ok(dirs)
}

/// Chapter numbers currently on disk, ascending (duplicates included).
pub fn chapter_numbers(root: &Path) -> ChapterResult<Vec<u32>> {
    Ok(scan_chapter_dirs(root)?
        .into_iter()
        .map(|dir| dir.number)
        .collect())
}

/// Locate the directory for chapter `number` (case-insensitive).
///
/// When several spellings exist, the canonical `Chapter {n}` wins; otherwise
/// the lookup is ambiguous and fails.
pub fn find_chapter_dir(root: &Path, number: u32) -> ChapterResult<PathBuf> {
    let matches: Vec<ChapterDir> = scan_chapter_dirs(root)?
        .into_iter()
        .filter(|dir| dir.number == number)
        .collect();
    match matches.as_slice() {
        [] => Err(ChapterError::NotFound(format!(
            "{} in {}",
            chapter_dir_name(number),
            root.display()
        ))),
        [only] => Ok(only.path.clone()),
        many => many
            .iter()
            .find(|dir| dir.is_canonical())
            .map(|dir| dir.path.clone())
            .ok_or_else(|| {
                ChapterError::InvalidFormat(format!(
                    "chapter {number} has {} directories with non-canonical names",
                    many.len()
                ))
            }),
    }
}

/// Every version subdirectory of a chapter, ascending by version.
///
/// If two names parse to the same version (`v1.0.0` and `1.0.0`), only the
/// canonical `v`-prefixed one is kept.
pub fn version_dirs(chapter_dir: &Path) -> ChapterResult<Vec<VersionDir>> {
    let mut found: Vec<(Version, bool, PathBuf)> = Vec::new();
    for (name, path) in subdirectories(chapter_dir)? {
        let Some((version, canonical)) = Version::parse_dir_name(&name) else {
            debug!(name = %name, "not a version directory, skipping");
            continue;
        };
        found.push((version, canonical, path));
    }
    // Canonical spelling sorts last within a version so it survives dedup.
    found.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then_with(|| a.2.cmp(&b.2)));

    let mut dirs: Vec<VersionDir> = Vec::with_capacity(found.len());
    for (version, _, path) in found {
        if let Some(last) = dirs.last_mut()
            && last.version == version
        {
            warn!(
                kept = %path.display(),
                dropped = %last.path.display(),
                "two directories name the same version"
            );
            last.path = path;
            continue;
        }
        dirs.push(VersionDir { version, path });
    }
    Ok(dirs)
}

/// The maximal version directory of a chapter.
pub fn latest_version(chapter_dir: &Path) -> ChapterResult<VersionDir> {
    version_dirs(chapter_dir)?.pop().ok_or_else(|| {
        ChapterError::NotFound(format!(
            "no version directories in {}",
            chapter_dir.display()
        ))
    })
}

/// The single markdown file inside a version directory.
pub fn markdown_file(version_dir: &Path) -> ChapterResult<PathBuf> {
    let entries = fs::read_dir(version_dir)
        .io_context(|| format!("read version directory {}", version_dir.display()))?;
    let mut markdown = Vec::new();
    for entry in entries {
        let entry =
            entry.io_context(|| format!("read entry in {}", version_dir.display()))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            markdown.push(path);
        }
    }
    markdown.sort();
    match markdown.len() {
        1 => Ok(markdown.remove(0)),
        0 => Err(ChapterError::AmbiguousContent {
            dir: version_dir.to_path_buf(),
            reason: "no markdown file".to_string(),
        }),
        n => Err(ChapterError::AmbiguousContent {
            dir: version_dir.to_path_buf(),
            reason: format!("{n} markdown files, expected exactly one"),
        }),
    }
}

/// Latest version directory of a chapter and its markdown file.
pub fn resolve_latest(chapter_dir: &Path) -> ChapterResult<(VersionDir, PathBuf)> {
    let latest = latest_version(chapter_dir)?;
    let markdown = markdown_file(&latest.path)?;
    Ok((latest, markdown))
}

/// Read the latest markdown of chapter `number`.
pub fn read_latest(root: &Path, number: u32) -> ChapterResult<(Version, PathBuf, String)> {
    let chapter_dir = find_chapter_dir(root, number)?;
    let (latest, markdown) = resolve_latest(&chapter_dir)?;
    let contents = fs::read_to_string(&markdown)
        .io_context(|| format!("read {}", markdown.display()))?;
    Ok((latest.version, markdown, contents))
}

/// Fail with `NotFound` unless `root` is an existing directory.
pub fn ensure_chapters_root(root: &Path) -> ChapterResult<()> {
    if !root.exists() {
        return Err(ChapterError::NotFound(format!(
            "chapters directory {}",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(ChapterError::InvalidFormat(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok(())
}

/// Immediate subdirectories with UTF-8 names, sorted by name.
fn subdirectories(dir: &Path) -> ChapterResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).io_context(|| format!("read {}", dir.display()))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.io_context(|| format!("read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => out.push((name, path)),
            Err(raw) => warn!(name = ?raw, "skipping directory with non UTF-8 name"),
        }
    }
    out.sort();
    Ok(out)
}
