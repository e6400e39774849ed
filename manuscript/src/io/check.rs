//! Read-only health check of a chapters directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::invariants::check_contiguity;
use crate::error::{ChapterResult, IoContext};
use crate::io::rename::is_scratch_name;
use crate::io::store::{SkippedChapter, ensure_chapters_root, scan, scan_chapter_dirs};

/// Findings from [`check_store`]. Empty lists mean healthy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Contiguity violations (gaps, duplicate numbers).
    pub contiguity: Vec<String>,
    /// Chapters that listing leaves out, with the reason.
    pub excluded: Vec<SkippedChapter>,
    /// Scratch directories left by an interrupted reorder or insert.
    pub scratch_dirs: Vec<PathBuf>,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.contiguity.is_empty() && self.excluded.is_empty() && self.scratch_dirs.is_empty()
    }

    /// One line per finding, for display.
    pub fn findings(&self) -> Vec<String> {
        let mut lines = self.contiguity.clone();
        for skipped in &self.excluded {
            lines.push(format!(
                "chapter {} ({}) is unusable: {}",
                skipped.number,
                skipped.path.display(),
                skipped.reason
            ));
        }
        for dir in &self.scratch_dirs {
            lines.push(format!(
                "leftover scratch directory {} (interrupted rename)",
                dir.display()
            ));
        }
        lines
    }
}

/// Scan `root` and report everything that breaks the store's invariants.
pub fn check_store(root: &Path) -> ChapterResult<CheckReport> {
    ensure_chapters_root(root)?;
    let numbers: Vec<u32> = scan_chapter_dirs(root)?
        .into_iter()
        .map(|dir| dir.number)
        .collect();
    let report = CheckReport {
        contiguity: check_contiguity(&numbers),
        excluded: scan(root)?.skipped,
        scratch_dirs: scratch_dirs(root)?,
    };
    debug!(healthy = report.is_healthy(), "store checked");
    Ok(report)
}

fn scratch_dirs(root: &Path) -> ChapterResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(root).io_context(|| format!("read {}", root.display()))? {
        let entry = entry.io_context(|| format!("read entry in {}", root.display()))?;
        if entry.file_name().to_str().is_some_and(is_scratch_name) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}
