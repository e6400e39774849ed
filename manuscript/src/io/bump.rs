//! Version bumps: copy a chapter's latest markdown forward into a new
//! version directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::core::types::{BumpKind, Version};
use crate::error::{ChapterError, ChapterResult, IoContext};
use crate::io::store::{find_chapter_dir, latest_version, markdown_file, scan_chapter_dirs};

/// A version directory created by a bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpedVersion {
    pub chapter: u32,
    pub previous: Version,
    pub current: Version,
    /// The new version directory.
    pub dir: PathBuf,
    /// The copied markdown file inside `dir`.
    pub markdown: PathBuf,
}

/// Per-chapter result of a batch bump.
#[derive(Debug)]
pub struct BumpResult {
    pub chapter: u32,
    pub outcome: ChapterResult<BumpedVersion>,
}

/// Results of a batch bump, in the order chapters were processed.
#[derive(Debug, Default)]
pub struct BumpReport {
    pub results: Vec<BumpResult>,
}

impl BumpReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Create the next version of chapter `number` and copy its latest markdown
/// file into it unchanged.
#[instrument(skip_all, fields(chapter = number, kind = %kind))]
pub fn bump_chapter(root: &Path, number: u32, kind: BumpKind) -> ChapterResult<BumpedVersion> {
    let chapter_dir = find_chapter_dir(root, number)?;
    let latest = latest_version(&chapter_dir)?;
    let source = markdown_file(&latest.path)?;
    let next = latest.version.bump(kind);

    let new_dir = chapter_dir.join(next.dir_name());
    if new_dir.exists() {
        return Err(ChapterError::AlreadyExists(new_dir));
    }
    let file_name = source.file_name().ok_or_else(|| {
        ChapterError::InvalidFormat(format!("markdown path {} has no name", source.display()))
    })?;
    let target = new_dir.join(file_name);

    fs::create_dir(&new_dir).io_context(|| format!("create {}", new_dir.display()))?;
    if let Err(err) = fs::copy(&source, &target) {
        // A version directory without markdown would poison later scans.
        if let Err(cleanup) = fs::remove_dir_all(&new_dir) {
            warn!(dir = %new_dir.display(), error = %cleanup, "could not remove partial version");
        }
        return Err(ChapterError::io(
            format!("copy {} to {}", source.display(), target.display()),
            err,
        ));
    }

    info!(from = %latest.version, to = %next, dir = %new_dir.display(), "bumped chapter");
    Ok(BumpedVersion {
        chapter: number,
        previous: latest.version,
        current: next,
        dir: new_dir,
        markdown: target,
    })
}

/// Bump every chapter in the store. Failures are recorded per chapter and do
/// not stop the batch.
#[instrument(skip_all, fields(kind = %kind))]
pub fn bump_all(root: &Path, kind: BumpKind) -> ChapterResult<BumpReport> {
    let mut numbers: Vec<u32> = scan_chapter_dirs(root)?
        .into_iter()
        .map(|dir| dir.number)
        .collect();
    numbers.dedup();
    Ok(bump_chapters(root, &numbers, kind))
}

/// Bump the listed chapters in order, isolating per-chapter failures.
pub fn bump_chapters(root: &Path, numbers: &[u32], kind: BumpKind) -> BumpReport {
    let mut report = BumpReport::default();
    for &chapter in numbers {
        let outcome = bump_chapter(root, chapter, kind);
        if let Err(err) = &outcome {
            warn!(chapter, error = %err, "bump failed");
        }
        report.results.push(BumpResult { chapter, outcome });
    }
    info!(
        succeeded = report.succeeded(),
        total = report.results.len(),
        "batch bump finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::BookFixture;

    #[test]
    fn minor_bump_copies_latest_forward() {
        let book = BookFixture::new().expect("fixture");
        book.add_version(1, "v1.0.0", "v1.0.0.md", "# Chapter 1\n\n")
            .expect("seed");

        let bumped = bump_chapter(book.chapters_dir(), 1, BumpKind::Minor).expect("bump");
        assert_eq!(bumped.previous, Version::INITIAL);
        assert_eq!(bumped.current, Version::new(1, 1, 0));
        assert!(bumped.dir.ends_with("Chapter 1/v1.1.0"));
        assert!(bumped.markdown.ends_with("v1.1.0/v1.0.0.md"));
        assert_eq!(
            fs::read(&bumped.markdown).expect("new"),
            fs::read(book.chapter_path(1).join("v1.0.0/v1.0.0.md")).expect("old")
        );
        assert!(book.chapter_path(1).join("v1.0.0/v1.0.0.md").is_file());
    }

    #[test]
    fn repeated_patch_bumps_are_monotonic() {
        let book = BookFixture::with_chapters(1).expect("fixture");
        let mut last = Version::INITIAL;
        for _ in 0..3 {
            let bumped = bump_chapter(book.chapters_dir(), 1, BumpKind::Patch).expect("bump");
            assert!(bumped.current > last);
            assert_eq!(bumped.current.patch, last.patch + 1);
            last = bumped.current;
        }
        let major = bump_chapter(book.chapters_dir(), 1, BumpKind::Major).expect("major");
        assert_eq!(major.current, Version::new(2, 0, 0));
    }

    #[test]
    fn bump_refuses_existing_version() {
        let book = BookFixture::new().expect("fixture");
        book.add_version(1, "v1.0.0", "a.md", "x").expect("v1.0.0");
        // A stray file is not a version directory, but still occupies the name.
        fs::write(book.chapter_path(1).join("v1.0.1"), "stray").expect("stray");

        let err = bump_chapter(book.chapters_dir(), 1, BumpKind::Patch).expect_err("exists");
        assert!(matches!(err, ChapterError::AlreadyExists(_)));
    }

    #[test]
    fn bump_rejects_version_without_markdown() {
        let book = BookFixture::new().expect("fixture");
        book.add_version(1, "v1.0.0", "a.md", "x").expect("v1.0.0");
        fs::create_dir_all(book.chapter_path(1).join("v1.0.1")).expect("empty latest");

        let err = bump_chapter(book.chapters_dir(), 1, BumpKind::Patch).expect_err("empty");
        assert!(matches!(err, ChapterError::AmbiguousContent { .. }));
        assert!(!book.chapter_path(1).join("v1.0.2").exists());
    }

    #[test]
    fn bump_missing_chapter_is_not_found() {
        let book = BookFixture::with_chapters(1).expect("fixture");
        let err = bump_chapter(book.chapters_dir(), 4, BumpKind::Patch).expect_err("missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn bump_all_isolates_failures() {
        let book = BookFixture::with_chapters(3).expect("fixture");
        fs::write(book.chapter_path(2).join("v1.0.0/second.md"), "extra").expect("extra");

        let report = bump_all(book.chapters_dir(), BumpKind::Minor).expect("bump all");
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.results[1].outcome.is_err());
        assert!(book.chapter_path(1).join("v1.1.0").is_dir());
        assert!(!book.chapter_path(2).join("v1.1.0").exists());
        assert!(book.chapter_path(3).join("v1.1.0").is_dir());
    }

    #[test]
    fn bump_chapters_reports_unknown_numbers() {
        let book = BookFixture::with_chapters(2).expect("fixture");
        let report = bump_chapters(book.chapters_dir(), &[2, 9], BumpKind::Patch);
        assert_eq!(report.succeeded(), 1);
        assert!(
            report.results[1]
                .outcome
                .as_ref()
                .is_err_and(ChapterError::is_not_found)
        );
    }
}
