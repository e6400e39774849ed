//! Chapter lifecycle: append, insert, and delete-with-renumber.
//!
//! Each operation assumes chapters are numbered `1..N` before it runs and
//! leaves them numbered `1..N'` afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::core::plan::{
    next_chapter_number, shift_down_plan, shift_up_plan, validate_insert_position,
};
use crate::core::types::{Version, chapter_dir_name};
use crate::error::{ChapterError, ChapterResult, IoContext, RenameRecord};
use crate::io::rename::{apply_sequential, apply_two_phase};
use crate::io::store::{ChapterDir, scan_chapter_dirs};

/// Append a new chapter after the highest existing number.
///
/// Creates `Chapter {n}/v1.0.0/v1.0.0.md` seeded with a `# Chapter {n}`
/// heading and returns the chapter directory.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn create_chapter(root: &Path) -> ChapterResult<PathBuf> {
    let numbers: Vec<u32> = scan_chapter_dirs(root)?
        .into_iter()
        .map(|dir| dir.number)
        .collect();
    let next = next_chapter_number(&numbers)?;
    seed_chapter(root, next)
}

/// Insert a new chapter at position `at`, shifting chapters `at..` up by one.
///
/// `at` must lie in `1..=N+1`; `N+1` behaves like [`create_chapter`].
#[instrument(skip_all, fields(root = %root.display(), at))]
pub fn insert_chapter(root: &Path, at: u32) -> ChapterResult<PathBuf> {
    let dirs = scan_chapter_dirs(root)?;
    let numbers: Vec<u32> = dirs.iter().map(|dir| dir.number).collect();
    let last = numbers.iter().copied().max().unwrap_or(0);
    validate_insert_position(at, last as usize)?;

    let plan = shift_up_plan(&numbers, at)?;
    let steps = plan
        .iter()
        .map(|step| {
            Ok(RenameRecord {
                from: unique_dir(&dirs, step.from)?,
                to: root.join(chapter_dir_name(step.to)),
            })
        })
        .collect::<ChapterResult<Vec<_>>>()?;
    // Several numbers change at once, so go through scratch names.
    apply_two_phase(root, &steps)?;
    if !steps.is_empty() {
        info!(shifted = steps.len(), "opened slot for new chapter");
    }

    seed_chapter(root, at)
}

/// Delete chapter `number` with all its versions, then shift every higher
/// chapter down by one to close the gap.
#[instrument(skip_all, fields(root = %root.display(), chapter = number))]
pub fn delete_chapter(root: &Path, number: u32) -> ChapterResult<()> {
    // Plan the shift before deleting so a refusal leaves the store intact.
    let dirs = scan_chapter_dirs(root)?;
    let target = unique_dir(&dirs, number)?;
    let remaining: Vec<ChapterDir> = dirs.into_iter().filter(|dir| dir.path != target).collect();
    let numbers: Vec<u32> = remaining.iter().map(|dir| dir.number).collect();
    let steps = shift_down_plan(&numbers, number)
        .iter()
        .map(|step| {
            Ok(RenameRecord {
                from: unique_dir(&remaining, step.from)?,
                to: root.join(chapter_dir_name(step.to)),
            })
        })
        .collect::<ChapterResult<Vec<_>>>()?;

    fs::remove_dir_all(&target).io_context(|| format!("remove {}", target.display()))?;
    info!(dir = %target.display(), "deleted chapter");

    // Ascending order: each target slot was vacated by the delete or by the
    // previous rename.
    apply_sequential(&steps)
}

/// Create `Chapter {number}/v1.0.0/v1.0.0.md`.
fn seed_chapter(root: &Path, number: u32) -> ChapterResult<PathBuf> {
    let chapter_dir = root.join(chapter_dir_name(number));
    if chapter_dir.exists() {
        return Err(ChapterError::AlreadyExists(chapter_dir));
    }
    fs::create_dir(&chapter_dir).io_context(|| format!("create {}", chapter_dir.display()))?;

    if let Err(err) = write_seed_version(&chapter_dir, number) {
        if let Err(cleanup) = fs::remove_dir_all(&chapter_dir) {
            warn!(dir = %chapter_dir.display(), error = %cleanup, "could not remove partial chapter");
        }
        return Err(err);
    }
    info!(chapter = number, dir = %chapter_dir.display(), "created chapter");
    Ok(chapter_dir)
}

fn write_seed_version(chapter_dir: &Path, number: u32) -> ChapterResult<()> {
    let version = Version::INITIAL.dir_name();
    let version_dir = chapter_dir.join(&version);
    fs::create_dir(&version_dir).io_context(|| format!("create {}", version_dir.display()))?;
    let markdown = version_dir.join(format!("{version}.md"));
    fs::write(&markdown, seed_contents(number))
        .io_context(|| format!("write {}", markdown.display()))
}

/// Initial markdown for a new chapter.
pub fn seed_contents(number: u32) -> String {
    format!("# {}\n\n", chapter_dir_name(number))
}

/// The single directory holding chapter `number`; duplicate spellings cannot
/// be renumbered safely.
pub(crate) fn unique_dir(dirs: &[ChapterDir], number: u32) -> ChapterResult<PathBuf> {
    let mut matches = dirs.iter().filter(|dir| dir.number == number);
    match (matches.next(), matches.next()) {
        (Some(dir), None) => Ok(dir.path.clone()),
        (None, _) => Err(ChapterError::NotFound(chapter_dir_name(number))),
        (Some(_), Some(_)) => Err(ChapterError::InvalidOrder(format!(
            "chapter {number} has more than one directory; run `manuscript check`"
        ))),
    }
}
