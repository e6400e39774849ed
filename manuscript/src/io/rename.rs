//! Directory rename execution for renumbering operations.
//!
//! Directory rename is the only transactional primitive available. Two
//! strategies are provided:
//!
//! - [`apply_sequential`]: renames in the given order. Only safe when every
//!   target slot is vacated before it is used (delete-and-shift-down).
//! - [`apply_two_phase`]: stages every source to a scratch name, then commits
//!   scratch names to their targets. Safe for any permutation.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, error, info, instrument, warn};

use crate::error::{ChapterError, ChapterResult, RenameRecord};

const SCRATCH_PREFIX: &str = "__tmp_chapter_";
const SCRATCH_SUFFIX: &str = "__";

/// Scratch directory name for staged position `index`.
pub fn scratch_name(index: usize) -> String {
    format!("{SCRATCH_PREFIX}{index}{SCRATCH_SUFFIX}")
}

/// True if `name` looks like a scratch directory left by a staged rename.
pub fn is_scratch_name(name: &str) -> bool {
    name.strip_prefix(SCRATCH_PREFIX)
        .and_then(|rest| rest.strip_suffix(SCRATCH_SUFFIX))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Rename steps in order, refusing to overwrite anything.
///
/// On failure, returns `PartialRename` listing the renames already applied.
#[instrument(skip_all, fields(steps = steps.len()))]
pub fn apply_sequential(steps: &[RenameRecord]) -> ChapterResult<()> {
    let mut applied: Vec<RenameRecord> = Vec::with_capacity(steps.len());
    for step in steps {
        if let Err(source) = rename_no_clobber(&step.from, &step.to) {
            return Err(partial(step.clone(), applied, source));
        }
        info!(from = %step.from.display(), to = %step.to.display(), "renamed");
        applied.push(step.clone());
    }
    Ok(())
}

/// Rename every `from` to its `to` through collision-free scratch names.
///
/// Every source must exist and no scratch name may be occupied; both are
/// checked before touching disk. A failure while staging rolls the staged
/// renames back. A failure while committing cannot be rolled back safely and
/// is returned as `PartialRename`.
#[instrument(skip_all, fields(root = %root.display(), steps = steps.len()))]
pub fn apply_two_phase(root: &Path, steps: &[RenameRecord]) -> ChapterResult<()> {
    preflight(root, steps)?;

    let staged: Vec<RenameRecord> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| RenameRecord {
            from: step.from.clone(),
            to: root.join(scratch_name(index)),
        })
        .collect();

    let mut applied: Vec<RenameRecord> = Vec::with_capacity(steps.len() * 2);
    for stage in &staged {
        if let Err(source) = rename_no_clobber(&stage.from, &stage.to) {
            warn!(failed = %stage, error = %source, "staging failed, rolling back");
            return Err(roll_back_staging(stage.clone(), applied, source));
        }
        debug!(from = %stage.from.display(), to = %stage.to.display(), "staged");
        applied.push(stage.clone());
    }

    for (stage, step) in staged.iter().zip(steps) {
        let commit = RenameRecord {
            from: stage.to.clone(),
            to: step.to.clone(),
        };
        if let Err(source) = rename_no_clobber(&commit.from, &commit.to) {
            return Err(partial(commit, applied, source));
        }
        info!(from = %step.from.display(), to = %step.to.display(), "renamed");
        applied.push(commit);
    }
    Ok(())
}

fn preflight(root: &Path, steps: &[RenameRecord]) -> ChapterResult<()> {
    for step in steps {
        if !step.from.exists() {
            return Err(ChapterError::NotFound(step.from.display().to_string()));
        }
    }
    for index in 0..steps.len() {
        let scratch = root.join(scratch_name(index));
        if scratch.exists() {
            return Err(ChapterError::AlreadyExists(scratch));
        }
    }
    // A target that is not also being vacated would be clobbered at commit.
    for step in steps {
        if step.to.exists() && !steps.iter().any(|other| same_entry(&other.from, &step.to)) {
            return Err(ChapterError::AlreadyExists(step.to.clone()));
        }
    }
    Ok(())
}

fn roll_back_staging(
    failed: RenameRecord,
    applied: Vec<RenameRecord>,
    source: io::Error,
) -> ChapterError {
    let mut remaining = applied;
    while let Some(stage) = remaining.pop() {
        if let Err(rollback_err) = rename_no_clobber(&stage.to, &stage.from) {
            error!(
                rollback = %stage,
                error = %rollback_err,
                "rollback failed; scratch directories remain"
            );
            remaining.push(stage);
            return partial(failed, remaining, source);
        }
        debug!(from = %stage.to.display(), to = %stage.from.display(), "restored");
    }
    ChapterError::io(format!("stage {failed} (rolled back)"), source)
}

fn partial(failed: RenameRecord, applied: Vec<RenameRecord>, source: io::Error) -> ChapterError {
    error!(failed = %failed, error = %source, "rename sequence interrupted");
    for step in &applied {
        error!(applied = %step, "already applied");
    }
    ChapterError::PartialRename {
        failed,
        applied,
        source,
    }
}

/// `fs::rename` silently replaces empty directories on Unix; refuse instead.
fn rename_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() && !same_entry(from, to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }
    fs::rename(from, to)
}

/// Same directory entry, including case-only spellings on case-insensitive
/// filesystems.
fn same_entry(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
