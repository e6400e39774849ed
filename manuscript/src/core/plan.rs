//! Renumbering plans for lifecycle and reorder operations.
//!
//! Plans are computed from chapter numbers alone; the `io` layer turns them
//! into directory renames.

use std::collections::BTreeSet;

use crate::error::{ChapterError, ChapterResult};

/// One chapter changing number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renumber {
    pub from: u32,
    pub to: u32,
}

/// Number for a chapter appended after every existing one.
pub fn next_chapter_number(existing: &[u32]) -> ChapterResult<u32> {
    let last = existing.iter().copied().max().unwrap_or(0);
    successor(last)
}

/// Close the gap left by `deleted`: every higher chapter moves down by one,
/// in ascending order so each target slot is already vacant.
pub fn shift_down_plan(existing: &[u32], deleted: u32) -> Vec<Renumber> {
    let mut higher: Vec<u32> = existing.iter().copied().filter(|n| *n > deleted).collect();
    higher.sort_unstable();
    higher.dedup();
    higher
        .into_iter()
        .map(|from| Renumber { from, to: from - 1 })
        .collect()
}

/// Open a slot at `at`: every chapter numbered `>= at` moves up by one.
pub fn shift_up_plan(existing: &[u32], at: u32) -> ChapterResult<Vec<Renumber>> {
    let mut moved: Vec<u32> = existing.iter().copied().filter(|n| *n >= at).collect();
    moved.sort_unstable();
    moved.dedup();
    moved
        .into_iter()
        .map(|from| Ok(Renumber { from, to: successor(from)? }))
        .collect()
}

fn successor(num: u32) -> ChapterResult<u32> {
    num.checked_add(1).ok_or_else(|| {
        ChapterError::InvalidOrder(format!("chapter {num} is the highest number available"))
    })
}

/// Position `i` of `new_order` becomes chapter `i + 1`.
///
/// Identity entries are kept; the rename executor decides whether to skip them.
pub fn reorder_plan(new_order: &[u32]) -> Vec<Renumber> {
    new_order
        .iter()
        .zip(1u32..)
        .map(|(&from, to)| Renumber { from, to })
        .collect()
}

/// Check that `new_order` lists every existing chapter exactly once.
pub fn validate_permutation(new_order: &[u32], existing: &[u32]) -> ChapterResult<()> {
    let existing: BTreeSet<u32> = existing.iter().copied().collect();
    let mut seen = BTreeSet::new();
    for &num in new_order {
        if !existing.contains(&num) {
            return Err(ChapterError::NotFound(format!("Chapter {num}")));
        }
        if !seen.insert(num) {
            return Err(ChapterError::InvalidOrder(format!(
                "chapter {num} listed more than once"
            )));
        }
    }
    let missing: Vec<String> = existing
        .difference(&seen)
        .map(|n| n.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ChapterError::InvalidOrder(format!(
            "order must list every chapter; missing {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Check that `at` is a valid insertion point for a store of `count` chapters.
pub fn validate_insert_position(at: u32, count: usize) -> ChapterResult<()> {
    let upper = count as u64 + 1;
    if at == 0 || u64::from(at) > upper {
        return Err(ChapterError::InvalidOrder(format!(
            "insert position {at} outside 1..={upper}"
        )));
    }
    Ok(())
}
