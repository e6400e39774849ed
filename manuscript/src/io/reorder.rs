//! Reorder chapters to match a caller-supplied sequence.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::core::plan::{reorder_plan, validate_permutation};
use crate::core::types::chapter_dir_name;
use crate::error::{ChapterResult, RenameRecord};
use crate::io::lifecycle::unique_dir;
use crate::io::rename::apply_two_phase;
use crate::io::store::scan_chapter_dirs;

/// Renumber chapters so that `new_order[i]` becomes chapter `i + 1`.
///
/// `new_order` must list every existing chapter exactly once; it is checked
/// before anything on disk changes. Chapters already in place under their
/// canonical name are left alone.
#[instrument(skip_all, fields(root = %root.display(), chapters = new_order.len()))]
pub fn reorder(root: &Path, new_order: &[u32]) -> ChapterResult<()> {
    let dirs = scan_chapter_dirs(root)?;
    let numbers: Vec<u32> = dirs.iter().map(|dir| dir.number).collect();
    validate_permutation(new_order, &numbers)?;

    let mut steps = Vec::new();
    for step in reorder_plan(new_order) {
        let from = unique_dir(&dirs, step.from)?;
        let to = root.join(chapter_dir_name(step.to));
        if from == to {
            debug!(chapter = step.from, "already in place");
            continue;
        }
        steps.push(RenameRecord { from, to });
    }

    if steps.is_empty() {
        debug!("order unchanged");
        return Ok(());
    }
    apply_two_phase(root, &steps)?;
    info!(moved = steps.len(), "reordered chapters");
    Ok(())
}
