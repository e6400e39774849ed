//! Word counts over the latest version of every chapter.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::core::types::Version;
use crate::core::words::count_words;
use crate::error::{ChapterResult, IoContext};
use crate::io::store::{ensure_chapters_root, list_chapters};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterWords {
    pub chapter: u32,
    pub version: Version,
    pub words: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSummary {
    pub chapters: usize,
    pub total: usize,
}

impl WordSummary {
    pub fn from_counts(counts: &[ChapterWords]) -> Self {
        Self {
            chapters: counts.len(),
            total: counts.iter().map(|c| c.words).sum(),
        }
    }

    /// Average words per chapter, rounded to the nearest word.
    pub fn average(&self) -> usize {
        if self.chapters == 0 {
            return 0;
        }
        (self.total + self.chapters / 2) / self.chapters
    }
}

/// Count words in each listed chapter's latest markdown file.
pub fn word_counts(root: &Path) -> ChapterResult<Vec<ChapterWords>> {
    ensure_chapters_root(root)?;
    let mut counts = Vec::new();
    for entry in list_chapters(root)? {
        let contents = fs::read_to_string(&entry.markdown)
            .io_context(|| format!("read {}", entry.markdown.display()))?;
        let words = count_words(&contents);
        debug!(chapter = entry.chapter, words, "counted words");
        counts.push(ChapterWords {
            chapter: entry.chapter,
            version: entry.version,
            words,
        });
    }
    Ok(counts)
}
