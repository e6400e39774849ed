//! Error taxonomy for chapter store operations.
//!
//! Scans never surface these for individual bad entries (they skip and log);
//! targeted operations (bump, delete, reorder, insert) return them directly.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for chapter store operations.
pub type ChapterResult<T> = Result<T, ChapterError>;

/// A single directory rename performed (or attempted) by a multi-step operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl fmt::Display for RenameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from.display(), self.to.display())
    }
}

#[derive(Debug, Error)]
pub enum ChapterError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("ambiguous content in {dir}: {reason}")]
    AmbiguousContent { dir: PathBuf, reason: String },

    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid chapter order: {0}")]
    InvalidOrder(String),

    /// A multi-step rename stopped half way. `applied` lists the renames that
    /// are already on disk, in the order they happened.
    #[error(
        "rename {failed} failed after {} applied rename(s); tree needs manual repair",
        .applied.len()
    )]
    PartialRename {
        failed: RenameRecord,
        applied: Vec<RenameRecord>,
        #[source]
        source: io::Error,
    },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ChapterError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True for errors that mean "the referenced thing is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Attach a context message to a raw `io::Result`, mirroring `anyhow::Context`.
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> ChapterResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F, S>(self, f: F) -> ChapterResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| ChapterError::io(f(), source))
    }
}
