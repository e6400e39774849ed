//! Versioned chapter store for book manuscripts.
//!
//! A manuscript is a `Chapters/` directory of `Chapter {n}` directories, each
//! holding semantically-versioned snapshots (`v{major}.{minor}.{patch}/`) with
//! exactly one markdown file. The filesystem is the only source of truth.
//! The crate is split the usual way:
//!
//! - **[`core`]**: Pure, deterministic logic (name parsing, version bumps,
//!   renumbering plans, invariant checks). No I/O.
//! - **[`io`]**: Directory scans and mutations (bump, create, insert, delete,
//!   reorder) plus collaborators (config, git, word counts).
//!
//! Orchestration modules ([`session`], [`sync`], [`cli`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod cli;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
pub mod sync;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{ChapterError, ChapterResult};
