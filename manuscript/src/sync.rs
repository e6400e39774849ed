//! Commit (and optionally push) chapter changes after a mutating command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::io::git::Git;
use crate::session::Session;

/// Options for [`sync`].
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Commit message; falls back to `git.commit_message` from config.
    pub message: Option<String>,
    /// Push to the configured remote after committing.
    pub push: bool,
}

/// What [`sync`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Files included in the commit (empty when nothing changed).
    pub committed: Vec<String>,
    pub pushed: bool,
}

/// Stage the chapters directory plus configured extra paths, commit if
/// anything changed, then push when asked.
#[instrument(skip_all, fields(root = %session.paths.root.display(), push = options.push))]
pub fn sync(session: &Session, options: &SyncOptions) -> Result<SyncOutcome> {
    let root = &session.paths.root;
    let git = Git::new(root);
    if !git.is_repo().context("check git repository")? {
        bail!("{} is not a git repository", root.display());
    }

    let chapters = relative_to(root, &session.paths.chapters_dir);
    let mut paths = Vec::new();
    let extra = session.config.git.add_paths.iter().map(PathBuf::as_path);
    for path in std::iter::once(chapters).chain(extra) {
        if root.join(path).exists() {
            paths.push(path);
        } else {
            debug!(path = %path.display(), "not on disk, not staged");
        }
    }
    git.add_paths(&paths).context("stage book changes")?;

    let committed = git.staged_paths().context("list staged changes")?;
    let message = options
        .message
        .as_deref()
        .unwrap_or(&session.config.git.commit_message);
    if git.commit_staged(message).context("commit book changes")? {
        info!(files = committed.len(), "committed book changes");
    }

    let mut pushed = false;
    if options.push {
        let timeout = Duration::from_secs(session.config.git.push_timeout_secs);
        git.push(&session.config.git.remote, timeout)
            .context("push book changes")?;
        pushed = true;
    }

    Ok(SyncOutcome { committed, pushed })
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::io::lifecycle::create_chapter;
    use crate::test_support::BookFixture;

    fn git_book() -> (BookFixture, Git) {
        let book = BookFixture::new().expect("fixture");
        let git = Git::new(book.root());
        git.init().expect("git init");
        git.set_identity("Author", "author@example.com")
            .expect("identity");
        (book, git)
    }

    #[test]
    fn commits_chapters_and_planning() {
        let (book, git) = git_book();
        create_chapter(book.chapters_dir()).expect("create");
        fs::create_dir_all(book.root().join("planning")).expect("planning");
        fs::write(book.root().join("planning/outline.md"), "plan").expect("outline");
        fs::write(book.root().join("scratch.txt"), "not staged").expect("scratch");

        let session = Session::open(book.root()).expect("session");
        let outcome = sync(&session, &SyncOptions::default()).expect("sync");

        assert_eq!(
            outcome.committed,
            vec![
                "Chapters/Chapter 1/v1.0.0/v1.0.0.md".to_string(),
                "planning/outline.md".to_string(),
            ]
        );
        assert!(!outcome.pushed);
        assert!(!git.has_staged_changes().expect("staged"));
    }

    #[test]
    fn missing_chapters_dir_is_skipped() {
        let (book, _git) = git_book();
        fs::remove_dir(book.chapters_dir()).expect("remove chapters");
        fs::create_dir_all(book.root().join("planning")).expect("planning");
        fs::write(book.root().join("planning/outline.md"), "plan").expect("outline");

        let session = Session::open(book.root()).expect("session");
        let outcome = sync(&session, &SyncOptions::default()).expect("sync");
        assert_eq!(outcome.committed, vec!["planning/outline.md".to_string()]);
    }

    #[test]
    fn nothing_to_commit_is_not_an_error() {
        let (book, _git) = git_book();
        let session = Session::open(book.root()).expect("session");
        let outcome = sync(&session, &SyncOptions::default()).expect("sync");
        assert!(outcome.committed.is_empty());
    }

    #[test]
    fn refuses_outside_git_repository() {
        let book = BookFixture::new().expect("fixture");
        let session = Session::open(book.root()).expect("session");
        let err = sync(&session, &SyncOptions::default()).expect_err("not a repo");
        assert!(format!("{err:#}").contains("not a git repository"));
    }
}
