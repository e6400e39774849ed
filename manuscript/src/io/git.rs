//! Git adapter for syncing the book repository.
//!
//! Chapter operations never touch git; callers commit and push afterwards.
//! We keep a small, explicit wrapper around `git` subprocess calls.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Bytes of `git push` stderr kept for the error message; the rest is drained.
const PUSH_STDERR_LIMIT: usize = 16 * 1024;

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// True if the working directory is inside a git work tree.
    pub fn is_repo(&self) -> Result<bool> {
        let out = self.run(&["rev-parse", "--is-inside-work-tree"])?;
        Ok(out.status.success() && String::from_utf8_lossy(&out.stdout).trim() == "true")
    }

    /// Stage the given paths (relative to the working directory).
    #[instrument(skip_all, fields(paths = paths.len()))]
    pub fn add_paths(&self, paths: &[&Path]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args: Vec<String> = vec!["add".to_string(), "--".to_string()];
        args.extend(paths.iter().map(|p| p.to_string_lossy().to_string()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_checked(&args)?;
        Ok(())
    }

    /// Paths currently staged for commit.
    pub fn staged_paths(&self) -> Result<Vec<String>> {
        let out = self.run_capture(&["diff", "--cached", "--name-only"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// True if there is anything staged for commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.staged_paths()?.is_empty())
    }

    /// Commit staged changes with a message.
    ///
    /// If there are no staged changes, this returns Ok(false) and does nothing.
    #[instrument(skip_all)]
    pub fn commit_staged(&self, message: &str) -> Result<bool> {
        if !self.has_staged_changes()? {
            debug!("no staged changes, skipping commit");
            return Ok(false);
        }
        debug!("committing staged changes");
        self.run_checked(&["commit", "-m", message])?;
        Ok(true)
    }

    /// Push the current branch to `remote`, killing git after `timeout`.
    ///
    /// Stderr is drained on a reader thread while waiting so chatty hooks
    /// cannot fill the pipe and stall the push.
    #[instrument(skip_all, fields(remote))]
    pub fn push(&self, remote: &str, timeout: Duration) -> Result<()> {
        let mut child = Command::new("git")
            .args(["push", remote, "HEAD"])
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("spawn git push")?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("git push stderr was not piped"))?;
        let reader = thread::spawn(move || read_limited(stderr, PUSH_STDERR_LIMIT));

        let status = match child.wait_timeout(timeout).context("wait for git push")? {
            Some(status) => status,
            None => {
                warn!(secs = timeout.as_secs(), "git push timed out");
                child.kill().context("kill git push")?;
                child.wait().context("wait git push")?;
                return Err(anyhow!(
                    "git push {remote} timed out after {}s",
                    timeout.as_secs()
                ));
            }
        };

        let stderr = match reader.join() {
            Ok(result) => result.context("read git push stderr")?,
            Err(_) => return Err(anyhow!("git push stderr reader panicked")),
        };
        if !status.success() {
            return Err(anyhow!(
                "git push {remote} failed: {}",
                String::from_utf8_lossy(&stderr).trim()
            ));
        }
        debug!("push complete");
        Ok(())
    }

    /// Initialize a new repository in the working directory.
    pub fn init(&self) -> Result<()> {
        self.run_checked(&["init", "-q"])?;
        Ok(())
    }

    /// Set the repository-local commit identity.
    pub fn set_identity(&self, name: &str, email: &str) -> Result<()> {
        self.run_checked(&["config", "user.name", name])?;
        self.run_checked(&["config", "user.email", email])?;
        Ok(())
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

/// Read `reader` to the end, keeping at most `limit` bytes.
fn read_limited<R: Read>(mut reader: R, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            return Ok(kept);
        }
        let room = limit.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn repo_with_commit(dir: &Path) -> Git {
        let git = Git::new(dir);
        git.init().expect("git init");
        git.set_identity("Author", "author@example.com")
            .expect("identity");
        fs::write(dir.join("notes.md"), "draft").expect("write");
        git.add_paths(&[Path::new("notes.md")]).expect("add");
        assert!(git.commit_staged("first draft").expect("commit"));
        git
    }

    fn bare_remote(git: &Git, bare: &Path) {
        let status = Command::new("git")
            .args(["init", "--bare", "-q"])
            .current_dir(bare)
            .status()
            .expect("git init --bare");
        assert!(status.success());
        let url = bare.to_string_lossy().to_string();
        git.run_checked(&["remote", "add", "origin", url.as_str()])
            .expect("remote add");
    }

    #[test]
    fn push_sends_current_branch() {
        let work = tempfile::tempdir().expect("work");
        let bare = tempfile::tempdir().expect("bare");
        let git = repo_with_commit(work.path());
        bare_remote(&git, bare.path());

        git.push("origin", Duration::from_secs(30)).expect("push");

        let local = git.run_capture(&["rev-parse", "HEAD"]).expect("local head");
        let remote = Git::new(bare.path())
            .run_capture(&["log", "--all", "--format=%H"])
            .expect("remote log");
        assert_eq!(remote.trim(), local.trim());
    }

    #[test]
    fn push_reports_missing_remote() {
        let work = tempfile::tempdir().expect("work");
        let git = repo_with_commit(work.path());
        let err = git
            .push("nowhere", Duration::from_secs(30))
            .expect_err("no remote");
        assert!(err.to_string().contains("git push nowhere failed"));
    }

    #[cfg(unix)]
    #[test]
    fn push_drains_large_hook_output() {
        use std::os::unix::fs::PermissionsExt;

        let work = tempfile::tempdir().expect("work");
        let bare = tempfile::tempdir().expect("bare");
        let git = repo_with_commit(work.path());
        bare_remote(&git, bare.path());

        // Far more than a pipe buffer, then reject the push.
        let hook = work.path().join(".git/hooks/pre-push");
        fs::write(
            &hook,
            "#!/bin/sh\nhead -c 262144 /dev/zero | tr '\\0' x 1>&2\nexit 1\n",
        )
        .expect("hook");
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).expect("chmod");

        let err = git
            .push("origin", Duration::from_secs(60))
            .expect_err("hook rejects");
        let msg = err.to_string();
        assert!(msg.contains("failed"), "{}", &msg[..msg.len().min(200)]);
        assert!(!msg.contains("timed out"));
        assert!(msg.len() <= PUSH_STDERR_LIMIT + 200);
    }

    #[test]
    fn read_limited_keeps_prefix_and_drains_rest() {
        let data = vec![b'x'; 50_000];
        let kept = read_limited(data.as_slice(), 1000).expect("read");
        assert_eq!(kept.len(), 1000);
    }
}
