//! CLI command implementations.
//!
//! Each command prints its product output to stdout and returns the exit
//! code to use; failures propagate as errors.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::types::BumpKind;
use crate::exit_codes;
use crate::io::bump::{BumpReport, bump_all, bump_chapters};
use crate::io::check::check_store;
use crate::io::config::{BookConfig, write_config};
use crate::io::lifecycle::{create_chapter, delete_chapter, insert_chapter};
use crate::io::paths::BookPaths;
use crate::io::reorder::reorder;
use crate::io::store::list_chapters;
use crate::io::word_count::{WordSummary, word_counts};
use crate::session::Session;
use crate::sync::{SyncOptions, sync};

/// Which chapters a bump applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpTarget {
    All,
    Chapters(Vec<u32>),
}

/// Output style for `words`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordsFormat {
    Table,
    TotalOnly,
    Csv,
}

/// List chapters with their latest version.
pub fn list(session: &Session, json: bool) -> Result<i32> {
    let entries = list_chapters(session.chapters_dir()).context("list chapters")?;
    if json {
        let payload = serde_json::to_string_pretty(&entries).context("serialize listing")?;
        println!("{payload}");
        return Ok(exit_codes::OK);
    }
    for entry in entries {
        let file = entry
            .markdown
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("Chapter {:2}: {:10} {}", entry.chapter, entry.version.to_string(), file);
    }
    Ok(exit_codes::OK)
}

/// Bump the selected chapters, reporting each result.
pub fn bump(session: &Session, kind: BumpKind, target: &BumpTarget) -> Result<i32> {
    let report = match target {
        BumpTarget::All => bump_all(session.chapters_dir(), kind).context("bump all chapters")?,
        BumpTarget::Chapters(numbers) => bump_chapters(session.chapters_dir(), numbers, kind),
    };
    print_bump_report(&report);
    if report.is_complete_success() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::PARTIAL)
    }
}

fn print_bump_report(report: &BumpReport) {
    for result in &report.results {
        match &result.outcome {
            Ok(bumped) => println!(
                "Chapter {}: {} -> {} ({})",
                result.chapter,
                bumped.previous,
                bumped.current,
                bumped.dir.display()
            ),
            Err(err) => println!("Chapter {}: error: {}", result.chapter, err),
        }
    }
    println!(
        "bumped {}/{} chapter(s)",
        report.succeeded(),
        report.results.len()
    );
}

/// Append a new chapter.
pub fn new_chapter(session: &Session) -> Result<i32> {
    let dir = create_chapter(session.chapters_dir()).context("create chapter")?;
    println!("created {}", dir.display());
    Ok(exit_codes::OK)
}

/// Insert a new chapter at `at`, shifting later chapters up.
pub fn insert(session: &Session, at: u32) -> Result<i32> {
    let dir = insert_chapter(session.chapters_dir(), at)
        .with_context(|| format!("insert chapter at {at}"))?;
    println!("created {}", dir.display());
    Ok(exit_codes::OK)
}

/// Delete a chapter and renumber the ones after it.
pub fn delete(session: &Session, number: u32) -> Result<i32> {
    delete_chapter(session.chapters_dir(), number)
        .with_context(|| format!("delete chapter {number}"))?;
    println!("deleted chapter {number}");
    Ok(exit_codes::OK)
}

/// Apply a new chapter order.
pub fn reorder_chapters(session: &Session, order: &[u32]) -> Result<i32> {
    reorder(session.chapters_dir(), order).context("reorder chapters")?;
    let rendered: Vec<String> = order.iter().map(u32::to_string).collect();
    println!("reordered chapters: {}", rendered.join(" "));
    Ok(exit_codes::OK)
}

/// Word counts of the latest version of each chapter.
pub fn words(session: &Session, format: WordsFormat) -> Result<i32> {
    let counts = word_counts(session.chapters_dir()).context("count words")?;
    if counts.is_empty() {
        bail!("no chapters with a usable latest version");
    }
    let summary = WordSummary::from_counts(&counts);
    match format {
        WordsFormat::Csv => {
            println!("Chapter,Version,Words");
            for c in &counts {
                println!("{},{},{}", c.chapter, c.version, c.words);
            }
        }
        WordsFormat::TotalOnly => println!("{}", group_thousands(summary.total)),
        WordsFormat::Table => {
            for c in &counts {
                println!(
                    "Chapter {:2} ({}): {:>9} words",
                    c.chapter,
                    c.version,
                    group_thousands(c.words)
                );
            }
            println!();
            println!("Total chapters: {}", summary.chapters);
            println!("Total words:    {}", group_thousands(summary.total));
            println!(
                "Average words:  {} per chapter",
                group_thousands(summary.average())
            );
        }
    }
    Ok(exit_codes::OK)
}

/// Report invariant violations without changing anything.
pub fn check(session: &Session) -> Result<i32> {
    let report = check_store(session.chapters_dir()).context("check chapters")?;
    if report.is_healthy() {
        println!("ok: {}", session.chapters_dir().display());
        return Ok(exit_codes::OK);
    }
    for finding in report.findings() {
        println!("problem: {finding}");
    }
    Ok(exit_codes::UNHEALTHY)
}

/// Commit (and optionally push) chapter changes.
pub fn sync_book(session: &Session, options: &SyncOptions) -> Result<i32> {
    let outcome = sync(session, options)?;
    if outcome.committed.is_empty() {
        println!("nothing to commit");
    } else {
        println!("committed {} file(s)", outcome.committed.len());
    }
    if outcome.pushed {
        println!("pushed to {}", session.config.git.remote);
    }
    Ok(exit_codes::OK)
}

/// Write a default `manuscript.toml` under `root`.
pub fn init_config(root: &Path, force: bool) -> Result<i32> {
    let path = BookPaths::new(root).config_path;
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    write_config(&path, &BookConfig::default())?;
    debug!(path = %path.display(), "wrote default config");
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

/// `1234567` -> `1,234,567`.
fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
