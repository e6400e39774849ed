//! Versioned chapter manager for book manuscripts.
//!
//! Keeps `Chapters/Chapter {n}/v{x.y.z}/` snapshots contiguous and
//! correctly versioned while chapters are bumped, added, removed, and
//! reordered.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use manuscript::cli::{self, BumpTarget, WordsFormat};
use manuscript::core::types::BumpKind;
use manuscript::exit_codes;
use manuscript::logging;
use manuscript::session::Session;
use manuscript::sync::SyncOptions;

#[derive(Parser)]
#[command(
    name = "manuscript",
    version,
    about = "Versioned chapter manager for book manuscripts"
)]
struct Cli {
    /// Book repository root (contains `Chapters/` and `manuscript.toml`).
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log renames and other progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List chapters with their latest version.
    List {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Copy the latest version of chapters into a new bumped version.
    Bump {
        #[arg(value_enum)]
        kind: BumpKind,
        /// Bump every chapter.
        #[arg(long, conflicts_with = "chapters")]
        all: bool,
        /// Chapter numbers to bump.
        #[arg(
            short = 'c',
            long = "chapter",
            num_args = 1..,
            required_unless_present = "all"
        )]
        chapters: Vec<u32>,
    },
    /// Append a new chapter seeded with v1.0.0.
    New,
    /// Insert a new chapter at a position, shifting later chapters up.
    Insert { position: u32 },
    /// Delete a chapter and renumber the chapters after it.
    Delete { chapter: u32 },
    /// Reorder chapters; `reorder 3 1 2` makes old chapter 3 the first.
    Reorder {
        #[arg(required = true, num_args = 1..)]
        order: Vec<u32>,
    },
    /// Word counts for the latest version of each chapter.
    Words {
        /// Print only the total.
        #[arg(long, conflicts_with = "csv")]
        total_only: bool,
        /// Print CSV (`Chapter,Version,Words`).
        #[arg(long)]
        csv: bool,
    },
    /// Report gaps, duplicates, and leftover scratch directories.
    Check,
    /// Commit chapter changes to git, optionally pushing.
    Sync {
        /// Commit message (defaults to `git.commit_message`).
        #[arg(short, long)]
        message: Option<String>,
        /// Push to the configured remote after committing.
        #[arg(long)]
        push: bool,
    },
    /// Write a default `manuscript.toml`.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let root = cli.root;
    let open = || Session::open(&root);
    match cli.command {
        Command::InitConfig { force } => cli::init_config(&root, force),
        Command::List { json } => cli::list(&open()?, json),
        Command::Bump {
            kind,
            all,
            chapters,
        } => {
            let target = if all {
                BumpTarget::All
            } else {
                BumpTarget::Chapters(chapters)
            };
            cli::bump(&open()?, kind, &target)
        }
        Command::New => cli::new_chapter(&open()?),
        Command::Insert { position } => cli::insert(&open()?, position),
        Command::Delete { chapter } => cli::delete(&open()?, chapter),
        Command::Reorder { order } => cli::reorder_chapters(&open()?, &order),
        Command::Words { total_only, csv } => {
            let format = if csv {
                WordsFormat::Csv
            } else if total_only {
                WordsFormat::TotalOnly
            } else {
                WordsFormat::Table
            };
            cli::words(&open()?, format)
        }
        Command::Check => cli::check(&open()?),
        Command::Sync { message, push } => {
            cli::sync_book(&open()?, &SyncOptions { message, push })
        }
    }
}
