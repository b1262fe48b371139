//! Topiary - Command Line Entry Point
//!
//! Batch access to the engine: diff two revisions, audit a document, or
//! renumber its sort keys in place.

use clap::{Parser, Subcommand};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use topiary::config::{load_config, save_config_silent, Settings};
use topiary::diff::{diff_lines_with_window, render, DiffSummary};
use topiary::{ContentType, EditorState, Error, Result};

#[derive(Parser)]
#[command(
    name = "topiary",
    about = "Edit and compare topic taxonomy documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare two revisions line by line
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Lines to search ahead for a resync point (defaults to the setting)
        #[arg(long)]
        window: Option<usize>,
    },
    /// Report invariant violations in a document
    Check {
        #[arg(value_parser = parse_content_type)]
        content_type: ContentType,
        file: PathBuf,
    },
    /// Renumber every sort key of a document and write it back
    Renumber {
        #[arg(value_parser = parse_content_type)]
        content_type: ContentType,
        file: PathBuf,
        /// Print the result instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_content_type(name: &str) -> std::result::Result<ContentType, String> {
    ContentType::from_name(name)
        .ok_or_else(|| format!("unknown content type '{}' (expected topics or filters)", name))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = load_config();

    let result = match cli.command {
        Command::Diff { old, new, window } => run_diff(&settings, &old, &new, window),
        Command::Check { content_type, file } => run_check(&settings, content_type, &file),
        Command::Renumber {
            content_type,
            file,
            dry_run,
        } => run_renumber(&mut settings, content_type, &file, dry_run),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Print the diff; succeeds when the revisions are identical.
fn run_diff(settings: &Settings, old: &Path, new: &Path, window: Option<usize>) -> Result<bool> {
    let old_text = read_file(old)?;
    let new_text = read_file(new)?;
    let window = window.unwrap_or(settings.diff_lookahead).max(1);

    let left: Vec<&str> = old_text.lines().collect();
    let right: Vec<&str> = new_text.lines().collect();
    let rows = diff_lines_with_window(&left, &right, window);
    let summary = DiffSummary::from_rows(&rows);

    print!("{}", render(&rows));
    println!(
        "{} same, {} added, {} removed, {} changed",
        summary.same, summary.added, summary.removed, summary.changed
    );
    Ok(summary.is_identical())
}

/// Print every violation; succeeds when there are none.
fn run_check(settings: &Settings, content_type: ContentType, file: &Path) -> Result<bool> {
    let state = open_document(settings, content_type, file)?;
    let violations = state.validate()?;
    for violation in &violations {
        println!("{}: {}", file.display(), violation);
    }
    info!(
        "Checked {}: {} violation(s)",
        file.display(),
        violations.len()
    );
    Ok(violations.is_empty())
}

fn run_renumber(
    settings: &mut Settings,
    content_type: ContentType,
    file: &Path,
    dry_run: bool,
) -> Result<bool> {
    let mut state = open_document(settings, content_type, file)?;
    let before = state.document().cloned();
    state.renumber()?;

    if dry_run {
        println!("{}", state.buffer());
        return Ok(true);
    }
    // Compare trees, not text: the buffer is always pretty-printed.
    if state.document() == before.as_ref() {
        info!("{} is already numbered", file.display());
        return Ok(true);
    }

    write_file_atomic(file, &format!("{}\n", state.buffer()))?;
    settings.add_recent_document(file.to_path_buf());
    save_config_silent(settings);
    info!("Renumbered {}", file.display());
    Ok(true)
}

// ─────────────────────────────────────────────────────────────────────────────
// File Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn open_document(settings: &Settings, content_type: ContentType, file: &Path) -> Result<EditorState> {
    let text = read_file(file)?;
    let mut state = EditorState::new(content_type, settings.clone());
    if !state.load(&text) {
        let message = state.parse_error().unwrap_or_default().to_string();
        return Err(Error::Shape(format!("{}: {}", file.display(), message)));
    }
    Ok(state)
}

fn read_file(path: &Path) -> Result<String> {
    debug!("Reading {}", path.display());
    fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write through a sibling backup file and rename it over `path`.
fn write_file_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);

    fs::write(&backup, contents).map_err(|source| Error::FileWrite {
        path: backup.clone(),
        source,
    })?;
    fs::rename(&backup, path).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
