//! Terminal output formatting utilities.
//!
//! Command results go to stdout, problems go to stderr. `--quiet` silences
//! the chatty levels but never errors, warnings or essential output.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::{ColoredString, Colorize};
use twig_store::ObjectId;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warn,
    Error,
}

impl Level {
    fn marker(self) -> ColoredString {
        match self {
            Self::Success => "✓".green(),
            Self::Info => "→".blue(),
            Self::Warn => "!".yellow(),
            Self::Error => "✗".red(),
        }
    }

    const fn is_problem(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

fn emit(level: Level, msg: &str) {
    if level.is_problem() {
        eprintln!("{} {msg}", level.marker());
    } else if !is_quiet() {
        println!("{} {msg}", level.marker());
    }
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    emit(Level::Success, msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    emit(Level::Info, msg);
}

/// Print a warning to stderr.
pub fn warn(msg: &str) {
    emit(Level::Warn, msg);
}

/// Print an error to stderr.
pub fn error(msg: &str) {
    emit(Level::Error, msg);
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print the output a command exists for, like a log or a status listing.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Abbreviated commit id for result messages.
#[must_use]
pub fn commit_ref(id: &ObjectId) -> String {
    id.short().yellow().to_string()
}

/// Indented list of files left with conflict markers.
#[must_use]
pub fn conflict_list(files: &[String]) -> String {
    files
        .iter()
        .map(|file| format!("  both modified: {file}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A status section header, e.g. `=== Branches ===`.
#[must_use]
pub fn section(title: &str) -> String {
    format!("=== {title} ===")
}

/// A branch name in the branch listing; the current one is starred.
#[must_use]
pub fn branch_entry(name: &str, is_current: bool) -> String {
    if is_current {
        format!("*{name}")
    } else {
        name.to_string()
    }
}
