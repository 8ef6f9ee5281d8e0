//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is given, output is machine-readable JSON on stdout.
//! Diagnostics go to stderr through `tracing`, never through here.

use std::fmt::Display;

use anyhow::Result;
use serde::Serialize;

use crate::core::types::Commit;
use crate::engine::MirrorReport;
use crate::git::WorkspaceState;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print `value` as pretty JSON. Shown even in quiet mode.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per commit: short hash, date, author, subject.
pub fn format_commit(commit: &Commit) -> String {
    format!(
        "{} {} {} {}",
        commit.hash.short(7),
        commit.timestamp.format("%Y-%m-%d"),
        commit.author,
        commit.message
    )
}

/// Human summary of a workspace state.
pub fn format_state(state: &WorkspaceState) -> String {
    let branch = match &state.branch {
        Some(branch) => branch.to_string(),
        None => "(detached)".to_string(),
    };
    let mut lines = vec![
        format!("path:   {}", state.path.display()),
        format!("branch: {branch}"),
        format!(
            "kind:   {}{}",
            if state.bare { "bare" } else { "working tree" },
            if state.dirty { ", dirty" } else { "" }
        ),
    ];
    for remote in &state.remotes {
        lines.push(format!(
            "remote: {} {}",
            remote.name,
            crate::core::endpoint::strip_credentials(&remote.url)
        ));
    }
    lines.join("\n")
}

/// Human summary of a mirror run.
pub fn format_report(report: &MirrorReport) -> String {
    let mut lines = vec![format!(
        "{} pruned, {} adopted, {} synchronized",
        report.pruned.len(),
        report.adopted.len(),
        report.synchronized.len()
    )];
    if !report.pruned.is_empty() {
        lines.push(format_list(&report.pruned, "  - "));
    }
    if !report.adopted.is_empty() {
        lines.push(format_list(&report.adopted, "  + "));
    }
    lines.join("\n")
}
