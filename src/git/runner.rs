//! git::runner
//!
//! The command execution boundary: the only place a git process is started.
//!
//! # Design
//!
//! [`CommandRunner`] is the seam between the reconciliation engine and the
//! operating system. The engine hands it a working directory and an argument
//! list; it gets back stdout and stderr, or a classified [`GitError`].
//! [`SystemGit`] is the real implementation; `git::mock::MockRunner` is the
//! scripted one used by unit tests.
//!
//! # Security
//!
//! Arguments may contain URLs with embedded credentials. The command text
//! that appears in logs and errors is always built with
//! [`redacted_command`], never from the raw arguments. Output captured into
//! errors and trace logs has its URLs redacted too; successful output is
//! returned as is for parsing.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use super::error::{FailureKind, GitError};
use crate::core::endpoint::{redact_urls, strip_credentials};

/// Captured output of a successful git command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout, lossily decoded
    pub output: String,
    /// stderr, lossily decoded (git writes progress here even on success)
    pub error: String,
}

impl CommandOutput {
    /// stdout with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.output.trim()
    }
}

/// Runs git with a working directory and an optional timeout.
///
/// Implementations must be usable from spawned tasks, so they are
/// `Send + Sync` and are shared as `Arc<dyn CommandRunner>`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run git with `args` inside `dir`.
    ///
    /// # Errors
    ///
    /// - [`GitError::ToolUnavailable`] if git cannot be started
    /// - [`GitError::NotARepo`] if `dir` does not exist
    /// - [`GitError::Timeout`] if `timeout` elapses first
    /// - [`GitError::CommandFailed`] on a non-zero exit
    async fn run(
        &self,
        dir: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, GitError>;
}

/// Runs the real git executable with `tokio::process`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
    default_timeout: Option<Duration>,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new("git")
    }
}

impl SystemGit {
    /// Use `program` (a name on `PATH` or an absolute path).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            default_timeout: None,
        }
    }

    /// Timeout applied when a call does not pass its own.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// The executable being run.
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl CommandRunner for SystemGit {
    async fn run(
        &self,
        dir: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, GitError> {
        let command = redacted_command(&self.program, args);
        if !dir.is_dir() {
            return Err(GitError::NotARepo {
                path: dir.to_path_buf(),
            });
        }

        let mut process = tokio::process::Command::new(&self.program);
        process
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            // Failure classification reads git's English diagnostics.
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            // Only a runner-level timeout drops this future; an abandoned fetch
            // attempt keeps being polled by its detached task.
            .kill_on_drop(true);

        debug!(path = %dir.display(), %command, "running git");

        let limit = timeout.or(self.default_timeout);
        let result = match limit {
            Some(after) => match tokio::time::timeout(after, process.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(GitError::Timeout {
                        command,
                        path: dir.to_path_buf(),
                        after,
                    })
                }
            },
            None => process.output().await,
        };

        let raw = result.map_err(|e| GitError::ToolUnavailable {
            program: self.program.clone(),
            message: e.to_string(),
        })?;

        let output = String::from_utf8_lossy(&raw.stdout).into_owned();
        let error = String::from_utf8_lossy(&raw.stderr).into_owned();
        trace!(
            %command,
            stdout = %redact_urls(&output),
            stderr = %redact_urls(&error),
            "git finished"
        );

        if raw.status.success() {
            return Ok(CommandOutput { output, error });
        }

        let kind = FailureKind::classify(&output, &error);
        let (output, error) = (redact_urls(&output), redact_urls(&error));
        let message = first_meaningful_line(&error)
            .or_else(|| first_meaningful_line(&output))
            .map(str::to_string)
            .unwrap_or_else(|| format!("exited with {}", raw.status));

        Err(GitError::CommandFailed {
            kind,
            message,
            command,
            output,
            error,
            path: dir.to_path_buf(),
        })
    }
}

/// Command text safe for logs and error messages.
///
/// ```
/// use reposync::git::runner::redacted_command;
///
/// let args = ["clone".to_string(), "https://tok@host/r.git".to_string(), ".".to_string()];
/// assert_eq!(redacted_command("git", &args), "git clone https://host/r.git .");
/// ```
pub fn redacted_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|arg| strip_credentials(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_meaningful_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}
