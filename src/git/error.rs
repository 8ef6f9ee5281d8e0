//! git::error
//!
//! Typed failures from the git doorway.
//!
//! Every failure that came out of a git process carries the redacted command
//! line, its stdout, its stderr and the working directory, so a caller can
//! diagnose it without re-running anything. The [`FailureKind`] is derived
//! from the process text and is what the reconciler branches on.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::types::TypeError;

/// What a failed git command was complaining about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The directory is not (inside) a repository.
    NotARepository,
    /// A revision or ref could not be resolved.
    UnknownRevision,
    /// The named remote is not configured.
    NoSuchRemote,
    /// `checkout -b` hit an existing branch of that name.
    BranchExists,
    /// `commit` found nothing staged.
    NothingToCommit,
    /// The remote refused a non-fast-forward push.
    PushRejected,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Classify a failure from the process output.
    ///
    /// Git writes most diagnostics to stderr, but `commit` reports "nothing
    /// to commit" on stdout, so both streams are inspected.
    ///
    /// ```
    /// use reposync::git::FailureKind;
    ///
    /// let kind = FailureKind::classify("", "fatal: not a git repository (or any of the parent directories): .git");
    /// assert_eq!(kind, FailureKind::NotARepository);
    /// ```
    pub fn classify(output: &str, error: &str) -> Self {
        let text = format!("{error}\n{output}").to_ascii_lowercase();
        let has = |needle: &str| text.contains(needle);

        if has("not a git repository") {
            FailureKind::NotARepository
        } else if has("unknown revision")
            || has("ambiguous argument")
            || has("not a valid object name")
            || has("invalid reference")
            || has("couldn't find remote ref")
        {
            FailureKind::UnknownRevision
        } else if has("no such remote") {
            FailureKind::NoSuchRemote
        } else if has("a branch named") && has("already exists") {
            FailureKind::BranchExists
        } else if has("nothing to commit")
            || has("nothing added to commit")
            || has("no changes added to commit")
        {
            FailureKind::NothingToCommit
        } else if has("[rejected]") || has("non-fast-forward") || has("updates were rejected") {
            FailureKind::PushRejected
        } else {
            FailureKind::Other
        }
    }
}

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable is missing or could not be started.
    #[error("cannot run '{program}': {message}")]
    ToolUnavailable {
        /// The executable that was invoked
        program: String,
        /// Why it could not start
        message: String,
    },

    /// The directory does not exist or is not a repository.
    #[error("not a git repository: {}", path.display())]
    NotARepo {
        /// The directory that was inspected
        path: PathBuf,
    },

    /// A git process exited unsuccessfully.
    #[error("`{command}` failed in {}: {message}", path.display())]
    CommandFailed {
        /// Classification of the failure
        kind: FailureKind,
        /// First meaningful line of the diagnostics
        message: String,
        /// The command line, with credentials stripped
        command: String,
        /// Captured stdout
        output: String,
        /// Captured stderr
        error: String,
        /// Working directory
        path: PathBuf,
    },

    /// A git process did not finish in time.
    #[error("`{command}` timed out after {after:?} in {}", path.display())]
    Timeout {
        /// The command line, with credentials stripped
        command: String,
        /// Working directory
        path: PathBuf,
        /// The limit that elapsed
        after: Duration,
    },

    /// The workspace is a checkout of some other repository.
    #[error("{} tracks '{actual}', expected '{expected}'", path.display())]
    RemoteMismatch {
        /// Workspace directory
        path: PathBuf,
        /// Requested endpoint (redacted)
        expected: String,
        /// Recorded remote URL (redacted)
        actual: String,
    },

    /// Unsupported clone mode, malformed endpoint and similar.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Git output did not have the expected shape.
    #[error("could not parse {what}: {message}")]
    Parse {
        /// Which query produced the output
        what: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Filesystem work around a git command failed.
    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        /// Path being touched
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A spawned unit of work panicked or was cancelled by the runtime.
    #[error("background task failed: {0}")]
    Task(String),
}

impl GitError {
    /// The failure classification, for command failures.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            GitError::CommandFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this failure means "this directory is not a usable checkout of
    /// the requested repository".
    ///
    /// The reconciler answers these by wiping the directory and cloning
    /// afresh. Everything else propagates.
    pub fn is_locally_recoverable(&self) -> bool {
        match self {
            GitError::NotARepo { .. } | GitError::RemoteMismatch { .. } => true,
            GitError::CommandFailed { kind, .. } => matches!(
                kind,
                FailureKind::NotARepository
                    | FailureKind::UnknownRevision
                    | FailureKind::NoSuchRemote
            ),
            _ => false,
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidEndpoint(_) | TypeError::UnsupportedCloneMode(_) => {
                GitError::Configuration(err.to_string())
            }
            TypeError::InvalidBranchName(_) | TypeError::InvalidOid(_) => GitError::Parse {
                what: "git output",
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(kind: FailureKind) -> GitError {
        GitError::CommandFailed {
            kind,
            message: "boom".into(),
            command: "git status".into(),
            output: String::new(),
            error: "boom".into(),
            path: PathBuf::from("/tmp/ws"),
        }
    }

    #[test]
    fn classify_known_messages() {
        let cases = [
            ("fatal: not a git repository: '/x'", FailureKind::NotARepository),
            (
                "fatal: ambiguous argument 'origin/nope': unknown revision or path not in the working tree.",
                FailureKind::UnknownRevision,
            ),
            ("error: No such remote 'origin'", FailureKind::NoSuchRemote),
            ("fatal: a branch named 'dev' already exists", FailureKind::BranchExists),
            (
                " ! [rejected]        main -> main (fetch first)\nerror: failed to push some refs",
                FailureKind::PushRejected,
            ),
            ("fatal: unable to access 'https://x/': Could not resolve host", FailureKind::Other),
        ];
        for (stderr, expected) in cases {
            assert_eq!(FailureKind::classify("", stderr), expected, "{stderr}");
        }
    }

    #[test]
    fn nothing_to_commit_is_read_from_stdout() {
        let kind = FailureKind::classify("On branch main\nnothing to commit, working tree clean\n", "");
        assert_eq!(kind, FailureKind::NothingToCommit);
    }

    #[test]
    fn recoverable_set() {
        assert!(failed(FailureKind::NotARepository).is_locally_recoverable());
        assert!(failed(FailureKind::UnknownRevision).is_locally_recoverable());
        assert!(failed(FailureKind::NoSuchRemote).is_locally_recoverable());
        assert!(!failed(FailureKind::Other).is_locally_recoverable());
        assert!(!failed(FailureKind::PushRejected).is_locally_recoverable());
        assert!(GitError::NotARepo { path: "/x".into() }.is_locally_recoverable());
        assert!(GitError::RemoteMismatch {
            path: "/x".into(),
            expected: "a".into(),
            actual: "b".into(),
        }
        .is_locally_recoverable());
        assert!(!GitError::Configuration("bad".into()).is_locally_recoverable());
        assert!(!GitError::ToolUnavailable {
            program: "git".into(),
            message: "not found".into(),
        }
        .is_locally_recoverable());
    }

    #[test]
    fn display_carries_command_and_path() {
        let text = failed(FailureKind::Other).to_string();
        assert!(text.contains("git status"));
        assert!(text.contains("/tmp/ws"));
    }

    #[test]
    fn type_errors_map_to_taxonomy() {
        let err: GitError = TypeError::UnsupportedCloneMode("x".into()).into();
        assert!(matches!(err, GitError::Configuration(_)));
        let err: GitError = TypeError::InvalidOid("x".into()).into();
        assert!(matches!(err, GitError::Parse { .. }));
    }
}
