//! git::mock
//!
//! Scripted command runner for deterministic testing.
//!
//! # Design
//!
//! `MockRunner` implements [`CommandRunner`] without starting processes.
//! Responses are matched on an argument prefix: one-shot responses are
//! consumed first in the order they were queued, then the persistent rule
//! with the longest matching prefix applies. Unmatched commands succeed with
//! empty output. Every call is recorded for verification.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use reposync::git::{Git, MockResponse, MockRunner};
//!
//! # tokio_test_block_on(async {
//! let mock = MockRunner::new();
//! mock.respond(&["branch", "--show-current"], MockResponse::ok("main\n"));
//!
//! let git = Git::new(Arc::new(mock.clone()), "/ws");
//! let branch = git.current_branch().await.unwrap();
//! assert_eq!(branch.unwrap().as_str(), "main");
//! assert!(mock.was_called(&["branch", "--show-current"]));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::error::{FailureKind, GitError};
use super::runner::{redacted_command, CommandOutput, CommandRunner};

/// What a scripted command does.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Exit zero with this stdout.
    Ok(String),
    /// Exit non-zero with this stdout and stderr; the kind is classified
    /// from the text the same way real failures are.
    Fail {
        /// stdout
        output: String,
        /// stderr
        error: String,
    },
    /// Never finish.
    Hang,
    /// Fail the way a runner does when its own command timeout fires.
    TimedOut(Duration),
}

impl MockResponse {
    /// Success with `stdout`.
    pub fn ok(stdout: impl Into<String>) -> Self {
        MockResponse::Ok(stdout.into())
    }

    /// Failure with `stderr`.
    pub fn fail(stderr: impl Into<String>) -> Self {
        MockResponse::Fail {
            output: String::new(),
            error: stderr.into(),
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Working directory
    pub dir: PathBuf,
    /// Arguments
    pub args: Vec<String>,
    /// Timeout passed by the caller
    pub timeout: Option<Duration>,
}

/// Mock runner for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    inner: Arc<Mutex<MockRunnerInner>>,
}

#[derive(Debug, Default)]
struct MockRunnerInner {
    /// Persistent rules, matched by longest prefix.
    rules: Vec<(Vec<String>, MockResponse)>,
    /// One-shot rules, consumed in order.
    once: VecDeque<(Vec<String>, MockResponse)>,
    /// Recorded calls.
    calls: Vec<MockCall>,
}

fn owned(prefix: &[&str]) -> Vec<String> {
    prefix.iter().map(|s| s.to_string()).collect()
}

fn has_prefix(args: &[String], prefix: &[String]) -> bool {
    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p)
}

impl MockRunner {
    /// Create a runner where every command succeeds with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockRunnerInner> {
        // A panicking test thread must not hide the recorded calls.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answer every command starting with `prefix` with `response`.
    pub fn respond(&self, prefix: &[&str], response: MockResponse) {
        self.lock().rules.push((owned(prefix), response));
    }

    /// Answer the next command starting with `prefix` with `response`.
    pub fn respond_once(&self, prefix: &[&str], response: MockResponse) {
        self.lock().once.push_back((owned(prefix), response));
    }

    /// All recorded argument lists, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.lock().calls.iter().map(|c| c.args.clone()).collect()
    }

    /// All recorded calls with directory and timeout.
    pub fn detailed_calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Whether any recorded call starts with `prefix`.
    pub fn was_called(&self, prefix: &[&str]) -> bool {
        self.count(prefix) > 0
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn count(&self, prefix: &[&str]) -> usize {
        let prefix = owned(prefix);
        self.lock()
            .calls
            .iter()
            .filter(|c| has_prefix(&c.args, &prefix))
            .count()
    }

    /// Clear recorded calls, keeping the rules.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn pick(&self, dir: &Path, args: &[String], timeout: Option<Duration>) -> MockResponse {
        let mut inner = self.lock();
        inner.calls.push(MockCall {
            dir: dir.to_path_buf(),
            args: args.to_vec(),
            timeout,
        });

        if let Some(index) = inner.once.iter().position(|(p, _)| has_prefix(args, p)) {
            if let Some((_, response)) = inner.once.remove(index) {
                return response;
            }
        }

        // `max_by_key` keeps the last of equal keys, so later rules win ties.
        inner
            .rules
            .iter()
            .filter(|(p, _)| has_prefix(args, p))
            .max_by_key(|(p, _)| p.len())
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| MockResponse::ok(""))
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        dir: &Path,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, GitError> {
        match self.pick(dir, args, timeout) {
            MockResponse::Ok(output) => Ok(CommandOutput {
                output,
                error: String::new(),
            }),
            MockResponse::Fail { output, error } => Err(GitError::CommandFailed {
                kind: FailureKind::classify(&output, &error),
                message: error.lines().next().unwrap_or_default().to_string(),
                command: redacted_command("git", args),
                output,
                error,
                path: dir.to_path_buf(),
            }),
            MockResponse::Hang => std::future::pending().await,
            MockResponse::TimedOut(after) => Err(GitError::Timeout {
                command: redacted_command("git", args),
                path: dir.to_path_buf(),
                after,
            }),
        }
    }
}
