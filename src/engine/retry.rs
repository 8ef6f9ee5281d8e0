//! engine::retry
//!
//! Escalating-timeout retry for network-bound git work.
//!
//! # Design
//!
//! Attempt *n* (starting at 1) is spawned as its own task and raced against a
//! timer of `n × 50` time units. If the attempt finishes first, its result is
//! returned whatever it is. If the timer fires first the attempt is
//! **abandoned, not cancelled**: its `JoinHandle` is dropped, which detaches
//! the task, and the process it started keeps running to completion in the
//! background. A fresh attempt then starts with the next, longer timeout.
//!
//! By default there is no bound on the number of attempts. A bound can be
//! configured; it changes when the loop gives up, never the timeout formula.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use reposync::engine::retry::RetryPolicy;
//!
//! let policy = RetryPolicy::new(Duration::from_secs(1));
//! assert_eq!(policy.timeout_for(1), Duration::from_secs(50));
//! assert_eq!(policy.timeout_for(2), Duration::from_secs(100));
//! assert_eq!(policy.max_attempts(), None);
//! ```

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::git::runner::redacted_command;
use crate::git::{CommandOutput, Git, GitError};

/// Timeout schedule and optional attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    unit: Duration,
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// One time unit when nothing is configured.
    pub const DEFAULT_UNIT: Duration = Duration::from_secs(1);

    /// Attempt *n* times out after `n × TIMEOUT_FACTOR` units.
    pub const TIMEOUT_FACTOR: u32 = 50;

    /// Unbounded policy with the given time unit.
    pub fn new(unit: Duration) -> Self {
        Self {
            unit,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` timeouts (`None` retries forever).
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The time unit.
    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// The attempt bound, if any.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Timeout for the 1-based `attempt`.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.unit
            .saturating_mul(Self::TIMEOUT_FACTOR.saturating_mul(attempt.max(1)))
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_UNIT)
    }
}

/// Races units of work against the [`RetryPolicy`] schedule.
#[derive(Debug, Clone, Default)]
pub struct FetchCoordinator {
    policy: RetryPolicy,
}

impl FetchCoordinator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `work` until one attempt finishes inside its timeout.
    ///
    /// An attempt that ends in [`GitError::Timeout`] (the runner's
    /// per-command limit) counts as timed out and is retried as well.
    ///
    /// `work` is called with the attempt ordinal and must produce an owned
    /// future, because an abandoned attempt outlives this call. `what` and
    /// `path` only label log lines and the final timeout error.
    ///
    /// # Errors
    ///
    /// - Whatever the finishing attempt returned
    /// - [`GitError::Timeout`] when a configured attempt bound is reached
    /// - [`GitError::Task`] if an attempt panicked
    pub async fn run<F, Fut, T>(&self, what: &str, path: &Path, mut work: F) -> Result<T, GitError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, GitError>> + Send + 'static,
        T: Send + 'static,
    {
        let mut attempt: u32 = 1;
        loop {
            let limit = self.policy.timeout_for(attempt);
            debug!(path = %path.display(), attempt, timeout = ?limit, "{what}: starting attempt");

            let handle = tokio::spawn(work(attempt));
            match tokio::time::timeout(limit, handle).await {
                // The runner's own per-command limit fired inside the attempt.
                Ok(Ok(Err(GitError::Timeout { after, .. }))) => {
                    warn!(
                        path = %path.display(),
                        attempt,
                        command_timeout = ?after,
                        "{what}: attempt hit the command timeout, retrying"
                    );
                }
                Ok(Ok(result)) => return result,
                Ok(Err(join)) => return Err(GitError::Task(join.to_string())),
                Err(_) => {
                    // Dropping the handle detaches the task; it keeps running.
                    warn!(
                        path = %path.display(),
                        attempt,
                        timeout = ?limit,
                        "{what}: attempt timed out, abandoning it"
                    );
                }
            }
            if self.policy.exhausted(attempt) {
                return Err(GitError::Timeout {
                    command: what.to_string(),
                    path: path.to_path_buf(),
                    after: limit,
                });
            }
            attempt = attempt.saturating_add(1);
        }
    }

    /// `git fetch <args>` in the workspace under the retry schedule.
    pub async fn fetch(&self, git: &Git, args: &[&str]) -> Result<CommandOutput, GitError> {
        let argv: Vec<String> = std::iter::once("fetch")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        let label = redacted_command("git", &argv);

        self.run(&label, git.path(), |_| {
            let git = git.clone();
            let argv = argv.clone();
            async move { git.runner().run(git.path(), &argv, None).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::{sleep, Instant};

    use crate::git::{MockResponse, MockRunner};

    const UNIT: Duration = Duration::from_millis(1);

    fn coordinator(max_attempts: Option<u32>) -> FetchCoordinator {
        FetchCoordinator::new(RetryPolicy::new(UNIT).with_max_attempts(max_attempts))
    }

    #[test]
    fn timeouts_escalate_linearly() {
        let policy = RetryPolicy::default();
        for n in 1..=10 {
            assert_eq!(policy.timeout_for(n), Duration::from_secs(50 * u64::from(n)));
        }
    }

    #[test]
    fn timeout_saturates() {
        let policy = RetryPolicy::new(Duration::MAX);
        assert_eq!(policy.timeout_for(u32::MAX), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn first_result_is_returned_even_if_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let result: Result<(), GitError> = coordinator(None)
            .run("fetch", Path::new("/ws"), move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                async { Err(GitError::Configuration("boom".into())) }
            })
            .await;
        assert!(matches!(result, Err(GitError::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempts_are_retried_with_longer_timeouts() {
        let start = Instant::now();
        let result = coordinator(None)
            .run("fetch", Path::new("/ws"), |attempt| async move {
                if attempt < 3 {
                    std::future::pending::<()>().await;
                }
                Ok(attempt)
            })
            .await
            .unwrap();

        assert_eq!(result, 3);
        // 50 + 100 units spent on the two abandoned attempts.
        assert_eq!(start.elapsed(), UNIT * 150);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_attempt_keeps_running() {
        let first_finished = Arc::new(AtomicBool::new(false));
        let flag = first_finished.clone();

        let result = coordinator(None)
            .run("fetch", Path::new("/ws"), move |attempt| {
                let flag = flag.clone();
                async move {
                    if attempt == 1 {
                        sleep(UNIT * 70).await;
                        flag.store(true, Ordering::SeqCst);
                        Ok(1)
                    } else {
                        sleep(UNIT * 80).await;
                        Ok(attempt)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 2);
        assert!(first_finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn bound_surfaces_timeout() {
        let start = Instant::now();
        let err = coordinator(Some(2))
            .run("git fetch origin", Path::new("/ws"), |_| async {
                std::future::pending::<Result<(), GitError>>().await
            })
            .await
            .unwrap_err();

        match err {
            GitError::Timeout { command, after, .. } => {
                assert_eq!(command, "git fetch origin");
                assert_eq!(after, UNIT * 100);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(start.elapsed(), UNIT * 150);
    }

    #[tokio::test(start_paused = true)]
    async fn command_timeout_inside_attempt_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let result = coordinator(None)
            .run("git fetch origin", Path::new("/ws"), move |attempt| {
                seen.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 1 {
                        return Err(GitError::Timeout {
                            command: "git fetch origin".into(),
                            path: "/ws".into(),
                            after: Duration::from_secs(600),
                        });
                    }
                    Ok(attempt)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn command_timeouts_count_against_the_bound() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let err = coordinator(Some(3))
            .run("git fetch origin", Path::new("/ws"), move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(GitError::Timeout {
                        command: "git fetch origin".into(),
                        path: "/ws".into(),
                        after: Duration::from_secs(600),
                    })
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GitError::Timeout { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_retries_after_runner_timeout() {
        let mock = MockRunner::new();
        mock.respond_once(&["fetch"], MockResponse::TimedOut(Duration::from_secs(600)));
        mock.respond(&["fetch"], MockResponse::ok(""));
        let git = Git::new(Arc::new(mock.clone()), "/ws");

        coordinator(None).fetch(&git, &["origin"]).await.unwrap();

        assert_eq!(mock.count(&["fetch", "origin"]), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_retries_a_hanging_git() {
        let mock = MockRunner::new();
        mock.respond_once(&["fetch"], MockResponse::Hang);
        mock.respond(&["fetch"], MockResponse::ok(""));
        let git = Git::new(Arc::new(mock.clone()), "/ws");

        coordinator(None).fetch(&git, &["origin", "--prune"]).await.unwrap();

        assert_eq!(mock.count(&["fetch", "origin", "--prune"]), 2);
        assert!(mock.detailed_calls().iter().all(|c| c.timeout.is_none()));
    }
}
