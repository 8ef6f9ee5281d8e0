//! engine::reconcile
//!
//! Converges a directory to a desired (endpoint, branch, clone mode) state.
//!
//! # Algorithm
//!
//! [`Reconciler::reset_repo`] tries the cheapest path first:
//!
//! ```text
//! remote get-url origin ──mismatch──────────────┐
//!        │                                      │
//!   is bare? ──yes── fetch +HEAD:HEAD           │
//!        │no                                    ▼
//!   reset --hard, clean -ffdx          wipe dir + clone
//!   switch branch (keep content)                ▲
//!   fetch origin                                │
//!   reset --hard origin/<branch|HEAD> ─unknown──┘
//! ```
//!
//! Only failures meaning "this is not a usable checkout of that repository"
//! (see [`GitError::is_locally_recoverable`]) lead to the wipe-and-clone
//! fallback. Everything else is logged and returned.
//!
//! # Security
//!
//! An optional [`Credential`] is embedded into HTTP(S) URLs handed to
//! `clone` and to the push remote. Logs and errors only ever see
//! [`Endpoint::redacted`].

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::retry::FetchCoordinator;
use crate::core::clone_mode::CloneMode;
use crate::core::config::schema::{DEFAULT_ORIGIN_REMOTE, DEFAULT_PUSH_REMOTE};
use crate::core::config::Config;
use crate::core::endpoint::{strip_credentials, Credential, Endpoint};
use crate::core::types::BranchName;
use crate::git::{CommandRunner, FailureKind, Git, GitError, SystemGit};

/// Which path `reset_repo` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Working tree reset and cleaned in place.
    Reset,
    /// Bare repository: the HEAD branch was fetched.
    BareUpdated,
    /// Directory wiped and cloned afresh.
    Recloned,
}

/// What `switch_to_branch` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// Already on the branch; nothing ran.
    AlreadyOn,
    /// New branch created at HEAD.
    Created,
    /// Existing branch deleted and recreated at HEAD.
    Recreated,
    /// Existing branch checked out with its own content.
    CheckedOut,
}

/// Result of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushOutcome {
    Pushed,
    /// The remote refused a non-fast-forward update.
    Rejected,
}

/// The workspace reconciliation state machine.
///
/// Collaborators are injected: the runner decides how git is executed and
/// the coordinator decides how network fetches are retried.
#[derive(Clone)]
pub struct Reconciler {
    runner: Arc<dyn CommandRunner>,
    coordinator: FetchCoordinator,
    origin_remote: String,
    push_remote: String,
    credential: Option<Credential>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("coordinator", &self.coordinator)
            .field("origin_remote", &self.origin_remote)
            .field("push_remote", &self.push_remote)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Reconciler with default remotes and retry policy.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            coordinator: FetchCoordinator::default(),
            origin_remote: DEFAULT_ORIGIN_REMOTE.to_string(),
            push_remote: DEFAULT_PUSH_REMOTE.to_string(),
            credential: None,
        }
    }

    /// Reconciler running the configured git binary.
    pub fn from_config(config: &Config) -> Self {
        let global = &config.global;
        let runner = SystemGit::new(global.git_binary()).with_default_timeout(global.command_timeout());
        Self::new(Arc::new(runner))
            .with_coordinator(FetchCoordinator::new(config.retry_policy()))
            .with_remotes(global.origin_remote(), global.push_remote())
    }

    pub fn with_coordinator(mut self, coordinator: FetchCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Override the sync and push remote names.
    pub fn with_remotes(mut self, origin: impl Into<String>, push: impl Into<String>) -> Self {
        self.origin_remote = origin.into();
        self.push_remote = push.into();
        self
    }

    /// Credential embedded into HTTP(S) URLs for clones and pushes.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// A `Git` handle on `path` sharing this reconciler's runner.
    pub fn git(&self, path: &Path) -> Git {
        Git::new(self.runner.clone(), path)
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub fn coordinator(&self) -> &FetchCoordinator {
        &self.coordinator
    }

    pub fn origin_remote(&self) -> &str {
        &self.origin_remote
    }

    pub fn push_remote(&self) -> &str {
        &self.push_remote
    }

    // =========================================================================
    // ResetRepo
    // =========================================================================

    /// Bring `path` to a clean checkout of `endpoint` at `branch`.
    ///
    /// With no branch the remote default branch (`origin/HEAD`) is used.
    /// Running it twice in a row leaves the workspace unchanged.
    ///
    /// # Errors
    ///
    /// Any failure other than the locally recoverable ones, and any failure
    /// of the fallback clone.
    pub async fn reset_repo(
        &self,
        path: &Path,
        branch: Option<&BranchName>,
        endpoint: &Endpoint,
        mode: CloneMode,
    ) -> Result<ResetOutcome, GitError> {
        match self.reset_in_place(path, branch, endpoint).await {
            Ok(outcome) => {
                info!(path = %path.display(), ?outcome, "workspace reset");
                Ok(outcome)
            }
            Err(err) if err.is_locally_recoverable() => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "workspace cannot be reset in place, re-cloning"
                );
                self.wipe(path).await?;
                self.clone(path, branch, endpoint, mode, self.credential.as_ref())
                    .await?;
                Ok(ResetOutcome::Recloned)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "reset failed");
                Err(err)
            }
        }
    }

    async fn reset_in_place(
        &self,
        path: &Path,
        branch: Option<&BranchName>,
        endpoint: &Endpoint,
    ) -> Result<ResetOutcome, GitError> {
        let git = self.git(path);

        let recorded = git.remote_url(&self.origin_remote).await?;
        if !endpoint.matches(&recorded) {
            return Err(GitError::RemoteMismatch {
                path: path.to_path_buf(),
                expected: endpoint.redacted(),
                actual: strip_credentials(&recorded),
            });
        }

        if git.is_bare().await? {
            let head = git.head_ref().await?;
            let refspec = format!("+{head}:{head}");
            debug!(path = %path.display(), %head, "updating bare repository");
            self.coordinator
                .fetch(&git, &[&self.origin_remote, &refspec])
                .await?;
            return Ok(ResetOutcome::BareUpdated);
        }

        git.reset_hard(None).await?;
        git.clean().await?;
        if let Some(branch) = branch {
            self.switch_to_branch(path, branch, false).await?;
        }
        self.coordinator.fetch(&git, &[&self.origin_remote]).await?;

        let target = match branch {
            Some(branch) => branch.on_remote(&self.origin_remote),
            None => format!("{}/HEAD", self.origin_remote),
        };
        git.reset_hard(Some(&target)).await?;
        Ok(ResetOutcome::Reset)
    }

    /// Remove everything inside `path`.
    ///
    /// Entries that cannot be removed are logged and skipped; the clone that
    /// follows reports the leftover state if it matters.
    async fn wipe(&self, path: &Path) -> Result<(), GitError> {
        let io = |source: std::io::Error| GitError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io(e)),
        };

        let mut skipped = 0usize;
        while let Some(entry) = entries.next_entry().await.map_err(io)? {
            let entry_path = entry.path();
            let removed = match entry.file_type().await {
                Ok(kind) if kind.is_dir() => tokio::fs::remove_dir_all(&entry_path).await,
                Ok(_) => tokio::fs::remove_file(&entry_path).await,
                Err(e) => Err(e),
            };
            if let Err(e) = removed {
                warn!(path = %entry_path.display(), error = %e, "could not remove");
                skipped += 1;
            }
        }

        debug!(path = %path.display(), skipped, "workspace wiped");
        Ok(())
    }

    // =========================================================================
    // Clone
    // =========================================================================

    /// Clone `endpoint` into `path`, creating the directory if absent.
    ///
    /// Runs exactly one `git clone` with the flags of `mode` and, when given,
    /// `--branch`. The credential only takes effect for HTTP(S) endpoints.
    pub async fn clone(
        &self,
        path: &Path,
        branch: Option<&BranchName>,
        endpoint: &Endpoint,
        mode: CloneMode,
        credential: Option<&Credential>,
    ) -> Result<(), GitError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| GitError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let url = url_for(endpoint, credential);
        let mut args = vec!["clone"];
        args.extend(mode.flags().iter().copied());
        if let Some(branch) = branch {
            args.extend(["--branch", branch.as_str()]);
        }
        args.extend([url.as_str(), "."]);

        info!(
            path = %path.display(),
            endpoint = %endpoint.redacted(),
            %mode,
            branch = branch.map(BranchName::as_str),
            "cloning"
        );
        self.git(path).run(&args).await.map(drop)
    }

    // =========================================================================
    // SwitchToBranch
    // =========================================================================

    /// Make `target` the checked-out branch.
    ///
    /// When the branch already exists and `enforce_current_content` is set,
    /// it is deleted and recreated at HEAD so it carries the current content;
    /// otherwise the existing branch is checked out as it is.
    pub async fn switch_to_branch(
        &self,
        path: &Path,
        target: &BranchName,
        enforce_current_content: bool,
    ) -> Result<SwitchOutcome, GitError> {
        let git = self.git(path);
        if git.current_branch().await?.as_ref() == Some(target) {
            return Ok(SwitchOutcome::AlreadyOn);
        }

        let mut recreated = false;
        loop {
            match git.checkout_new(target).await {
                Ok(()) if recreated => return Ok(SwitchOutcome::Recreated),
                Ok(()) => return Ok(SwitchOutcome::Created),
                Err(err) if err.kind() == Some(FailureKind::BranchExists) && !recreated => {
                    if !enforce_current_content {
                        git.checkout(target).await?;
                        return Ok(SwitchOutcome::CheckedOut);
                    }
                    debug!(path = %path.display(), branch = %target, "recreating branch");
                    git.delete_branch(target).await?;
                    recreated = true;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // =========================================================================
    // CommitToBranch
    // =========================================================================

    /// Stage everything, move it onto `branch` and commit.
    ///
    /// Returns `false` when there was nothing to commit.
    pub async fn commit_to_branch(
        &self,
        path: &Path,
        message: &str,
        branch: &BranchName,
    ) -> Result<bool, GitError> {
        let git = self.git(path);
        git.add_all().await?;
        self.switch_to_branch(path, branch, true).await?;

        match git.commit(message).await {
            Ok(()) => {
                info!(path = %path.display(), %branch, "committed");
                Ok(true)
            }
            Err(err) if err.kind() == Some(FailureKind::NothingToCommit) => {
                debug!(path = %path.display(), %branch, "nothing to commit");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Push
    // =========================================================================

    /// Push `branch` to `endpoint` through the dedicated push remote.
    pub async fn push(
        &self,
        path: &Path,
        branch: &BranchName,
        endpoint: &Endpoint,
        force: bool,
    ) -> Result<PushOutcome, GitError> {
        let git = self.git(path);
        let url = url_for(endpoint, self.credential.as_ref());
        git.set_remote(&self.push_remote, &url).await?;

        match git.push(&self.push_remote, branch, force).await {
            Ok(()) => {
                info!(path = %path.display(), %branch, endpoint = %endpoint.redacted(), "pushed");
                Ok(PushOutcome::Pushed)
            }
            Err(err) if err.kind() == Some(FailureKind::PushRejected) => {
                warn!(path = %path.display(), %branch, "push rejected by remote");
                Ok(PushOutcome::Rejected)
            }
            Err(err) => {
                error!(path = %path.display(), %branch, error = %err, "push failed");
                Err(err)
            }
        }
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Fetch the sync remote under the retry schedule.
    pub async fn fetch(&self, path: &Path) -> Result<(), GitError> {
        let git = self.git(path);
        self.coordinator
            .fetch(&git, &[&self.origin_remote])
            .await
            .map(drop)
    }
}

fn url_for(endpoint: &Endpoint, credential: Option<&Credential>) -> String {
    match credential {
        Some(credential) => endpoint.with_credential(credential),
        None => endpoint.as_str().to_string(),
    }
}
