//! git::interface
//!
//! The `Git` handle: typed queries and mutations against one workspace.
//!
//! This is the **single doorway** through which the engine talks to git.
//! Readers return structured values parsed by [`super::parse`]; mutations
//! are thin, named wrappers so that the reconciler and the mirror read as
//! a sequence of intentions rather than argument lists.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reposync::git::{Git, SystemGit};
//!
//! # async fn demo() -> Result<(), reposync::git::GitError> {
//! let git = Git::new(Arc::new(SystemGit::default()), "/srv/checkouts/app");
//! if let Some(branch) = git.current_branch().await? {
//!     println!("on {branch}");
//! }
//! for remote in git.remotes().await? {
//!     println!("{} -> {}", remote.name, remote.url);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::error::GitError;
use super::parse::{
    parse_bool, parse_commits, parse_local_branches, parse_remote_branches, parse_remotes,
    COMMIT_FORMAT,
};
use super::runner::{CommandOutput, CommandRunner};
use crate::core::types::{BranchName, Commit, Oid, Remote};

/// Observable state of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceState {
    /// Workspace directory
    pub path: PathBuf,
    /// Checked-out branch; `None` when HEAD is detached
    pub branch: Option<BranchName>,
    /// Configured remotes
    pub remotes: Vec<Remote>,
    /// Whether the repository has no working tree
    pub bare: bool,
    /// Whether there are uncommitted or untracked changes (always false when bare)
    pub dirty: bool,
}

/// Handle on one workspace directory.
///
/// Cheap to clone: it holds the shared runner and a path.
#[derive(Clone)]
pub struct Git {
    runner: Arc<dyn CommandRunner>,
    path: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("path", &self.path).finish()
    }
}

impl Git {
    /// Create a handle on `path`. Nothing is run until a method is called.
    pub fn new(runner: Arc<dyn CommandRunner>, path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            path: path.into(),
        }
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The shared runner.
    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    /// Run an arbitrary git command in the workspace.
    pub async fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        self.run_with_timeout(args, None).await
    }

    /// Run with an explicit timeout overriding the runner default.
    pub async fn run_with_timeout(
        &self,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, GitError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(&self.path, &args, timeout).await
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Current branch, or `None` when HEAD is detached.
    ///
    /// Works on unborn branches and in bare repositories.
    pub async fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let out = self.run(&["branch", "--show-current"]).await?;
        match out.trimmed() {
            "" => Ok(None),
            name => Ok(Some(BranchName::new(name)?)),
        }
    }

    /// The full ref HEAD points at (e.g. `refs/heads/main`).
    pub async fn head_ref(&self) -> Result<String, GitError> {
        let out = self.run(&["symbolic-ref", "HEAD"]).await?;
        Ok(out.trimmed().to_string())
    }

    /// URL configured for `remote`.
    ///
    /// # Errors
    ///
    /// A `CommandFailed` with `FailureKind::NoSuchRemote` when the remote is
    /// absent, or `NotARepository` outside a repository.
    pub async fn remote_url(&self, remote: &str) -> Result<String, GitError> {
        let out = self.run(&["remote", "get-url", remote]).await?;
        Ok(out.trimmed().to_string())
    }

    /// All configured remotes.
    pub async fn remotes(&self) -> Result<Vec<Remote>, GitError> {
        let out = self.run(&["remote", "-v"]).await?;
        parse_remotes(&out.output)
    }

    /// Whether the repository has no working tree.
    pub async fn is_bare(&self) -> Result<bool, GitError> {
        let out = self.run(&["rev-parse", "--is-bare-repository"]).await?;
        parse_bool("bare flag", &out.output)
    }

    /// Whether there are uncommitted changes or untracked files.
    pub async fn is_dirty(&self) -> Result<bool, GitError> {
        let out = self.run(&["status", "--porcelain"]).await?;
        Ok(!out.trimmed().is_empty())
    }

    /// Commit log from HEAD, newest first, at most `limit` entries.
    pub async fn commits(&self, limit: Option<usize>) -> Result<Vec<Commit>, GitError> {
        let count = limit.map(|n| format!("--max-count={n}"));
        let mut args = vec!["log", COMMIT_FORMAT];
        if let Some(count) = &count {
            args.push(count);
        }
        let out = self.run(&args).await?;
        parse_commits(&out.output)
    }

    /// Local branch names.
    pub async fn local_branches(&self) -> Result<Vec<BranchName>, GitError> {
        let out = self.run(&["branch", "--no-color"]).await?;
        parse_local_branches(&out.output)
    }

    /// Branch names known for `remote`, without the `<remote>/` prefix.
    ///
    /// Reads remote-tracking refs only; fetch first for current data.
    pub async fn remote_branches(&self, remote: &str) -> Result<Vec<BranchName>, GitError> {
        let out = self.run(&["branch", "-r", "--no-color"]).await?;
        parse_remote_branches(&out.output, remote)
    }

    /// Resolve a revision to a commit id.
    pub async fn resolve(&self, rev: &str) -> Result<Oid, GitError> {
        let spec = format!("{rev}^{{commit}}");
        let out = self.run(&["rev-parse", "--verify", "--quiet", &spec]).await?;
        Ok(Oid::new(out.trimmed())?)
    }

    /// Snapshot of branch, remotes, bare and dirty flags.
    pub async fn state(&self) -> Result<WorkspaceState, GitError> {
        let bare = self.is_bare().await?;
        let dirty = if bare { false } else { self.is_dirty().await? };
        Ok(WorkspaceState {
            path: self.path.clone(),
            branch: self.current_branch().await?,
            remotes: self.remotes().await?,
            bare,
            dirty,
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// `reset --hard`, optionally onto `target`.
    pub async fn reset_hard(&self, target: Option<&str>) -> Result<(), GitError> {
        let mut args = vec!["reset", "--hard", "--quiet"];
        args.extend(target);
        self.run(&args).await.map(drop)
    }

    /// Remove untracked and ignored files and directories, including nested
    /// repositories.
    pub async fn clean(&self) -> Result<(), GitError> {
        self.run(&["clean", "-ffdx", "--quiet"]).await.map(drop)
    }

    /// Check out an existing local branch.
    pub async fn checkout(&self, branch: &BranchName) -> Result<(), GitError> {
        self.run(&["checkout", "--quiet", branch.as_str(), "--"])
            .await
            .map(drop)
    }

    /// Create `branch` at HEAD and check it out.
    pub async fn checkout_new(&self, branch: &BranchName) -> Result<(), GitError> {
        self.run(&["checkout", "--quiet", "-b", branch.as_str()])
            .await
            .map(drop)
    }

    /// Create `branch` tracking `<remote>/<branch>` and check it out.
    pub async fn checkout_tracking(
        &self,
        branch: &BranchName,
        remote: &str,
    ) -> Result<(), GitError> {
        let upstream = branch.on_remote(remote);
        self.run(&["checkout", "--quiet", "-b", branch.as_str(), "--track", &upstream])
            .await
            .map(drop)
    }

    /// Detach HEAD at the current commit.
    pub async fn detach(&self) -> Result<(), GitError> {
        self.run(&["checkout", "--quiet", "--detach"]).await.map(drop)
    }

    /// Force-delete a local branch.
    pub async fn delete_branch(&self, branch: &BranchName) -> Result<(), GitError> {
        self.run(&["branch", "-D", branch.as_str()]).await.map(drop)
    }

    /// Stage every change, including deletions and untracked files.
    pub async fn add_all(&self) -> Result<(), GitError> {
        self.run(&["add", "--all"]).await.map(drop)
    }

    /// Commit the index.
    pub async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "--quiet", "-m", message]).await.map(drop)
    }

    /// Point `remote` at `url`, adding the remote if absent.
    pub async fn set_remote(&self, remote: &str, url: &str) -> Result<(), GitError> {
        let exists = self.remotes().await?.iter().any(|r| r.name == remote);
        let verb = if exists { "set-url" } else { "add" };
        self.run(&["remote", verb, remote, url]).await.map(drop)
    }

    /// Push `branch` to `remote` and record it as upstream.
    pub async fn push(&self, remote: &str, branch: &BranchName, force: bool) -> Result<(), GitError> {
        let mut args = vec!["push", "--porcelain", "--set-upstream"];
        if force {
            args.push("--force");
        }
        args.extend([remote, branch.as_str()]);
        self.run(&args).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{MockResponse, MockRunner};

    fn git_with(mock: &MockRunner) -> Git {
        Git::new(Arc::new(mock.clone()), "/ws")
    }

    #[tokio::test]
    async fn detached_head_has_no_branch() {
        let mock = MockRunner::new();
        mock.respond(&["branch", "--show-current"], MockResponse::ok("\n"));
        assert_eq!(git_with(&mock).current_branch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn current_branch_is_parsed() {
        let mock = MockRunner::new();
        mock.respond(&["branch", "--show-current"], MockResponse::ok("main\n"));
        let branch = git_with(&mock).current_branch().await.unwrap();
        assert_eq!(branch.map(String::from).as_deref(), Some("main"));
    }

    #[tokio::test]
    async fn commits_passes_limit() {
        let mock = MockRunner::new();
        mock.respond(&["log"], MockResponse::ok(""));
        git_with(&mock).commits(Some(3)).await.unwrap();
        assert_eq!(
            mock.calls()[0],
            ["log", COMMIT_FORMAT, "--max-count=3"]
        );
    }

    #[tokio::test]
    async fn state_skips_status_in_bare_repo() {
        let mock = MockRunner::new();
        mock.respond(&["rev-parse", "--is-bare-repository"], MockResponse::ok("true\n"));
        mock.respond(&["branch", "--show-current"], MockResponse::ok("main\n"));
        mock.respond(
            &["remote", "-v"],
            MockResponse::ok("origin\t/srv/r.git (fetch)\norigin\t/srv/r.git (push)\n"),
        );

        let state = git_with(&mock).state().await.unwrap();
        assert!(state.bare);
        assert!(!state.dirty);
        assert_eq!(state.remotes.len(), 1);
        assert!(!mock.calls().iter().any(|c| c[0] == "status"));
    }

    #[tokio::test]
    async fn set_remote_adds_or_repoints() {
        let mock = MockRunner::new();
        mock.respond(&["remote", "-v"], MockResponse::ok(""));
        git_with(&mock).set_remote("publish", "/srv/out.git").await.unwrap();
        assert!(mock.was_called(&["remote", "add", "publish", "/srv/out.git"]));

        let mock = MockRunner::new();
        mock.respond(
            &["remote", "-v"],
            MockResponse::ok("publish\t/srv/old.git (fetch)\npublish\t/srv/old.git (push)\n"),
        );
        git_with(&mock).set_remote("publish", "/srv/out.git").await.unwrap();
        assert!(mock.was_called(&["remote", "set-url", "publish", "/srv/out.git"]));
    }

    #[tokio::test]
    async fn push_flags() {
        let mock = MockRunner::new();
        let branch = BranchName::new("main").unwrap();
        git_with(&mock).push("publish", &branch, true).await.unwrap();
        assert_eq!(
            mock.calls()[0],
            ["push", "--porcelain", "--set-upstream", "--force", "publish", "main"]
        );
    }
}
