//! engine::mirror
//!
//! Make the local branch set mirror a remote's branch set.
//!
//! # Phases
//!
//! After one fetch with `--prune` (under the retry schedule):
//!
//! 1. **Prune**: local branches with no remote counterpart are force-deleted.
//!    If the checked-out branch is among them, HEAD is detached first.
//! 2. **Adopt**: remote branches with no local counterpart get a tracking
//!    branch, hard-reset to the remote tip.
//! 3. **Synchronize**: every local branch is checked out and hard-reset to
//!    its remote counterpart.
//!
//! Counterparts are matched ignoring case. Phases run in order and the first
//! per-branch failure aborts the rest.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reposync::engine::mirror::BranchMirror;
//! use reposync::engine::retry::FetchCoordinator;
//! use reposync::git::SystemGit;
//!
//! # async fn demo() -> Result<(), reposync::git::GitError> {
//! let mirror = BranchMirror::new(Arc::new(SystemGit::default()), FetchCoordinator::default());
//! let report = mirror
//!     .ensure_all_local_branches_up_to_date_with_remote("/srv/checkouts/app".as_ref(), "origin")
//!     .await?;
//! println!("{} pruned, {} adopted", report.pruned.len(), report.adopted.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use super::retry::FetchCoordinator;
use crate::core::types::BranchName;
use crate::git::{CommandRunner, Git, GitError};

/// What a mirror run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MirrorReport {
    /// Local branches deleted because the remote no longer has them
    pub pruned: Vec<BranchName>,
    /// Local branches created for new remote branches
    pub adopted: Vec<BranchName>,
    /// Every local branch reset to its remote tip
    pub synchronized: Vec<BranchName>,
}

/// Branches of `left` with no case-insensitive match in `right`.
///
/// Order of `left` is preserved.
///
/// ```
/// use reposync::core::types::BranchName;
/// use reposync::engine::mirror::branch_difference;
///
/// let names = |list: &[&str]| -> Vec<BranchName> {
///     list.iter().map(|n| BranchName::new(*n).unwrap()).collect()
/// };
/// let diff = branch_difference(&names(&["main", "Dev", "old"]), &names(&["dev", "main"]));
/// assert_eq!(diff, names(&["old"]));
/// ```
pub fn branch_difference(left: &[BranchName], right: &[BranchName]) -> Vec<BranchName> {
    left.iter()
        .filter(|l| !right.iter().any(|r| r.eq_ignore_case(l)))
        .cloned()
        .collect()
}

/// Mirrors remote branches into a workspace.
#[derive(Clone)]
pub struct BranchMirror {
    runner: Arc<dyn CommandRunner>,
    coordinator: FetchCoordinator,
}

impl std::fmt::Debug for BranchMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchMirror")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl BranchMirror {
    pub fn new(runner: Arc<dyn CommandRunner>, coordinator: FetchCoordinator) -> Self {
        Self {
            runner,
            coordinator,
        }
    }

    /// Bring every local branch in `path` to the tip of its counterpart on
    /// `remote`, creating and deleting branches as needed.
    ///
    /// The branch checked out beforehand is checked out again afterwards if
    /// it still exists.
    ///
    /// # Errors
    ///
    /// The fetch or listing failure, or the first failing branch operation.
    pub async fn ensure_all_local_branches_up_to_date_with_remote(
        &self,
        path: &Path,
        remote: &str,
    ) -> Result<MirrorReport, GitError> {
        let git = Git::new(self.runner.clone(), path);

        self.coordinator.fetch(&git, &[remote, "--prune"]).await?;
        let remote_branches = git.remote_branches(remote).await?;
        let local_branches = git.local_branches().await?;
        let original = git.current_branch().await?;

        debug!(
            path = %path.display(),
            remote,
            local = local_branches.len(),
            remote_count = remote_branches.len(),
            "mirroring branches"
        );

        let mut report = MirrorReport {
            pruned: branch_difference(&local_branches, &remote_branches),
            adopted: branch_difference(&remote_branches, &local_branches),
            synchronized: Vec::new(),
        };

        // Phase 1: prune
        if original.as_ref().is_some_and(|b| report.pruned.contains(b)) {
            git.detach().await?;
        }
        for branch in &report.pruned {
            git.delete_branch(branch)
                .await
                .map_err(|err| failed(path, branch, "prune", err))?;
        }

        // Phase 2: adopt
        for branch in &report.adopted {
            let upstream = branch.on_remote(remote);
            git.checkout_tracking(branch, remote)
                .await
                .map_err(|err| failed(path, branch, "adopt", err))?;
            git.reset_hard(Some(&upstream))
                .await
                .map_err(|err| failed(path, branch, "adopt", err))?;
        }

        // Phase 3: synchronize
        let survivors = branch_difference(&local_branches, &report.pruned);
        for branch in survivors.iter().chain(&report.adopted) {
            let counterpart = remote_branches
                .iter()
                .find(|r| r.eq_ignore_case(branch))
                .unwrap_or(branch);
            let upstream = counterpart.on_remote(remote);
            git.checkout(branch)
                .await
                .map_err(|err| failed(path, branch, "synchronize", err))?;
            git.reset_hard(Some(&upstream))
                .await
                .map_err(|err| failed(path, branch, "synchronize", err))?;
            report.synchronized.push(branch.clone());
        }

        if let Some(original) = original.filter(|b| report.synchronized.contains(b)) {
            git.checkout(&original).await?;
        }

        info!(
            path = %path.display(),
            remote,
            pruned = report.pruned.len(),
            adopted = report.adopted.len(),
            synchronized = report.synchronized.len(),
            "branches mirrored"
        );
        Ok(report)
    }
}

fn failed(path: &Path, branch: &BranchName, phase: &str, err: GitError) -> GitError {
    error!(path = %path.display(), %branch, phase, error = %err, "branch mirror step failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{MockResponse, MockRunner};

    fn names(list: &[&str]) -> Vec<BranchName> {
        list.iter().map(|n| BranchName::new(*n).unwrap()).collect()
    }

    fn mirror(mock: &MockRunner) -> BranchMirror {
        BranchMirror::new(Arc::new(mock.clone()), FetchCoordinator::default())
    }

    fn listing(mock: &MockRunner, local: &str, remote: &str, current: &str) {
        mock.respond(&["branch", "--no-color"], MockResponse::ok(local));
        mock.respond(&["branch", "-r", "--no-color"], MockResponse::ok(remote));
        mock.respond(&["branch", "--show-current"], MockResponse::ok(current));
    }

    fn mutations(mock: &MockRunner) -> Vec<String> {
        mock.calls()
            .into_iter()
            .filter(|c| {
                matches!(c[0].as_str(), "checkout" | "reset" | "fetch")
                    || (c[0] == "branch" && c.get(1).is_some_and(|a| a == "-D"))
            })
            .map(|c| c.join(" "))
            .collect()
    }

    #[test]
    fn difference_ignores_case() {
        assert_eq!(
            branch_difference(&names(&["main", "FEATURE", "gone"]), &names(&["Main", "feature"])),
            names(&["gone"])
        );
        assert!(branch_difference(&[], &names(&["main"])).is_empty());
        assert_eq!(branch_difference(&names(&["main"]), &[]), names(&["main"]));
    }

    #[tokio::test]
    async fn phases_run_in_order() {
        let mock = MockRunner::new();
        listing(
            &mock,
            "* main\n  stale\n",
            "  origin/HEAD -> origin/main\n  origin/main\n  origin/new\n",
            "main\n",
        );

        let report = mirror(&mock)
            .ensure_all_local_branches_up_to_date_with_remote(Path::new("/ws"), "origin")
            .await
            .unwrap();

        assert_eq!(report.pruned, names(&["stale"]));
        assert_eq!(report.adopted, names(&["new"]));
        assert_eq!(report.synchronized, names(&["main", "new"]));
        assert_eq!(
            mutations(&mock),
            [
                "fetch origin --prune",
                "branch -D stale",
                "checkout --quiet -b new --track origin/new",
                "reset --hard --quiet origin/new",
                "checkout --quiet main --",
                "reset --hard --quiet origin/main",
                "checkout --quiet new --",
                "reset --hard --quiet origin/new",
                "checkout --quiet main --",
            ]
        );
    }

    #[tokio::test]
    async fn current_branch_is_detached_before_pruning() {
        let mock = MockRunner::new();
        listing(&mock, "  main\n* gone\n", "  origin/main\n", "gone\n");

        let report = mirror(&mock)
            .ensure_all_local_branches_up_to_date_with_remote(Path::new("/ws"), "origin")
            .await
            .unwrap();

        assert_eq!(report.pruned, names(&["gone"]));
        let log = mutations(&mock);
        let detach = log.iter().position(|c| c == "checkout --quiet --detach").unwrap();
        let delete = log.iter().position(|c| c == "branch -D gone").unwrap();
        assert!(detach < delete);
        // Original branch is gone, so nothing is restored after syncing main.
        assert_eq!(log.last().map(String::as_str), Some("reset --hard --quiet origin/main"));
    }

    #[tokio::test]
    async fn case_variants_sync_to_remote_spelling() {
        let mock = MockRunner::new();
        listing(&mock, "* Main\n", "  origin/main\n", "Main\n");

        let report = mirror(&mock)
            .ensure_all_local_branches_up_to_date_with_remote(Path::new("/ws"), "origin")
            .await
            .unwrap();

        assert!(report.pruned.is_empty());
        assert!(report.adopted.is_empty());
        assert!(mock.was_called(&["reset", "--hard", "--quiet", "origin/main"]));
    }

    #[tokio::test]
    async fn branch_failure_aborts_remaining() {
        let mock = MockRunner::new();
        listing(&mock, "", "  origin/a\n  origin/b\n", "\n");
        mock.respond(
            &["checkout", "--quiet", "-b", "a"],
            MockResponse::fail("fatal: cannot lock ref 'refs/heads/a'"),
        );

        let err = mirror(&mock)
            .ensure_all_local_branches_up_to_date_with_remote(Path::new("/ws"), "origin")
            .await
            .unwrap_err();

        assert!(matches!(err, GitError::CommandFailed { .. }));
        assert!(!mock.was_called(&["checkout", "--quiet", "-b", "b"]));
    }

    #[tokio::test]
    async fn fetch_failure_stops_before_listing() {
        let mock = MockRunner::new();
        mock.respond(&["fetch"], MockResponse::fail("fatal: 'origin' does not appear to be a git repository"));

        assert!(mirror(&mock)
            .ensure_all_local_branches_up_to_date_with_remote(Path::new("/ws"), "origin")
            .await
            .is_err());
        assert!(!mock.was_called(&["branch"]));
    }
}
