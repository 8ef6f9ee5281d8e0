//! engine
//!
//! The reconciliation and synchronization engine.
//!
//! # Architecture
//!
//! Three collaborating parts, all built on the [`crate::git`] doorway:
//!
//! - [`retry`]: the Retry/Timeout Coordinator racing fetches against an
//!   escalating timeout
//! - [`reconcile`]: the Workspace Reconciler converging a directory to a
//!   desired (endpoint, branch, clone mode) state
//! - [`mirror`]: the Branch Mirror making local branches match a remote
//!
//! # Invariants
//!
//! - Every git invocation goes through an injected `CommandRunner`
//! - Network fetches go through the coordinator; nothing else is retried
//! - Only "not a usable checkout" failures trigger wipe-and-clone
//! - Operations on one workspace run sequentially; there is no internal
//!   locking, the caller owns the directory
//!
//! # Example
//!
//! ```no_run
//! use reposync::core::clone_mode::CloneMode;
//! use reposync::core::config::Config;
//! use reposync::core::endpoint::Endpoint;
//! use reposync::engine::Reconciler;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let reconciler = Reconciler::from_config(&Config::load(None)?);
//! let endpoint = Endpoint::new("https://git.example.com/team/app.git")?;
//! let outcome = reconciler
//!     .reset_repo("/srv/checkouts/app".as_ref(), None, &endpoint, CloneMode::Depth1)
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod mirror;
pub mod reconcile;
pub mod retry;

pub use mirror::{branch_difference, BranchMirror, MirrorReport};
pub use reconcile::{PushOutcome, Reconciler, ResetOutcome, SwitchOutcome};
pub use retry::{FetchCoordinator, RetryPolicy};

use crate::core::config::Config;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and the loaded config.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Loaded configuration.
    pub config: Config,
}

impl Context {
    /// Reconciler wired from the loaded configuration.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::from_config(&self.config)
    }

    /// Branch mirror sharing the reconciler's runner and coordinator.
    pub fn mirror(&self) -> BranchMirror {
        let reconciler = self.reconciler();
        BranchMirror::new(reconciler.runner().clone(), reconciler.coordinator().clone())
    }
}
