//! reposync - converge local directories onto remote git repositories
//!
//! reposync decides whether to clone, fetch, reset or recreate a working
//! copy so that a directory ends up as a clean checkout of a given
//! repository and branch, whatever state it started in. It also keeps a
//! workspace's full local branch set mirrored to a remote's.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Reconciler, branch mirror and fetch retry coordinator
//! - [`core`] - Domain types, clone modes, endpoints and configuration
//! - [`git`] - Single interface for all git operations
//! - [`secrets`] - Credential storage for HTTP(S) hosts
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. `reset_repo` is idempotent: a second run on a converged workspace
//!    changes nothing
//! 2. Only failures meaning "not a usable checkout" trigger wipe-and-clone
//! 3. After a mirror run, local and remote branch sets are equal and every
//!    local tip equals its remote tip
//! 4. Credentials never reach logs or error messages

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod secrets;
pub mod ui;
