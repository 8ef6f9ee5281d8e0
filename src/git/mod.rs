//! git
//!
//! Single interface for all git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to git. Every repository read and
//! write flows through a [`CommandRunner`], which shells out to the git
//! executable. No other module starts processes or reads `.git` internals.
//!
//! # Responsibilities
//!
//! - Running git with a working directory and timeout ([`runner`])
//! - Classifying failures into a typed taxonomy ([`error`])
//! - Parsing git's text output into strong types ([`parse`])
//! - Named queries and mutations on one workspace ([`Git`])
//!
//! # Invariants
//!
//! - Credentials never appear in logged command lines or error messages
//! - All queries return strong types (BranchName, Oid, Remote, Commit)

pub mod error;
mod interface;
pub mod mock;
pub mod parse;
pub mod runner;

pub use error::{FailureKind, GitError};
pub use interface::{Git, WorkspaceState};
pub use mock::{MockCall, MockResponse, MockRunner};
pub use runner::{CommandOutput, CommandRunner, SystemGit};
