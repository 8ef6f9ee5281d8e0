//! core
//!
//! Core domain types and configuration for reposync.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, Remote, Commit
//! - [`clone_mode`] - The closed set of clone modes and their git flags
//! - [`endpoint`] - Canonical remote URLs and embedded credentials
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Values are validated when constructed, before they reach a command line
//! - Nothing in `core` runs git; it only describes what to run

pub mod clone_mode;
pub mod config;
pub mod endpoint;
pub mod types;
