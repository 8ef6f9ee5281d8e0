//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All stdout output goes through this module so quiet mode and `--json`
//! behave the same for every command.

pub mod output;
