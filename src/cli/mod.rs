//! cli
//!
//! Command-line interface layer for reposync.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Load configuration and delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. Command handlers return `anyhow::Result`;
//! the engine returns typed errors.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::{Context as _, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::engine;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        config,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Default log level for the flags: `--debug` wins over `--quiet`.
fn log_level(debug: bool, quiet: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides the flags.
fn init_logging(debug: bool, quiet: bool) {
    let level = log_level(debug, quiet);
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_levels() {
        assert_eq!(log_level(false, false), "warn");
        assert_eq!(log_level(false, true), "error");
        assert_eq!(log_level(true, false), "debug");
        assert_eq!(log_level(true, true), "debug");
    }
}
