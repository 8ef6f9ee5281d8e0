//! cli::commands::config_cmd
//!
//! Show the effective configuration.

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::output;

/// Print the effective configuration as TOML.
///
/// Always printed, even with `--quiet`: it is the command's only output.
pub fn show(ctx: &Context) -> Result<()> {
    let text = toml::to_string_pretty(&ctx.config.global).context("cannot serialize configuration")?;
    if text.trim().is_empty() {
        println!("# defaults in use");
    } else {
        print!("{text}");
    }
    Ok(())
}

/// Print where the configuration came from.
pub fn path(ctx: &Context) -> Result<()> {
    match ctx.config.path() {
        Some(path) => println!("{}", path.display()),
        None => {
            let default = Config::default_path()?;
            println!("{}", default.display());
            output::warn("file does not exist; defaults are in use", output::Verbosity::Normal);
        }
    }
    Ok(())
}
