//! cli::commands::log_cmd
//!
//! Show the commit log from HEAD, newest first.

use anyhow::Result;

use super::{block_on, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::Context;
use crate::ui::output;

/// Run the log command.
pub fn log(ctx: &Context, workspace: &WorkspaceArg, limit: usize, json: bool) -> Result<()> {
    let path = workspace_path(workspace)?;
    let commits = block_on(ctx.reconciler().git(&path).commits(Some(limit)))??;

    if json {
        return output::json(&commits);
    }
    let lines: Vec<String> = commits.iter().map(output::format_commit).collect();
    output::print(lines.join("\n"), verbosity(ctx));
    Ok(())
}
