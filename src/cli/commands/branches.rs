//! cli::commands::branches

use anyhow::Result;

use super::{block_on, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::Context;
use crate::ui::output;

/// Run the branches command.
///
/// With `remote`, lists the remote-tracking branches last fetched from it.
pub fn branches(ctx: &Context, workspace: &WorkspaceArg, remote: Option<&str>, json: bool) -> Result<()> {
    let path = workspace_path(workspace)?;
    let git = ctx.reconciler().git(&path);

    let names = match remote {
        Some(remote) => block_on(git.remote_branches(remote))??,
        None => block_on(git.local_branches())??,
    };

    if json {
        return output::json(&names);
    }
    output::print(output::format_list(&names, ""), verbosity(ctx));
    Ok(())
}
