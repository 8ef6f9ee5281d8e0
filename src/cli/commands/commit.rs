//! cli::commands::commit

use anyhow::Result;

use super::{block_on, parse_branch, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::Context;
use crate::ui::output;

/// Run the commit command.
pub fn commit(ctx: &Context, workspace: &WorkspaceArg, message: &str, branch: &str) -> Result<()> {
    let path = workspace_path(workspace)?;
    let branch = parse_branch(branch)?;

    let committed = block_on(ctx.reconciler().commit_to_branch(&path, message, &branch))??;

    if committed {
        output::print(format!("Committed to '{branch}'"), verbosity(ctx));
    } else {
        output::print("Nothing to commit", verbosity(ctx));
    }
    Ok(())
}
