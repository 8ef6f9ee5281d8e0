//! cli::commands::status

use anyhow::Result;

use super::{block_on, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::Context;
use crate::ui::output;

/// Run the status command.
pub fn status(ctx: &Context, workspace: &WorkspaceArg, json: bool) -> Result<()> {
    let path = workspace_path(workspace)?;
    let state = block_on(ctx.reconciler().git(&path).state())??;

    if json {
        return output::json(&state);
    }
    output::print(output::format_state(&state), verbosity(ctx));
    Ok(())
}
