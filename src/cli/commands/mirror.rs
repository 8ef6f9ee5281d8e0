//! cli::commands::mirror
//!
//! Make local branches mirror a remote's branch set.

use anyhow::Result;

use super::{block_on, verbosity, workspace_path};
use crate::cli::args::WorkspaceArg;
use crate::engine::Context;
use crate::ui::output;

/// Run the mirror command.
pub fn mirror(ctx: &Context, workspace: &WorkspaceArg, remote: Option<&str>, json: bool) -> Result<()> {
    let path = workspace_path(workspace)?;
    let remote = remote.unwrap_or(ctx.config.global.origin_remote());

    let report = block_on(
        ctx.mirror()
            .ensure_all_local_branches_up_to_date_with_remote(&path, remote),
    )??;

    if json {
        return output::json(&report);
    }
    output::print(output::format_report(&report), verbosity(ctx));
    Ok(())
}
