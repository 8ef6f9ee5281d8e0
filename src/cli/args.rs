//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// reposync - converge working copies onto remote repositories
#[derive(Parser, Debug)]
#[command(name = "reposync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default search path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; only errors are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Workspace directory argument shared by most commands.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArg {
    /// Workspace directory (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

/// Target repository arguments shared by `reset` and `clone`.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Repository URL to converge onto
    #[arg(long, short = 'e', value_name = "URL")]
    pub endpoint: String,

    /// Branch to check out (defaults to the remote default branch)
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Clone mode: full, only-commits, commits-and-trees, depth1, bare,
    /// bare-with-only-commits (defaults to the configured mode)
    #[arg(long, short = 'm', value_name = "MODE")]
    pub mode: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bring a directory to a clean checkout of a repository
    #[command(
        name = "reset",
        long_about = "Bring a directory to a clean checkout of a repository.\n\n\
            Uses the least destructive work that succeeds: an existing checkout of \
            the same repository is hard-reset, cleaned and fast-forwarded onto the \
            remote branch; a bare repository has its HEAD branch fetched. A missing \
            directory, a non-repository or a checkout of some other repository is \
            wiped and cloned afresh.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Converge ./app onto the default branch
    reposync reset app -e https://git.example.com/team/app.git

    # Shallow checkout of a release branch
    reposync reset app -e https://git.example.com/team/app.git -b release -m depth1"
    )]
    Reset {
        #[command(flatten)]
        workspace: WorkspaceArg,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Clone a repository into a directory
    #[command(
        name = "clone",
        after_help = "\
WORKFLOW EXAMPLES:
    # Commits only, no trees or blobs
    reposync clone app -e https://git.example.com/team/app.git -m only-commits"
    )]
    Clone {
        #[command(flatten)]
        workspace: WorkspaceArg,
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Make local branches mirror a remote's branches
    #[command(
        name = "mirror",
        long_about = "Make the local branch set mirror a remote's branch set.\n\n\
            Fetches the remote with --prune, deletes local branches the remote no \
            longer has, creates tracking branches for new remote branches and resets \
            every local branch to its remote tip."
    )]
    Mirror {
        #[command(flatten)]
        workspace: WorkspaceArg,

        /// Remote to mirror (defaults to the configured sync remote)
        #[arg(long, short = 'r')]
        remote: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch to a branch, creating it if needed
    #[command(name = "switch")]
    Switch {
        /// Branch to switch to
        branch: String,

        #[command(flatten)]
        workspace: WorkspaceArg,

        /// Recreate an existing branch at HEAD instead of checking it out
        #[arg(long)]
        overwrite: bool,
    },

    /// Commit all changes onto a branch
    #[command(
        name = "commit",
        after_help = "\
WORKFLOW EXAMPLES:
    # Record generated files on a results branch
    reposync commit out -m \"nightly build\" -b results"
    )]
    Commit {
        #[command(flatten)]
        workspace: WorkspaceArg,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Branch receiving the commit (recreated at HEAD if it exists)
        #[arg(short, long)]
        branch: String,
    },

    /// Push a branch to a repository through the dedicated push remote
    #[command(name = "push")]
    Push {
        #[command(flatten)]
        workspace: WorkspaceArg,

        /// Branch to push
        #[arg(short, long)]
        branch: String,

        /// Repository URL to push to
        #[arg(long, short = 'e', value_name = "URL")]
        endpoint: String,

        /// Overwrite the remote branch
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch the sync remote with escalating timeouts
    #[command(name = "fetch")]
    Fetch {
        #[command(flatten)]
        workspace: WorkspaceArg,
    },

    /// Show branch, remotes and bare/dirty flags
    #[command(name = "status")]
    Status {
        #[command(flatten)]
        workspace: WorkspaceArg,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the commit log
    #[command(name = "log")]
    Log {
        #[command(flatten)]
        workspace: WorkspaceArg,

        /// Maximum number of commits
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List local branches, or a remote's branches
    #[command(name = "branches")]
    Branches {
        #[command(flatten)]
        workspace: WorkspaceArg,

        /// List this remote's branches instead of local ones
        #[arg(long, short = 'r')]
        remote: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage stored credentials for HTTP(S) hosts
    #[command(
        name = "credential",
        after_help = "\
WORKFLOW EXAMPLES:
    # Store a token (prompted, not echoed)
    reposync credential set git.example.com

    # Store a token from a pipe
    echo \"$TOKEN\" | reposync credential set git.example.com --stdin

    # Check whether one is stored
    reposync credential check git.example.com"
    )]
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },

    /// Show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    reposync completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    reposync completion zsh >> ~/.zshrc"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Credential subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum CredentialAction {
    /// Store a token for a host
    Set {
        /// Host, with port if not the default (e.g. git.example.com:8443)
        host: String,

        /// Read the token from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },
    /// Delete the token for a host
    Delete {
        /// Host
        host: String,
    },
    /// Report whether a token is stored for a host
    Check {
        /// Host
        host: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the path of the loaded config file
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reset_arguments() {
        let cli = Cli::try_parse_from([
            "reposync", "reset", "ws", "-e", "https://h/r.git", "-b", "main", "-m", "depth1",
        ])
        .unwrap();
        match cli.command {
            Command::Reset { workspace, target } => {
                assert_eq!(workspace.path, Some(PathBuf::from("ws")));
                assert_eq!(target.endpoint, "https://h/r.git");
                assert_eq!(target.branch.as_deref(), Some("main"));
                assert_eq!(target.mode.as_deref(), Some("depth1"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["reposync", "status", "--debug", "-q"]).unwrap();
        assert!(cli.debug);
        assert!(cli.quiet);
    }

    #[test]
    fn switch_takes_branch_then_path() {
        let cli = Cli::try_parse_from(["reposync", "switch", "dev", "ws", "--overwrite"]).unwrap();
        match cli.command {
            Command::Switch {
                branch,
                workspace,
                overwrite,
            } => {
                assert_eq!(branch, "dev");
                assert_eq!(workspace.path, Some(PathBuf::from("ws")));
                assert!(overwrite);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
