//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::ConfigOverrides;

/// Top-level CLI parser for `labsync`.
#[derive(Debug, Parser)]
#[command(name = "labsync", version, about = "Reconcile declared links against an EVE-NG lab")]
pub struct Cli {
    /// Connection and state options shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted before or after any subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Lab server URL [env: EVE_HOST]
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Lab server user [env: EVE_USER]
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Lab server password [env: EVE_PASSWORD]
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// State file [env: LABSYNC_STATE]
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Connection settings given on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bring the lab in line with a link manifest.
    Apply {
        /// Link manifest (YAML).
        manifest: PathBuf,

        /// Print the plan without touching the lab.
        #[arg(long)]
        dry_run: bool,
    },
    /// Re-read every persisted link from the lab.
    Refresh,
    /// Tear persisted links down.
    Destroy {
        /// Only destroy this link.
        #[arg(long)]
        link: Option<String>,
    },
    /// Print the persisted link state.
    Show,
    /// Print a lab's connection listing.
    Topology {
        /// Lab path on the server, e.g. `/dc/core.unl`.
        #[arg(long)]
        lab: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_apply_with_dry_run() {
        let cli = Cli::parse_from(["labsync", "apply", "links.yaml", "--dry-run"]);
        let Command::Apply { manifest, dry_run } = cli.command else { panic!("expected apply") };
        assert_eq!(manifest.to_str(), Some("links.yaml"));
        assert!(dry_run);
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::parse_from(["labsync", "refresh", "--host", "lab.local", "-vv"]);
        assert!(matches!(cli.command, Command::Refresh));
        assert_eq!(cli.global.host.as_deref(), Some("lab.local"));
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.overrides().host.as_deref(), Some("lab.local"));
    }

    #[test]
    fn parses_destroy_with_link() {
        let cli = Cli::parse_from(["labsync", "destroy", "--link", "core"]);
        assert!(matches!(cli.command, Command::Destroy { link: Some(ref l) } if l == "core"));
    }

    #[test]
    fn topology_requires_a_lab() {
        assert!(Cli::try_parse_from(["labsync", "topology"]).is_err());
    }
}
