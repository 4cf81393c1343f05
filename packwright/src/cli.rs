//! CLI argument definitions for packwright.
//!
//! This module defines the command-line interface using clap. It is kept
//! apart from the entrypoint so the binary only orchestrates.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::pipeline::Goal;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Build, package and publish mod archives.
#[derive(Parser, Debug)]
#[command(name = "packwright")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build, package and publish mod archives.\n\n",
    "packwright merges compiled source-set outputs into versioned archives, ",
    "hands them to an external remapper, copies the final archive to stable ",
    "locations and uploads it to CurseForge or Modrinth.\n\n",
    "Settings are read from packwright.toml in the current directory unless ",
    "--config names another file.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Show the version this build would carry:\n",
    "    $ packwright version\n\n",
    "  Show the task order of a goal:\n",
    "    $ packwright plan build\n\n",
    "  Build every archive and copy the final one:\n",
    "    $ packwright build\n\n",
    "  Preview a release to one platform:\n",
    "    $ packwright --release publish --dry-run --target modrinth\n",
))]
pub struct Cli {
    /// Path to the project configuration.
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,

    /// Build a release: no revision suffix in the version.
    #[arg(long, global = true)]
    pub release: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report errors.
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the resolved build version.
    Version,

    /// Print the task order of a goal without running it.
    Plan {
        /// Goal to plan.
        #[arg(value_enum)]
        goal: Goal,
    },

    /// Produce every archive.
    Assemble,

    /// Produce every archive and copy the final one to its fixed locations.
    Build,

    /// Produce the final archive and upload it.
    Publish(PublishArgs),
}

/// Arguments for the publish command.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishArgs {
    /// Describe each upload without reading tokens or touching the network.
    #[arg(long)]
    pub dry_run: bool,

    /// Publish only to the named target (can be repeated).
    #[arg(short, long = "target", value_name = "NAME")]
    pub targets: Vec<String>,
}

impl Command {
    /// The goal this command runs, if any.
    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        match self {
            Self::Assemble => Some(Goal::Assemble),
            Self::Build => Some(Goal::Build),
            Self::Publish(_) => Some(Goal::Publish),
            Self::Version | Self::Plan { .. } => None,
        }
    }

    /// Publish arguments, or the defaults for other commands.
    #[must_use]
    pub fn publish_args(&self) -> PublishArgs {
        match self {
            Self::Publish(args) => args.clone(),
            _ => PublishArgs::default(),
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
