//! aim - AppImage manager
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Tracks AppImages published as GitHub releases, checks them for new
//! versions and keeps the installed files up to date.
//!
//! # Directory Layout
//!
//! ```text
//! ~/Applications/
//! ├── registry.json           # Tracked ids with current/latest versions
//! ├── aim.toml                # Optional settings
//! └── owner_project.AppImage  # Installed artifacts
//! ```

pub mod cmd;
pub mod session;
pub mod ui;

pub use aim_core::USER_AGENT;
pub use session::Session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "aim")]
#[command(author, version, about = "aim - AppImage manager for GitHub releases")]
pub struct Cli {
    /// Install directory (default: ~/Applications)
    #[arg(long, global = true, env = "AIM_HOME")]
    pub home: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track and install AppImages
    Install {
        /// Repository ids: owner/project
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete installed AppImages and stop tracking them
    Remove {
        /// Repository ids: owner/project
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Download new versions found by the last check
    Update {
        /// Specific ids to update (or all if empty)
        ids: Vec<String>,
    },
    /// Look up the latest release of tracked AppImages
    Check {
        /// Specific ids to check (or all if empty)
        ids: Vec<String>,
    },
    /// Find repositories that publish AppImages
    Search {
        /// Search keywords
        #[arg(required = true)]
        keywords: Vec<String>,
        /// Only list results, do not ask which one to install
        #[arg(long)]
        no_prompt: bool,
    },
    /// List tracked AppImages
    List,
    /// Check and update every tracked AppImage
    Auto,
}

/// Log filter directive for a `-v` count.
pub fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_without_ids() {
        let cli = Cli::try_parse_from(["aim", "update"]).unwrap();
        assert!(matches!(cli.command, Commands::Update { ids } if ids.is_empty()));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["aim", "check", "acme/tool", "-vv", "--home", "/tmp/apps"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/apps")));
        assert_eq!(log_directive(cli.verbose), "debug");
    }

    #[test]
    fn test_install_requires_ids() {
        assert!(Cli::try_parse_from(["aim", "install"]).is_err());
        assert!(Cli::try_parse_from(["aim", "frobnicate"]).is_err());
    }
}
