//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--user <id>`: Act as this user for repository lock checks
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dex - Inspect and edit schema model snapshots
#[derive(Parser, Debug)]
#[command(name = "dex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// User id consulted by repository lock checks (overrides config)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Minimal output
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

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the facade tree of a snapshot
    #[command(
        name = "tree",
        long_about = "Print the facade tree of a model snapshot.\n\n\
            Every library is listed with its editability, followed by its members \
            and their children. Assigned types are shown after an arrow.",
        after_help = "\
EXAMPLES:
    # Full tree
    dex tree travel.json

    # Hide built-in XML Schema types
    dex tree travel.json --no-builtins"
    )]
    Tree {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Skip built-in libraries
        #[arg(long)]
        no_builtins: bool,

        /// Show children inherited through extension
        #[arg(long)]
        inherited: bool,
    },

    /// List the members that use a type provider
    #[command(
        name = "where-used",
        after_help = "\
EXAMPLES:
    dex where-used travel.json Address
    dex where-used travel.json xsd:string"
    )]
    WhereUsed {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Snapshot key of the provider
        key: String,
    },

    /// Show which actions are enabled on an object
    #[command(
        name = "actions",
        long_about = "Show which actions are enabled on an object.\n\n\
            Each action is checked without a parameter. Actions that only need a \
            parameter are reported as available; everything else shows the reason \
            it is refused.",
        after_help = "\
EXAMPLES:
    dex actions travel.json Profile
    dex actions travel.json Profile.code"
    )]
    Actions {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Snapshot key of the subject
        key: String,
    },

    /// Run one action and print the events it published
    #[command(
        name = "run",
        long_about = "Run one action against a snapshot and print the events it published.\n\n\
            The snapshot file is not modified. Events are printed as JSON lines.",
        after_help = "\
EXAMPLES:
    # Add an attribute to a business object
    dex run travel.json add-property Profile --param attribute

    # Assign a type by snapshot key
    dex run travel.json assign-type Profile.code --param xsd:string

    # Make a property optional
    dex run travel.json set-mandatory Profile.code --param false"
    )]
    Run {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Action name (e.g. add-property, assign-type)
        action: String,

        /// Snapshot key of the subject
        key: String,

        /// Action parameter: text, true/false, a property kind, or a provider key
        #[arg(long)]
        param: Option<String>,
    },

    /// Check a snapshot's facade graph for inconsistencies
    #[command(name = "verify")]
    Verify {
        /// Snapshot file (JSON)
        snapshot: PathBuf,
    },

    /// Get, set, or list configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    List,

    /// Print the path configuration is loaded from
    Path,

    /// Set a value in the user configuration file
    Set {
        /// Configuration key (user, history_limit, log_filter,
        /// actions.minor_version_additions)
        key: String,

        /// Value to set
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_param() {
        let cli = Cli::try_parse_from([
            "dex",
            "--debug",
            "run",
            "model.json",
            "add-property",
            "Profile",
            "--param",
            "attribute",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::Run {
                action, key, param, ..
            } => {
                assert_eq!(action, "add-property");
                assert_eq!(key, "Profile");
                assert_eq!(param.as_deref(), Some("attribute"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn user_flag_is_global() {
        let cli = Cli::try_parse_from(["dex", "tree", "m.json", "--user", "alice"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
    }
}
