//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads the snapshot into a session (see [`workspace`])
//! 2. Calls the session or facade graph
//! 3. Formats and displays output
//!
//! Human-oriented summaries go to stderr; machine-readable output (event
//! JSON lines, where-used keys) goes to stdout.

mod actions;
mod config_cmd;
mod run;
mod tree;
mod verify;
mod where_used;
pub mod workspace;

// Re-export command functions for testing and direct invocation
pub use actions::actions;
pub use config_cmd::{list as config_list, path as config_path, set as config_set};
pub use run::run;
pub use tree::tree;
pub use verify::verify;
pub use where_used::where_used;

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Tree {
            snapshot,
            no_builtins,
            inherited,
        } => tree(ctx, &snapshot, no_builtins, inherited),
        Command::WhereUsed { snapshot, key } => where_used(ctx, &snapshot, &key),
        Command::Actions { snapshot, key } => actions(ctx, &snapshot, &key),
        Command::Run {
            snapshot,
            action,
            key,
            param,
        } => run(ctx, &snapshot, &action, &key, param.as_deref()),
        Command::Verify { snapshot } => verify(ctx, &snapshot),
        Command::Config { action } => match action {
            ConfigAction::List => config_list(ctx),
            ConfigAction::Path => config_path(ctx),
            ConfigAction::Set { key, value } => config_set(ctx, &key, &value),
        },
    }
}
