//! actions command - Show which actions are enabled on an object

use std::path::Path;

use anyhow::Result;

use super::workspace::Workspace;
use crate::cli::Context;
use crate::engine::{ActionError, ErrorKind};

/// Check every action against `key` and print the verdicts.
pub fn actions(ctx: &Context, snapshot: &Path, key: &str) -> Result<()> {
    let mut ws = Workspace::open(ctx, snapshot)?;
    let subject = ws.facade(key)?;
    let manager = ws.session.manager_for(subject)?;

    if !ctx.quiet {
        println!("{} (manager: {})", ws.describe(subject)?, manager.name());
    }

    for (action, verdict) in ws.session.available(subject) {
        println!("{:<18} {}", action.name(), verdict_text(&verdict));
    }
    Ok(())
}

fn verdict_text(verdict: &Result<(), ActionError>) -> String {
    match verdict {
        Ok(()) => "enabled".to_string(),
        Err(err) if err.kind() == ErrorKind::MissingParameter => {
            format!("enabled (needs {})", expected_param(err))
        }
        Err(err) => format!("refused: {err}"),
    }
}

fn expected_param(err: &ActionError) -> &'static str {
    match err {
        ActionError::MissingParameter { expected, .. } => expected.description(),
        _ => "a parameter",
    }
}
