//! where-used command - List the members that use a type provider

use std::path::Path;

use anyhow::Result;

use super::workspace::Workspace;
use crate::cli::Context;

/// Print the owning members of every user of `key`.
pub fn where_used(ctx: &Context, snapshot: &Path, key: &str) -> Result<()> {
    let mut ws = Workspace::open(ctx, snapshot)?;
    let provider = ws.facade(key)?;
    let users = ws.session.graph_mut().where_used(provider)?;

    if users.is_empty() {
        if !ctx.quiet {
            eprintln!("{key} is not used");
        }
        return Ok(());
    }

    for user in users {
        let label = ws.describe(user)?;
        match ws.key_of(user) {
            Some(user_key) => println!("{user_key}\t{label}"),
            None => println!("{label}"),
        }
    }
    Ok(())
}
