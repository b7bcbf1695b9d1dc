//! verify command - Check a snapshot's facade graph for inconsistencies

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Result};

use super::workspace::Workspace;
use crate::cli::Context;
use crate::core::verify::verify_graph;

/// Wrap every node reachable from the libraries, then verify the graph.
pub fn verify(ctx: &Context, snapshot: &Path) -> Result<()> {
    let mut ws = Workspace::open(ctx, snapshot)?;

    let libraries: Vec<_> = ws
        .session
        .graph()
        .model()
        .libraries()
        .map(|(id, _)| id)
        .collect();
    let mut pending = Vec::new();
    for library in libraries {
        pending.extend(ws.session.graph_mut().members(library)?);
    }
    let mut seen = HashSet::new();
    while let Some(facade) = pending.pop() {
        if !seen.insert(facade) {
            continue;
        }
        pending.extend(ws.session.graph_mut().children(facade)?);
    }

    let result = verify_graph(ws.session.graph());
    if !result.ok {
        for error in &result.errors {
            eprintln!("  {error}");
        }
        bail!("{} inconsistencies found", result.errors.len());
    }

    if !ctx.quiet {
        println!("ok ({} objects checked)", seen.len());
    }
    Ok(())
}
