//! tree command - Print the facade tree of a snapshot

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;

use super::workspace::Workspace;
use crate::cli::Context;
use crate::core::types::FacadeId;

/// Print every library, its members and their children.
pub fn tree(ctx: &Context, snapshot: &Path, no_builtins: bool, inherited: bool) -> Result<()> {
    let mut ws = Workspace::open(ctx, snapshot)?;

    let libraries: Vec<_> = ws
        .session
        .graph()
        .model()
        .libraries()
        .filter(|(_, lib)| !(no_builtins && lib.builtin))
        .map(|(id, lib)| (id, format!("{} {}", lib.name, lib.version)))
        .collect();

    for (library, title) in libraries {
        let editability = ws
            .session
            .graph()
            .versioning()
            .editability(ws.session.graph().model(), library);
        println!("{title} ({editability})");

        let members = ws.session.graph_mut().members(library)?;
        let mut visited = HashSet::new();
        for member in members {
            print_node(&mut ws, member, 1, inherited, &mut visited)?;
        }
    }
    Ok(())
}

fn print_node(
    ws: &mut Workspace,
    facade: FacadeId,
    depth: usize,
    inherited: bool,
    visited: &mut HashSet<FacadeId>,
) -> Result<()> {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{}", ws.describe(facade)?);

    let graph = ws.session.graph_mut();
    if graph.is_mandatory(facade)? {
        line.push_str(" *");
    }
    if let Some(provider) = graph.assigned_type(facade)? {
        line.push_str(&format!(" -> {}", graph.name(provider)?));
    }
    if let Some(base) = graph.base_type(facade)? {
        line.push_str(&format!(" extends {}", graph.name(base)?));
    }
    println!("{line}");

    // Contributed facets appear under their target and at top level
    if !visited.insert(facade) {
        return Ok(());
    }

    let children = ws.session.graph_mut().children(facade)?;
    for child in children {
        print_node(ws, child, depth + 1, inherited, visited)?;
    }

    if inherited {
        let from_bases = ws.session.graph_mut().inherited_children(facade)?;
        for child in from_bases {
            println!("{}  ^ {}", indent, ws.describe(child)?);
        }
    }
    Ok(())
}
