//! run command - Run one action and print the events it published
//!
//! The snapshot file is left untouched; the session lives only for this
//! invocation.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context as _, Result};

use super::workspace::Workspace;
use crate::cli::Context;
use crate::core::verify::verify_graph;
use crate::engine::{parse_property_kind, ActionId, ActionParam, ParamKind};

/// Run `action` on `key` with an optional parameter.
pub fn run(
    ctx: &Context,
    snapshot: &Path,
    action: &str,
    key: &str,
    param: Option<&str>,
) -> Result<()> {
    let action: ActionId = action.parse()?;
    let mut ws = Workspace::open(ctx, snapshot)?;
    let subject = ws.facade(key)?;
    let param = parse_param(&mut ws, action, param)?;

    let published = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&published);
    ws.session
        .bus_mut()
        .subscribe(&[], None, move |event| sink.borrow_mut().push(event.clone()));

    let outcome = ws
        .session
        .run(action, subject, param.as_ref())
        .with_context(|| format!("{action} on '{key}' was refused"))?;

    let verified = verify_graph(ws.session.graph());
    for error in &verified.errors {
        tracing::warn!(%error, "graph inconsistent after action");
    }

    if !ctx.quiet {
        let mut summary = format!("{action} applied to {}", ws.describe(subject)?);
        if let Some(created) = outcome.created {
            summary.push_str(&format!("; created {}", ws.describe(created)?));
        }
        if !outcome.detached.is_empty() {
            summary.push_str(&format!("; detached {} node(s)", outcome.detached.len()));
        }
        eprintln!("{summary}");
    }

    for event in published.borrow().iter() {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn parse_param(
    ws: &mut Workspace,
    action: ActionId,
    raw: Option<&str>,
) -> Result<Option<ActionParam>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let param = match action.descriptor().param {
        ParamKind::None => bail!("{action} takes no parameter"),
        ParamKind::Text => ActionParam::Text(raw.to_string()),
        ParamKind::Flag => ActionParam::parse_flag(raw)?,
        ParamKind::Property => ActionParam::Property(parse_property_kind(raw)?),
        ParamKind::Provider => ActionParam::Provider(ws.facade(raw)?),
    };
    Ok(Some(param))
}
