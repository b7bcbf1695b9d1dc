//! engine::handlers
//!
//! Dispatch table from action id to precondition and apply functions.
//!
//! # Invariants
//!
//! - A precondition never mutates the graph
//! - `apply` is only called after the precondition and the manager policy
//!   have passed, and fails before mutating when the graph refuses
//! - Subject checks run before parameter checks, so a missing parameter is
//!   reported only for a subject the action applies to

use crate::core::naming::{upper_first, NamingRule};
use crate::core::types::{FacadeId, NodeId};
use crate::events::{EventDetail, EventKind};
use crate::facade::{DocField, FacadeError, FacadeGraph, FacadeKind, MemberKind, PropertyKind, TypeSlot};

use super::action::{ActionError, ActionId, ActionParam};

/// One action invocation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Request<'a> {
    pub action: ActionId,
    pub subject: FacadeId,
    pub param: Option<&'a ActionParam>,
}

impl Request<'_> {
    fn mismatch(&self, reason: impl Into<String>) -> ActionError {
        ActionError::StructuralMismatch {
            action: self.action,
            subject: self.subject,
            reason: reason.into(),
        }
    }

    fn missing(&self) -> ActionError {
        ActionError::MissingParameter {
            action: self.action,
            expected: self.action.descriptor().param,
        }
    }

    fn facade(&self, err: FacadeError) -> ActionError {
        ActionError::from_facade(self.action, self.subject, err)
    }

    fn text(&self) -> Result<&str, ActionError> {
        match self.param {
            Some(ActionParam::Text(text)) => Ok(text),
            _ => Err(self.missing()),
        }
    }

    fn non_empty_text(&self) -> Result<&str, ActionError> {
        let text = self.text()?.trim();
        if text.is_empty() {
            return Err(self.mismatch("text cannot be empty"));
        }
        Ok(text)
    }

    fn flag(&self) -> Result<bool, ActionError> {
        match self.param {
            Some(ActionParam::Flag(flag)) => Ok(*flag),
            _ => Err(self.missing()),
        }
    }

    fn property(&self) -> Result<PropertyKind, ActionError> {
        match self.param {
            Some(ActionParam::Property(kind)) => Ok(*kind),
            _ => Err(self.missing()),
        }
    }

    fn provider(&self) -> Result<FacadeId, ActionError> {
        match self.param {
            Some(ActionParam::Provider(provider)) => Ok(*provider),
            _ => Err(self.missing()),
        }
    }

    fn kind(&self, graph: &FacadeGraph) -> Result<FacadeKind, ActionError> {
        graph.kind(self.subject).map_err(|e| self.facade(e))
    }

    fn node(&self, graph: &FacadeGraph) -> Result<NodeId, ActionError> {
        graph.node_of(self.subject).map_err(|e| self.facade(e))
    }
}

/// What an applied action changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Applied {
    pub event: EventKind,
    pub target: Option<FacadeId>,
    pub created: Option<FacadeId>,
    pub detached: Vec<NodeId>,
    pub detail: EventDetail,
}

impl Applied {
    fn change(event: EventKind) -> Self {
        Self {
            event,
            target: None,
            created: None,
            detached: Vec::new(),
            detail: EventDetail::None,
        }
    }

    fn created(facade: FacadeId) -> Self {
        Self {
            target: Some(facade),
            created: Some(facade),
            ..Self::change(EventKind::ChildAdded)
        }
    }

    fn deleted(detached: Vec<NodeId>) -> Self {
        Self {
            detached,
            ..Self::change(EventKind::ChildDeleted)
        }
    }
}

type Precondition = fn(&FacadeGraph, &Request<'_>) -> Result<(), ActionError>;
type Apply = fn(&mut FacadeGraph, &Request<'_>) -> Result<Applied, ActionError>;

struct Handler {
    id: ActionId,
    precondition: Precondition,
    apply: Apply,
}

const HANDLERS: [Handler; 15] = [
    Handler { id: ActionId::SetName, precondition: check_set_name, apply: apply_set_name },
    Handler { id: ActionId::SetDescription, precondition: check_documentation, apply: apply_documentation },
    Handler { id: ActionId::SetExample, precondition: check_documentation, apply: apply_documentation },
    Handler { id: ActionId::SetDeprecation, precondition: check_documentation, apply: apply_documentation },
    Handler { id: ActionId::SetMandatory, precondition: check_set_mandatory, apply: apply_set_mandatory },
    Handler { id: ActionId::AssignType, precondition: check_assign_type, apply: apply_assign_type },
    Handler { id: ActionId::ClearType, precondition: check_clear_type, apply: apply_clear_type },
    Handler { id: ActionId::SetBaseType, precondition: check_set_base_type, apply: apply_set_base_type },
    Handler { id: ActionId::ClearBaseType, precondition: check_clear_base_type, apply: apply_clear_base_type },
    Handler { id: ActionId::AddProperty, precondition: check_add_property, apply: apply_add_property },
    Handler { id: ActionId::DeleteProperty, precondition: check_delete_property, apply: apply_delete },
    Handler { id: ActionId::AddAlias, precondition: check_add_alias, apply: apply_add_alias },
    Handler { id: ActionId::DeleteAlias, precondition: check_delete_alias, apply: apply_delete },
    Handler { id: ActionId::AddEnumValue, precondition: check_add_enum_value, apply: apply_add_enum_value },
    Handler { id: ActionId::DeleteEnumValue, precondition: check_delete_enum_value, apply: apply_delete },
];

fn handler(action: ActionId) -> &'static Handler {
    &HANDLERS[action as usize]
}

/// Structural preconditions of `req.action` on `req.subject`.
pub(crate) fn precondition(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    let attached = graph.is_attached(req.subject).map_err(|e| req.facade(e))?;
    if !attached {
        return Err(req.mismatch("has been deleted"));
    }
    (handler(req.action).precondition)(graph, req)
}

/// Perform `req.action`.
pub(crate) fn apply(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    (handler(req.action).apply)(graph, req)
}

// ---- preconditions ----

fn check_set_name(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    match req.kind(graph)?.naming() {
        Some(NamingRule::FromType) | None => return Err(req.mismatch("name is derived")),
        Some(_) => {}
    }
    if graph.name_follows_type(req.subject).map_err(|e| req.facade(e))? {
        return Err(req.mismatch("name is derived"));
    }
    req.non_empty_text()?;
    Ok(())
}

fn check_documentation(_graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    req.text()?;
    Ok(())
}

fn check_set_mandatory(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if req.kind(graph)?.as_property().is_none() {
        return Err(req.mismatch("is not a property"));
    }
    req.flag()?;
    Ok(())
}

fn check_assign_type(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if req.kind(graph)?.assignable().is_none() {
        return Err(req.mismatch("does not take a type"));
    }
    let provider = req.provider()?;
    graph
        .can_assign(req.subject, provider)
        .map_err(|e| req.facade(e))
}

fn check_clear_type(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if req.kind(graph)?.assignable().is_none() {
        return Err(req.mismatch("does not take a type"));
    }
    let node = req.node(graph)?;
    if graph.tracker().provider_of(node, TypeSlot::Type).is_none() {
        return Err(req.mismatch("has no assigned type"));
    }
    Ok(())
}

fn check_set_base_type(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if !req
        .kind(graph)?
        .as_member()
        .is_some_and(MemberKind::supports_base_type)
    {
        return Err(req.mismatch("cannot extend another type"));
    }
    let base = req.provider()?;
    graph.can_extend(req.subject, base).map_err(|e| req.facade(e))
}

fn check_clear_base_type(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    let node = req.node(graph)?;
    if graph.tracker().provider_of(node, TypeSlot::Base).is_none() {
        return Err(req.mismatch("does not extend anything"));
    }
    Ok(())
}

fn check_add_property(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    let container = graph
        .property_container(req.subject)
        .map_err(|e| req.facade(e))?;
    if container.is_none() {
        return Err(req.mismatch("cannot hold properties"));
    }
    let kind = req.property()?;
    let accepted = graph
        .accepts_property(req.subject, kind)
        .map_err(|e| req.facade(e))?;
    if !accepted {
        return Err(req.mismatch(format!("cannot hold {kind} properties")));
    }
    Ok(())
}

fn check_delete_property(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if req.kind(graph)?.as_property().is_none() {
        return Err(req.mismatch("is not a property"));
    }
    Ok(())
}

fn check_unique_child(graph: &FacadeGraph, req: &Request<'_>, name: &str) -> Result<(), ActionError> {
    let taken = graph
        .has_child_named(req.subject, name)
        .map_err(|e| req.facade(e))?;
    if taken {
        return Err(req.mismatch(format!("'{name}' already exists")));
    }
    Ok(())
}

fn check_add_alias(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if !req
        .kind(graph)?
        .as_member()
        .is_some_and(MemberKind::supports_aliases)
    {
        return Err(req.mismatch("cannot carry aliases"));
    }
    let name = upper_first(req.non_empty_text()?);
    check_unique_child(graph, req, &name)
}

fn check_delete_alias(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if req.kind(graph)? != FacadeKind::Alias {
        return Err(req.mismatch("is not an alias"));
    }
    Ok(())
}

fn check_add_enum_value(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if !req
        .kind(graph)?
        .as_member()
        .is_some_and(MemberKind::is_enumeration)
    {
        return Err(req.mismatch("is not an enumeration"));
    }
    let literal = req.non_empty_text()?;
    check_unique_child(graph, req, literal)
}

fn check_delete_enum_value(graph: &FacadeGraph, req: &Request<'_>) -> Result<(), ActionError> {
    if req.kind(graph)? != FacadeKind::ValueLiteral {
        return Err(req.mismatch("is not an enumeration value"));
    }
    Ok(())
}

// ---- apply ----

fn apply_set_name(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let from = graph.name(req.subject).map_err(|e| req.facade(e))?;
    let to = graph
        .set_name(req.subject, req.non_empty_text()?)
        .map_err(|e| req.facade(e))?;
    Ok(Applied {
        detail: EventDetail::Renamed { from, to },
        ..Applied::change(EventKind::NameChange)
    })
}

fn apply_documentation(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let field = match req.action {
        ActionId::SetExample => DocField::Example,
        ActionId::SetDeprecation => DocField::Deprecation,
        _ => DocField::Description,
    };
    graph
        .set_documentation(req.subject, field, req.text()?)
        .map_err(|e| req.facade(e))?;
    Ok(Applied::change(EventKind::DocumentationChange))
}

fn apply_set_mandatory(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    graph
        .set_mandatory(req.subject, req.flag()?)
        .map_err(|e| req.facade(e))?;
    Ok(Applied::change(EventKind::MandatoryChange))
}

fn apply_assign_type(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let provider = req.provider()?;
    graph
        .assign_type(req.subject, provider)
        .map_err(|e| req.facade(e))?;
    Ok(Applied {
        target: Some(provider),
        ..Applied::change(EventKind::TypeChange)
    })
}

fn apply_clear_type(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    graph.unassign_type(req.subject).map_err(|e| req.facade(e))?;
    Ok(Applied::change(EventKind::TypeChange))
}

fn apply_set_base_type(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let base = req.provider()?;
    graph
        .set_base_type(req.subject, base)
        .map_err(|e| req.facade(e))?;
    Ok(Applied {
        target: Some(base),
        ..Applied::change(EventKind::TypeChange)
    })
}

fn apply_clear_base_type(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    graph
        .clear_base_type(req.subject)
        .map_err(|e| req.facade(e))?;
    Ok(Applied::change(EventKind::TypeChange))
}

fn apply_add_property(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let created = graph
        .add_property(req.subject, req.property()?, None)
        .map_err(|e| req.facade(e))?;
    Ok(Applied::created(created))
}

fn apply_add_alias(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let created = graph
        .add_alias(req.subject, req.non_empty_text()?)
        .map_err(|e| req.facade(e))?;
    Ok(Applied::created(created))
}

fn apply_add_enum_value(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let created = graph
        .add_enum_value(req.subject, req.non_empty_text()?)
        .map_err(|e| req.facade(e))?;
    Ok(Applied::created(created))
}

fn apply_delete(graph: &mut FacadeGraph, req: &Request<'_>) -> Result<Applied, ActionError> {
    let detached = graph.delete(req.subject).map_err(|e| req.facade(e))?;
    Ok(Applied::deleted(detached))
}
