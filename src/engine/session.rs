//! engine::session
//!
//! `DexSession`: the facade graph, the event bus and the validation seam
//! behind one `is_enabled`/`run` surface.
//!
//! # Architecture
//!
//! The session picks the [`ActionManager`] for each subject from the
//! editability of the library that owns it, runs the action, then publishes
//! exactly one change event naming the subject. When a validator is set,
//! the owning member is re-validated afterwards and a `ValidationChange`
//! event follows if its recorded state changed.
//!
//! All of this happens on the caller's thread; handlers have run by the time
//! `run` returns.

use std::collections::HashMap;

use crate::core::types::FacadeId;
use crate::events::{DexEvent, EventBus, EventDetail, EventKind};
use crate::facade::FacadeGraph;

use super::action::{ActionError, ActionId, ActionOutcome, ActionParam};
use super::manager::ActionManager;
use super::validation::{ValidationState, Validator};

/// Settings that shape manager policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Allow non-breaking additions to members carried forward into a minor
    /// version.
    pub minor_version_additions: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            minor_version_additions: true,
        }
    }
}

/// An editing session over one loaded model.
pub struct DexSession {
    graph: FacadeGraph,
    bus: EventBus,
    settings: SessionSettings,
    validator: Option<Box<dyn Validator>>,
    validation: HashMap<FacadeId, ValidationState>,
}

impl std::fmt::Debug for DexSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DexSession")
            .field("graph", &self.graph)
            .field("bus", &self.bus)
            .field("settings", &self.settings)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

static UNKNOWN: ValidationState = ValidationState::Unknown;

impl DexSession {
    pub fn new(graph: FacadeGraph) -> Self {
        Self {
            graph,
            bus: EventBus::default(),
            settings: SessionSettings::default(),
            validator: None,
            validation: HashMap::new(),
        }
    }

    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn graph(&self) -> &FacadeGraph {
        &self.graph
    }

    /// Mutable graph access for lookups that create facades.
    pub fn graph_mut(&mut self) -> &mut FacadeGraph {
        &mut self.graph
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// The manager governing `subject`.
    pub fn manager_for(&self, subject: FacadeId) -> Result<ActionManager, ActionError> {
        let editability = self.graph.editability(subject)?;
        Ok(ActionManager::for_editability(
            editability,
            self.settings.minor_version_additions,
        ))
    }

    /// Why `action` may not run, or `Ok` if it may.
    pub fn check(
        &self,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> Result<(), ActionError> {
        self.manager_for(subject)?
            .check(&self.graph, action, subject, param)
    }

    pub fn is_enabled(
        &self,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> bool {
        self.check(action, subject, param).is_ok()
    }

    /// The error `run` would return, if any.
    pub fn denial(
        &self,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> Option<ActionError> {
        self.check(action, subject, param).err()
    }

    /// Every action checked against `subject` without a parameter.
    ///
    /// `MissingParameter` means the action applies once a parameter is given.
    pub fn available(&self, subject: FacadeId) -> Vec<(ActionId, Result<(), ActionError>)> {
        ActionId::ALL
            .into_iter()
            .map(|action| (action, self.check(action, subject, None)))
            .collect()
    }

    /// Check and run `action`, then publish its change event.
    ///
    /// On error nothing is mutated and nothing is published.
    pub fn run(
        &mut self,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> Result<ActionOutcome, ActionError> {
        let manager = self.manager_for(subject)?;
        let applied = match manager.run(&mut self.graph, action, subject, param) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::debug!(%action, %subject, manager = manager.name(), kind = ?err.kind(), "action refused");
                return Err(err);
            }
        };

        let event = DexEvent::change(applied.event, subject)
            .with_target(applied.target)
            .with_detail(applied.detail);
        let delivered = self.bus.post(&event);
        tracing::debug!(%action, %subject, kind = %event.kind, delivered, "action applied");

        self.revalidate(subject);

        Ok(ActionOutcome {
            action,
            subject,
            created: applied.created,
            detached: applied.detached,
            event: event.id,
        })
    }

    /// Recorded validation state of a member.
    pub fn validation(&self, member: FacadeId) -> &ValidationState {
        self.validation.get(&member).unwrap_or(&UNKNOWN)
    }

    fn revalidate(&mut self, subject: FacadeId) {
        let Some(validator) = self.validator.as_mut() else {
            return;
        };
        let member = match self.graph.owning_member(subject) {
            Ok(member) => member,
            Err(err) => {
                tracing::warn!(%subject, error = %err, "cannot find member to validate");
                return;
            }
        };

        let state = validator.validate(&self.graph, member);
        if self.validation.get(&member) == Some(&state) {
            return;
        }
        let detail = EventDetail::Validation {
            valid: state.is_valid(),
            findings: state.findings().len(),
        };
        self.validation.insert(member, state);
        self.bus
            .post(&DexEvent::change(EventKind::ValidationChange, member).with_detail(detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::engine::validation::UntypedPropertyValidator;
    use crate::engine::ErrorKind;
    use crate::facade::PropertyKind;
    use crate::model::{Library, ModelBuilder, NodeKind};
    use crate::versioning::ChainVersioning;

    fn session() -> (DexSession, FacadeId) {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("Travel", "ns"));
        let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
        let mut graph =
            FacadeGraph::new(b.build(), Box::new(ChainVersioning::default())).unwrap();
        let profile = graph.facade_for(profile).unwrap();
        (DexSession::new(graph), profile)
    }

    #[test]
    fn run_publishes_one_event_naming_subject() {
        let (mut session, profile) = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session
            .bus_mut()
            .subscribe(&[], None, move |e| sink.borrow_mut().push(e.clone()));

        let param = ActionParam::Property(PropertyKind::Attribute);
        let outcome = session
            .run(ActionId::AddProperty, profile, Some(&param))
            .unwrap();

        let events = seen.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject, Some(profile));
        assert_eq!(events[0].kind, EventKind::ChildAdded);
        assert_eq!(events[0].target, outcome.created);
        assert_eq!(events[0].id, outcome.event);
    }

    #[test]
    fn refusal_publishes_nothing() {
        let (mut session, profile) = session();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        session
            .bus_mut()
            .subscribe(&[], None, move |_| *sink.borrow_mut() += 1);

        let err = session.run(ActionId::DeleteAlias, profile, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn validation_changes_are_published() {
        let (session, profile) = session();
        let mut session = session.with_validator(UntypedPropertyValidator);
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&kinds);
        session
            .bus_mut()
            .subscribe(&[], None, move |e| sink.borrow_mut().push(e.kind));

        let param = ActionParam::Property(PropertyKind::Attribute);
        session.run(ActionId::AddProperty, profile, Some(&param)).unwrap();
        assert_eq!(session.validation(profile).findings().len(), 1);

        let doc = ActionParam::Text("A traveler".into());
        session.run(ActionId::SetDescription, profile, Some(&doc)).unwrap();

        assert_eq!(
            *kinds.borrow(),
            vec![
                EventKind::ChildAdded,
                EventKind::ValidationChange,
                EventKind::DocumentationChange
            ]
        );
    }

    #[test]
    fn available_lists_every_action() {
        let (session, profile) = session();
        let available = session.available(profile);
        assert_eq!(available.len(), ActionId::ALL.len());
        let add_property = available
            .iter()
            .find(|(a, _)| *a == ActionId::AddProperty)
            .unwrap();
        assert_eq!(
            add_property.1.as_ref().unwrap_err().kind(),
            ErrorKind::MissingParameter
        );
    }
}
