//! events::event
//!
//! Immutable change and navigation records exchanged over the bus.
//!
//! # Event Categories
//!
//! - Value changes: `NameChange`, `DocumentationChange`, `MandatoryChange`
//! - Structural changes: `TypeChange`, `ChildAdded`, `ChildDeleted`
//! - `ValidationChange`: recorded validation outcome of a member changed
//! - `Navigation`: a member should become visible
//! - `Lock`: a view group's navigation lock was engaged or released

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{FacadeId, UtcTimestamp, ViewGroupId};

/// Kinds of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NameChange,
    DocumentationChange,
    MandatoryChange,
    TypeChange,
    ChildAdded,
    ChildDeleted,
    ValidationChange,
    Navigation,
    Lock,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::NameChange,
        EventKind::DocumentationChange,
        EventKind::MandatoryChange,
        EventKind::TypeChange,
        EventKind::ChildAdded,
        EventKind::ChildDeleted,
        EventKind::ValidationChange,
        EventKind::Navigation,
        EventKind::Lock,
    ];

    /// Events that signal the model object itself changed shape.
    ///
    /// These reach handlers even in a locked view group.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            EventKind::TypeChange | EventKind::ChildAdded | EventKind::ChildDeleted
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::NameChange => "name-change",
            EventKind::DocumentationChange => "documentation-change",
            EventKind::MandatoryChange => "mandatory-change",
            EventKind::TypeChange => "type-change",
            EventKind::ChildAdded => "child-added",
            EventKind::ChildDeleted => "child-deleted",
            EventKind::ValidationChange => "validation-change",
            EventKind::Navigation => "navigation",
            EventKind::Lock => "lock",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetail {
    #[default]
    None,
    /// A view group's lock state.
    Lock { group: ViewGroupId, engaged: bool },
    /// Name before and after a rename.
    Renamed { from: String, to: String },
    /// Whether the member now validates.
    Validation { valid: bool, findings: usize },
}

/// A published event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexEvent {
    pub id: Uuid,
    pub kind: EventKind,
    /// Object the event is about.
    pub subject: Option<FacadeId>,
    /// Navigation target, or the child an action created or removed.
    pub target: Option<FacadeId>,
    #[serde(default)]
    pub detail: EventDetail,
    /// True for navigation events replayed by back/forward.
    #[serde(default)]
    pub replayed: bool,
    pub timestamp: UtcTimestamp,
}

impl DexEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject: None,
            target: None,
            detail: EventDetail::None,
            replayed: false,
            timestamp: UtcTimestamp::now(),
        }
    }

    /// A change event about `subject`.
    pub fn change(kind: EventKind, subject: FacadeId) -> Self {
        Self::new(kind).with_subject(subject)
    }

    /// A navigation event making `target` visible.
    pub fn navigation(target: FacadeId) -> Self {
        let mut event = Self::new(EventKind::Navigation);
        event.target = Some(target);
        event
    }

    /// A lock-state event for `group`.
    pub fn lock(group: ViewGroupId, engaged: bool) -> Self {
        Self::new(EventKind::Lock).with_detail(EventDetail::Lock { group, engaged })
    }

    pub fn with_subject(mut self, subject: FacadeId) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_target(mut self, target: Option<FacadeId>) -> Self {
        self.target = target;
        self
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    pub(crate) fn replayed(mut self) -> Self {
        self.replayed = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_kinds() {
        let structural: Vec<_> = EventKind::ALL
            .into_iter()
            .filter(|k| k.is_structural())
            .collect();
        assert_eq!(
            structural,
            vec![EventKind::TypeChange, EventKind::ChildAdded, EventKind::ChildDeleted]
        );
    }

    #[test]
    fn events_have_distinct_ids() {
        let a = DexEvent::new(EventKind::NameChange);
        let b = DexEvent::new(EventKind::NameChange);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_with_tagged_detail() {
        let group = ViewGroupId::new("members").unwrap();
        let event = DexEvent::lock(group, true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "lock");
        assert_eq!(json["detail"]["type"], "lock");
        assert_eq!(json["detail"]["engaged"], true);

        let back: DexEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
