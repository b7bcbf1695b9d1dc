//! engine::action
//!
//! Action identifiers, descriptors, parameters and the error taxonomy.
//!
//! # Architecture
//!
//! Actions are a closed enum. Each [`ActionId`] has one static
//! [`ActionDescriptor`] row (name, label, change class, parameter kind) and
//! one handler row in [`super::handlers`]; nothing is looked up by name at
//! run time except when parsing user input.
//!
//! # Example
//!
//! ```
//! use dexedit::engine::{ActionId, ActionParam};
//! use dexedit::facade::PropertyKind;
//! use dexedit::versioning::ChangeClass;
//!
//! let add: ActionId = "add-property".parse().unwrap();
//! assert_eq!(add, ActionId::AddProperty);
//!
//! let optional = ActionParam::Property(PropertyKind::Attribute);
//! let id = ActionParam::Property(PropertyKind::IdAttribute);
//! assert_eq!(add.change_class(Some(&optional)), ChangeClass::Addition);
//! assert_eq!(add.change_class(Some(&id)), ChangeClass::Structural);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{FacadeId, NodeId};
use crate::facade::{FacadeError, PropertyKind};
use crate::versioning::{ChangeClass, Editability};

/// Identifier of an editing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionId {
    SetName,
    SetDescription,
    SetExample,
    SetDeprecation,
    SetMandatory,
    AssignType,
    ClearType,
    SetBaseType,
    ClearBaseType,
    AddProperty,
    DeleteProperty,
    AddAlias,
    DeleteAlias,
    AddEnumValue,
    DeleteEnumValue,
}

/// What an action's secondary parameter must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    None,
    Text,
    Flag,
    Property,
    Provider,
}

impl ParamKind {
    pub fn description(self) -> &'static str {
        match self {
            ParamKind::None => "no parameter",
            ParamKind::Text => "text",
            ParamKind::Flag => "true or false",
            ParamKind::Property => "a property kind",
            ParamKind::Provider => "a type provider",
        }
    }
}

/// Static description of an action.
#[derive(Debug, Clone, Copy)]
pub struct ActionDescriptor {
    pub id: ActionId,
    /// Stable kebab-case name used on the command line.
    pub name: &'static str,
    pub label: &'static str,
    /// Change class when it does not depend on the parameter.
    pub change: ChangeClass,
    pub param: ParamKind,
}

const fn row(
    id: ActionId,
    name: &'static str,
    label: &'static str,
    change: ChangeClass,
    param: ParamKind,
) -> ActionDescriptor {
    ActionDescriptor {
        id,
        name,
        label,
        change,
        param,
    }
}

const DESCRIPTORS: [ActionDescriptor; 15] = [
    row(ActionId::SetName, "set-name", "Rename", ChangeClass::Structural, ParamKind::Text),
    row(ActionId::SetDescription, "set-description", "Set Description", ChangeClass::Documentation, ParamKind::Text),
    row(ActionId::SetExample, "set-example", "Set Example", ChangeClass::Documentation, ParamKind::Text),
    row(ActionId::SetDeprecation, "set-deprecation", "Set Deprecation", ChangeClass::Documentation, ParamKind::Text),
    row(ActionId::SetMandatory, "set-mandatory", "Set Mandatory", ChangeClass::Structural, ParamKind::Flag),
    row(ActionId::AssignType, "assign-type", "Assign Type", ChangeClass::Structural, ParamKind::Provider),
    row(ActionId::ClearType, "clear-type", "Clear Type", ChangeClass::Structural, ParamKind::None),
    row(ActionId::SetBaseType, "set-base-type", "Extend", ChangeClass::Structural, ParamKind::Provider),
    row(ActionId::ClearBaseType, "clear-base-type", "Remove Extension", ChangeClass::Structural, ParamKind::None),
    row(ActionId::AddProperty, "add-property", "Add Property", ChangeClass::Addition, ParamKind::Property),
    row(ActionId::DeleteProperty, "delete-property", "Delete Property", ChangeClass::Structural, ParamKind::None),
    row(ActionId::AddAlias, "add-alias", "Add Alias", ChangeClass::Addition, ParamKind::Text),
    row(ActionId::DeleteAlias, "delete-alias", "Delete Alias", ChangeClass::Structural, ParamKind::None),
    row(ActionId::AddEnumValue, "add-enum-value", "Add Value", ChangeClass::Addition, ParamKind::Text),
    row(ActionId::DeleteEnumValue, "delete-enum-value", "Delete Value", ChangeClass::Structural, ParamKind::None),
];

impl ActionId {
    pub const ALL: [ActionId; 15] = [
        ActionId::SetName,
        ActionId::SetDescription,
        ActionId::SetExample,
        ActionId::SetDeprecation,
        ActionId::SetMandatory,
        ActionId::AssignType,
        ActionId::ClearType,
        ActionId::SetBaseType,
        ActionId::ClearBaseType,
        ActionId::AddProperty,
        ActionId::DeleteProperty,
        ActionId::AddAlias,
        ActionId::DeleteAlias,
        ActionId::AddEnumValue,
        ActionId::DeleteEnumValue,
    ];

    pub fn descriptor(self) -> &'static ActionDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Change class of this action with `param`.
    ///
    /// Making a property mandatory or adding a required (id) property changes
    /// structure; making it optional or adding an optional one is an addition.
    pub fn change_class(self, param: Option<&ActionParam>) -> ChangeClass {
        match (self, param) {
            (ActionId::SetMandatory, Some(ActionParam::Flag(false))) => ChangeClass::Addition,
            (ActionId::AddProperty, Some(ActionParam::Property(kind))) if kind.behavior().required => {
                ChangeClass::Structural
            }
            _ => self.descriptor().change,
        }
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error parsing an action or parameter from text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown property kind '{0}'")]
    UnknownPropertyKind(String),

    #[error("expected true or false, got '{0}'")]
    InvalidFlag(String),
}

impl FromStr for ActionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionId::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| ParseError::UnknownAction(s.to_string()))
    }
}

/// Parse a property kind from its snake or kebab case name.
pub fn parse_property_kind(s: &str) -> Result<PropertyKind, ParseError> {
    let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
    let kind = match normalized.as_str() {
        "attribute" => PropertyKind::Attribute,
        "id_attribute" | "id" => PropertyKind::IdAttribute,
        "attribute_ref" => PropertyKind::AttributeRef,
        "element" => PropertyKind::Element,
        "element_ref" => PropertyKind::ElementRef,
        "indicator" => PropertyKind::Indicator,
        "indicator_element" => PropertyKind::IndicatorElement,
        _ => return Err(ParseError::UnknownPropertyKind(s.to_string())),
    };
    Ok(kind)
}

/// Secondary action parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParam {
    Text(String),
    Flag(bool),
    Property(PropertyKind),
    Provider(FacadeId),
}

impl ActionParam {
    pub fn kind(&self) -> ParamKind {
        match self {
            ActionParam::Text(_) => ParamKind::Text,
            ActionParam::Flag(_) => ParamKind::Flag,
            ActionParam::Property(_) => ParamKind::Property,
            ActionParam::Provider(_) => ParamKind::Provider,
        }
    }

    /// Parse a flag parameter.
    pub fn parse_flag(s: &str) -> Result<Self, ParseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(ActionParam::Flag(true)),
            "false" | "no" | "0" => Ok(ActionParam::Flag(false)),
            _ => Err(ParseError::InvalidFlag(s.to_string())),
        }
    }
}

/// Result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: ActionId,
    pub subject: FacadeId,
    /// Facade the action created, if any.
    pub created: Option<FacadeId>,
    /// Nodes the action detached, if any.
    pub detached: Vec<NodeId>,
    /// Id of the change event published for this run.
    pub event: uuid::Uuid,
}

/// Kind of an action failure, for callers that branch on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotEditable,
    NotPermitted,
    StructuralMismatch,
    TypeMismatch,
    MissingParameter,
    Internal,
}

/// Why an action was refused or failed.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{action} on {subject}: library is {editability}")]
    NotEditable {
        action: ActionId,
        subject: FacadeId,
        editability: Editability,
    },

    #[error("{action} on {subject} is not permitted: {reason}")]
    NotPermitted {
        action: ActionId,
        subject: FacadeId,
        reason: String,
    },

    #[error("{action} does not apply to {subject}: {reason}")]
    StructuralMismatch {
        action: ActionId,
        subject: FacadeId,
        reason: String,
    },

    #[error("{action}: {provider} is not a valid type for {subject}")]
    TypeMismatch {
        action: ActionId,
        subject: FacadeId,
        provider: FacadeId,
    },

    #[error("{action} requires {}", .expected.description())]
    MissingParameter { action: ActionId, expected: ParamKind },

    #[error(transparent)]
    Facade(#[from] FacadeError),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::NotEditable { .. } => ErrorKind::NotEditable,
            ActionError::NotPermitted { .. } => ErrorKind::NotPermitted,
            ActionError::StructuralMismatch { .. } => ErrorKind::StructuralMismatch,
            ActionError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ActionError::MissingParameter { .. } => ErrorKind::MissingParameter,
            ActionError::Facade(_) => ErrorKind::Internal,
        }
    }

    /// Translate a facade failure raised while checking or running `action`.
    pub(crate) fn from_facade(action: ActionId, subject: FacadeId, err: FacadeError) -> Self {
        match err {
            FacadeError::TypeMismatch { provider, .. } => ActionError::TypeMismatch {
                action,
                subject,
                provider,
            },
            FacadeError::Structure { reason, .. } => ActionError::StructuralMismatch {
                action,
                subject,
                reason,
            },
            other => ActionError::Facade(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_table_is_indexed_by_id() {
        for action in ActionId::ALL {
            assert_eq!(action.descriptor().id, action);
            assert_eq!(action.name().parse::<ActionId>().unwrap(), action);
        }
    }

    #[test]
    fn serde_names_match_descriptor_names() {
        for action in ActionId::ALL {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, action.name());
        }
    }

    #[test]
    fn mandatory_change_class_depends_on_flag() {
        assert_eq!(
            ActionId::SetMandatory.change_class(Some(&ActionParam::Flag(true))),
            ChangeClass::Structural
        );
        assert_eq!(
            ActionId::SetMandatory.change_class(Some(&ActionParam::Flag(false))),
            ChangeClass::Addition
        );
        assert_eq!(ActionId::SetMandatory.change_class(None), ChangeClass::Structural);
    }

    #[test]
    fn parses_property_kinds_and_flags() {
        assert_eq!(parse_property_kind("id-attribute").unwrap(), PropertyKind::IdAttribute);
        assert_eq!(parse_property_kind("Element_Ref").unwrap(), PropertyKind::ElementRef);
        assert!(parse_property_kind("widget").is_err());
        assert_eq!(ActionParam::parse_flag("Yes").unwrap(), ActionParam::Flag(true));
        assert!(ActionParam::parse_flag("maybe").is_err());
        assert!("explode".parse::<ActionId>().is_err());
    }

    #[test]
    fn error_kinds() {
        let subject = FacadeId::from_index(0);
        let err = ActionError::from_facade(
            ActionId::AddAlias,
            subject,
            FacadeError::Structure {
                facade: subject,
                reason: "cannot carry aliases".into(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
        let err = ActionError::from_facade(
            ActionId::AddAlias,
            subject,
            FacadeError::UnknownFacade(subject),
        );
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
