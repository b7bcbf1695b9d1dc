//! engine::manager
//!
//! The ActionManager family: versioning-aware permission policies.
//!
//! # Architecture
//!
//! A manager holds no per-object state. Its decisions are pure functions of
//! the action, the subject, the optional parameter and the subject's
//! versioning context as reported by the facade graph. Checking runs in two
//! stages, policy first and handler preconditions second, and `run` performs
//! exactly the checks `is_enabled` reports on before mutating anything.
//!
//! # Policies
//!
//! | Manager            | Permits                                                   |
//! |--------------------|-----------------------------------------------------------|
//! | `Full`             | anything on an editable library                           |
//! | `ReadOnly`         | nothing                                                   |
//! | `MinorVersionOnly` | anything on members new to the chain; additions otherwise |

use serde::{Deserialize, Serialize};

use crate::core::types::FacadeId;
use crate::facade::FacadeGraph;
use crate::versioning::{policy, ChangeClass, Editability};

use super::action::{ActionError, ActionId, ActionParam};
use super::handlers::{self, Applied, Request};

/// Action policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionManager {
    Full,
    ReadOnly,
    /// `additions` false denies even non-breaking additions on members
    /// carried forward into this version.
    MinorVersionOnly { additions: bool },
}

impl ActionManager {
    /// The manager for a subject whose library has `editability`.
    pub fn for_editability(editability: Editability, minor_version_additions: bool) -> Self {
        match editability {
            Editability::Editable => ActionManager::Full,
            Editability::MinorOnly => ActionManager::MinorVersionOnly {
                additions: minor_version_additions,
            },
            Editability::ReadOnly => ActionManager::ReadOnly,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionManager::Full => "full",
            ActionManager::ReadOnly => "read-only",
            ActionManager::MinorVersionOnly { .. } => "minor-version-only",
        }
    }

    /// Every reason `action` may not run on `subject`, first failure wins.
    pub fn check(
        &self,
        graph: &FacadeGraph,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> Result<(), ActionError> {
        self.check_policy(graph, action, subject, param)?;
        handlers::precondition(
            graph,
            &Request {
                action,
                subject,
                param,
            },
        )
    }

    fn check_policy(
        &self,
        graph: &FacadeGraph,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> Result<(), ActionError> {
        let not_permitted = |reason: &str| ActionError::NotPermitted {
            action,
            subject,
            reason: reason.to_string(),
        };

        match self {
            ActionManager::ReadOnly => Err(not_permitted("subject is read-only")),
            ActionManager::Full => {
                let editability = graph.editability(subject)?;
                if editability != Editability::Editable {
                    return Err(ActionError::NotEditable {
                        action,
                        subject,
                        editability,
                    });
                }
                Ok(())
            }
            ActionManager::MinorVersionOnly { additions } => {
                let editability = graph.editability(subject)?;
                if editability == Editability::ReadOnly {
                    return Err(ActionError::NotEditable {
                        action,
                        subject,
                        editability,
                    });
                }
                let change = action.change_class(param);
                if graph.is_new_to_chain(subject)? {
                    return Ok(());
                }
                if change == ChangeClass::Addition && !additions {
                    return Err(not_permitted("additions to carried-forward members are disabled"));
                }
                if !policy::permits(Editability::MinorOnly, false, change) {
                    return Err(not_permitted(
                        "member is carried forward from an earlier version",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Whether `action` may run. Never fails.
    pub fn is_enabled(
        &self,
        graph: &FacadeGraph,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> bool {
        self.check(graph, action, subject, param).is_ok()
    }

    /// Check and perform `action`.
    pub(crate) fn run(
        &self,
        graph: &mut FacadeGraph,
        action: ActionId,
        subject: FacadeId,
        param: Option<&ActionParam>,
    ) -> Result<Applied, ActionError> {
        self.check(graph, action, subject, param)?;
        handlers::apply(
            graph,
            &Request {
                action,
                subject,
                param,
            },
        )
    }
}
