//! versioning
//!
//! Versioning service seam and the single editability policy.
//!
//! # Architecture
//!
//! The versioning service answers two read-only questions about the model:
//! how editable a library is ([`Editability`]), and whether a member is new
//! to its version chain. Everything that decides "may this change happen"
//! funnels through [`policy::permits`], so the rules live in one place.
//!
//! # Example
//!
//! ```
//! use dexedit::versioning::{policy, ChangeClass, Editability};
//!
//! // A member carried forward into a minor version accepts additions only.
//! assert!(policy::permits(Editability::MinorOnly, false, ChangeClass::Addition));
//! assert!(!policy::permits(Editability::MinorOnly, false, ChangeClass::Structural));
//! assert!(policy::permits(Editability::MinorOnly, true, ChangeClass::Structural));
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{LibraryId, NodeId};
use crate::model::{CompilerModel, LibraryStatus};

/// How freely a library may be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Editability {
    /// Newly created or latest draft, unmanaged or locked by the current user.
    Editable,
    /// Minor version in a chain: new members are editable, carried-forward
    /// members accept non-breaking additions only.
    MinorOnly,
    /// Finalized, superseded, or managed without a lock held by this user.
    ReadOnly,
}

impl Editability {
    pub fn description(&self) -> &'static str {
        match self {
            Editability::Editable => "editable",
            Editability::MinorOnly => "minor-version changes only",
            Editability::ReadOnly => "read-only",
        }
    }
}

impl std::fmt::Display for Editability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// What kind of change an action makes, for versioning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeClass {
    /// Description, example, deprecation text.
    Documentation,
    /// Non-breaking additions: optional properties, aliases, enum literals.
    Addition,
    /// Anything that can break consumers of an earlier version.
    Structural,
}

/// Read-only queries about versioning state.
///
/// Implementations must be pure with respect to the model they are given.
pub trait VersioningService {
    /// Editability class of a library.
    fn editability(&self, model: &CompilerModel, library: LibraryId) -> Editability;

    /// True if no earlier library in the member's chain declares a member
    /// with the same name.
    fn is_new_to_chain(&self, model: &CompilerModel, member: NodeId) -> bool;
}

/// Versioning derived from library status, locks and version chains.
///
/// # Rules
///
/// - Built-in libraries and libraries that are not drafts are read-only
/// - Managed libraries are read-only unless locked by the current user
/// - A library superseded by a later version in its chain is read-only
/// - A draft minor version with an earlier version in its chain is minor-only
/// - Everything else is editable
#[derive(Debug, Clone, Default)]
pub struct ChainVersioning {
    user: Option<String>,
}

impl ChainVersioning {
    /// Versioning as seen by `user` (`None` holds no locks).
    pub fn new(user: Option<String>) -> Self {
        Self { user }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

impl VersioningService for ChainVersioning {
    fn editability(&self, model: &CompilerModel, library: LibraryId) -> Editability {
        let Ok(lib) = model.library(library) else {
            return Editability::ReadOnly;
        };

        if lib.builtin || lib.status != LibraryStatus::Draft {
            return Editability::ReadOnly;
        }
        if lib.managed && (self.user.is_none() || lib.locked_by.as_deref() != self.user()) {
            return Editability::ReadOnly;
        }

        let chain = model.chain(library);
        if chain.last() != Some(&library) {
            return Editability::ReadOnly;
        }
        if lib.version.is_minor() && chain.len() > 1 {
            Editability::MinorOnly
        } else {
            Editability::Editable
        }
    }

    fn is_new_to_chain(&self, model: &CompilerModel, member: NodeId) -> bool {
        let Ok(node) = model.node(member) else {
            return false;
        };
        let Ok(lib) = model.library(node.library()) else {
            return false;
        };

        !model
            .chain(node.library())
            .into_iter()
            .filter_map(|id| model.library(id).ok().map(|l| (id, l)))
            .filter(|(_, earlier)| earlier.version < lib.version)
            .any(|(id, _)| model.find_member(id, node.name()).is_some())
    }
}

/// Fixed answers, for tests and for hosts that compute versioning elsewhere.
#[derive(Debug, Clone)]
pub struct StaticVersioning {
    default: Editability,
    libraries: HashMap<LibraryId, Editability>,
    carried_forward: HashSet<NodeId>,
}

impl StaticVersioning {
    /// Every library gets `default` unless overridden.
    pub fn new(default: Editability) -> Self {
        Self {
            default,
            libraries: HashMap::new(),
            carried_forward: HashSet::new(),
        }
    }

    /// Override one library's editability.
    pub fn library(mut self, library: LibraryId, editability: Editability) -> Self {
        self.libraries.insert(library, editability);
        self
    }

    /// Mark a member as carried forward from an earlier version.
    pub fn carried_forward(mut self, member: NodeId) -> Self {
        self.carried_forward.insert(member);
        self
    }
}

impl VersioningService for StaticVersioning {
    fn editability(&self, _model: &CompilerModel, library: LibraryId) -> Editability {
        self.libraries
            .get(&library)
            .copied()
            .unwrap_or(self.default)
    }

    fn is_new_to_chain(&self, _model: &CompilerModel, member: NodeId) -> bool {
        !self.carried_forward.contains(&member)
    }
}

/// The single editability policy.
pub mod policy {
    use super::{ChangeClass, Editability};

    /// Decide whether a change of class `change` is allowed on a member of a
    /// library with `editability`.
    ///
    /// `new_to_chain` only matters for minor versions: members first declared
    /// in this version are fully editable there.
    pub fn permits(editability: Editability, new_to_chain: bool, change: ChangeClass) -> bool {
        match editability {
            Editability::Editable => true,
            Editability::ReadOnly => false,
            Editability::MinorOnly => {
                new_to_chain || matches!(change, ChangeClass::Documentation | ChangeClass::Addition)
            }
        }
    }

    /// Whether a member counts as editable at all.
    pub fn is_editable(editability: Editability, new_to_chain: bool) -> bool {
        permits(editability, new_to_chain, ChangeClass::Structural)
    }
}
