//! model
//!
//! In-memory compiler model: the node arena that facades wrap.
//!
//! # Architecture
//!
//! The compiler model owns every schema element as a [`Node`] in an arena
//! addressed by [`NodeId`]. Libraries own their top-level members; members
//! own facets, properties, aliases and values through `children`. Nodes are
//! never removed from the arena: deleting one detaches it from its owner so
//! ids are never reused.
//!
//! # Invariants
//!
//! - A node's `owner` lists the node in its `children` while attached
//! - Type references and base types are only changed through
//!   [`crate::facade::FacadeGraph`], which keeps the where-used index in step
//! - Business, core and choice objects always carry their standard facets
//!
//! # Example
//!
//! ```
//! use dexedit::model::{CompilerModel, FacetRole, Library, NodeKind};
//!
//! let mut model = CompilerModel::new();
//! let lib = model.add_library(Library::draft("Travel", "http://example.com/travel"));
//! let profile = model.add_member(lib, NodeKind::BusinessObject, "Profile").unwrap();
//!
//! let summary = model.facet(profile, FacetRole::Summary).unwrap();
//! assert_eq!(model.node(summary).unwrap().owner(), Some(profile));
//! ```

pub mod builder;
pub mod snapshot;

pub use builder::ModelBuilder;
pub use snapshot::{LoadedModel, ModelSnapshot};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Fingerprint, LibraryId, NodeId, VersionNumber};

/// Errors from compiler-model operations.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("unknown library: {0}")]
    UnknownLibrary(LibraryId),

    #[error("{kind:?} cannot be a top-level library member")]
    NotAMember { kind: NodeKind },

    #[error("node {0} is detached from the model")]
    Detached(NodeId),

    #[error("snapshot reference '{key}' does not resolve")]
    DanglingReference { key: String },

    #[error("duplicate snapshot key '{0}'")]
    DuplicateKey(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Role of a standard facet inside its owning object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetRole {
    Id,
    Summary,
    Detail,
    Shared,
}

impl FacetRole {
    /// Suffix used in derived facet names.
    pub fn suffix(self) -> &'static str {
        match self {
            FacetRole::Id => "ID",
            FacetRole::Summary => "Summary",
            FacetRole::Detail => "Detail",
            FacetRole::Shared => "Shared",
        }
    }
}

/// Role of a contextual facet contributed into another object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextualRole {
    Custom,
    Query,
    Update,
    Choice,
}

/// Category of a compiler-model node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    BusinessObject,
    CoreObject,
    ChoiceObject,
    ValueWithAttributes,
    ClosedEnumeration,
    OpenEnumeration,
    SimpleType,
    XsdSimple,
    ContextualFacet(ContextualRole),
    Resource,
    Facet(FacetRole),
    ExtensionPointFacet,
    Attribute,
    IdAttribute,
    AttributeRef,
    Element,
    ElementRef,
    Indicator,
    IndicatorElement,
    Alias,
    EnumValue,
    ResourceAction,
    ActionRequest,
    ActionResponse,
    ParamGroup,
    Parameter,
}

impl NodeKind {
    /// True for kinds that live directly in a library.
    pub fn is_member(self) -> bool {
        matches!(
            self,
            NodeKind::BusinessObject
                | NodeKind::CoreObject
                | NodeKind::ChoiceObject
                | NodeKind::ValueWithAttributes
                | NodeKind::ClosedEnumeration
                | NodeKind::OpenEnumeration
                | NodeKind::SimpleType
                | NodeKind::XsdSimple
                | NodeKind::ContextualFacet(_)
                | NodeKind::Resource
                | NodeKind::ExtensionPointFacet
        )
    }

    /// True for attribute, element and indicator kinds.
    pub fn is_property(self) -> bool {
        matches!(
            self,
            NodeKind::Attribute
                | NodeKind::IdAttribute
                | NodeKind::AttributeRef
                | NodeKind::Element
                | NodeKind::ElementRef
                | NodeKind::Indicator
                | NodeKind::IndicatorElement
        )
    }

    /// Facets created together with a member of this kind.
    pub fn standard_facets(self) -> &'static [FacetRole] {
        match self {
            NodeKind::BusinessObject => &[FacetRole::Id, FacetRole::Summary, FacetRole::Detail],
            NodeKind::CoreObject => &[FacetRole::Summary, FacetRole::Detail],
            NodeKind::ChoiceObject => &[FacetRole::Shared],
            _ => &[],
        }
    }
}

/// Documentation carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Documentation {
    pub description: String,
    pub example: String,
    pub deprecation: String,
}

/// Publication status of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryStatus {
    #[default]
    Draft,
    UnderReview,
    Final,
    Obsolete,
}

/// A schema library: a named, versioned container of members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub name: String,
    /// Namespace without its version suffix; libraries in one version chain share it.
    pub namespace: String,
    pub version: VersionNumber,
    pub status: LibraryStatus,
    /// Managed libraries live in a repository and must be locked to edit.
    pub managed: bool,
    pub locked_by: Option<String>,
    pub builtin: bool,
    members: Vec<NodeId>,
}

impl Library {
    /// An unmanaged draft library at version 1.0.0.
    pub fn draft(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            version: VersionNumber::new(1, 0, 0),
            status: LibraryStatus::Draft,
            managed: false,
            locked_by: None,
            builtin: false,
            members: Vec::new(),
        }
    }

    /// Builder-style version override.
    pub fn with_version(mut self, version: VersionNumber) -> Self {
        self.version = version;
        self
    }

    /// Builder-style status override.
    pub fn with_status(mut self, status: LibraryStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark the library as repository-managed, optionally locked by a user.
    pub fn managed(mut self, locked_by: Option<&str>) -> Self {
        self.managed = true;
        self.locked_by = locked_by.map(str::to_string);
        self
    }

    /// Top-level members in declaration order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }
}

/// A schema element in the compiler model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    library: LibraryId,
    owner: Option<NodeId>,
    name: String,
    doc: Documentation,
    children: Vec<NodeId>,
    type_ref: Option<NodeId>,
    base: Option<NodeId>,
    contributes_to: Option<NodeId>,
    mandatory: bool,
    attached: bool,
}

impl Node {
    fn new(kind: NodeKind, library: LibraryId, owner: Option<NodeId>, name: &str) -> Self {
        Self {
            kind,
            library,
            owner,
            name: name.to_string(),
            doc: Documentation::default(),
            children: Vec::new(),
            type_ref: None,
            base: None,
            contributes_to: None,
            mandatory: false,
            attached: true,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn library(&self) -> LibraryId {
        self.library
    }

    /// Structural owner; `None` for top-level members.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &Documentation {
        &self.doc
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Assigned type, if any.
    pub fn type_ref(&self) -> Option<NodeId> {
        self.type_ref
    }

    /// Extended base type, if any.
    pub fn base(&self) -> Option<NodeId> {
        self.base
    }

    /// Object a contextual facet contributes into.
    pub fn contributes_to(&self) -> Option<NodeId> {
        self.contributes_to
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// The compiler model arena.
#[derive(Debug, Clone, Default)]
pub struct CompilerModel {
    libraries: Vec<Library>,
    nodes: Vec<Node>,
}

impl CompilerModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library and return its id.
    pub fn add_library(&mut self, library: Library) -> LibraryId {
        let id = LibraryId::from_index(self.libraries.len());
        self.libraries.push(library);
        id
    }

    pub fn library(&self, id: LibraryId) -> Result<&Library, ModelError> {
        self.libraries
            .get(id.index())
            .ok_or(ModelError::UnknownLibrary(id))
    }

    pub(crate) fn library_mut(&mut self, id: LibraryId) -> Result<&mut Library, ModelError> {
        self.libraries
            .get_mut(id.index())
            .ok_or(ModelError::UnknownLibrary(id))
    }

    /// All libraries with their ids.
    pub fn libraries(&self) -> impl Iterator<Item = (LibraryId, &Library)> {
        self.libraries
            .iter()
            .enumerate()
            .map(|(i, lib)| (LibraryId::from_index(i), lib))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, ModelError> {
        self.nodes.get(id.index()).ok_or(ModelError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ModelError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(ModelError::UnknownNode(id))
    }

    /// Every node id in the arena, attached or not.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Add a top-level member to a library.
    ///
    /// Business, core and choice objects receive their standard facets.
    pub fn add_member(
        &mut self,
        library: LibraryId,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeId, ModelError> {
        if !kind.is_member() {
            return Err(ModelError::NotAMember { kind });
        }
        self.library(library)?;

        let id = self.push_node(Node::new(kind, library, None, name));
        self.library_mut(library)?.members.push(id);

        for role in kind.standard_facets() {
            self.add_child(id, NodeKind::Facet(*role), "")?;
        }
        Ok(id)
    }

    /// Add a child node under `owner`.
    pub fn add_child(
        &mut self,
        owner: NodeId,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeId, ModelError> {
        let parent = self.node(owner)?;
        if !parent.attached {
            return Err(ModelError::Detached(owner));
        }
        let library = parent.library;

        let id = self.push_node(Node::new(kind, library, Some(owner), name));
        self.node_mut(owner)?.children.push(id);
        Ok(id)
    }

    /// Detach a node (and its subtree) from the model.
    ///
    /// Returns the detached node ids, the node itself first.
    pub fn detach(&mut self, id: NodeId) -> Result<Vec<NodeId>, ModelError> {
        let node = self.node(id)?;
        if !node.attached {
            return Err(ModelError::Detached(id));
        }
        let owner = node.owner;
        let library = node.library;

        match owner {
            Some(owner) => self.node_mut(owner)?.children.retain(|c| *c != id),
            None => self.library_mut(library)?.members.retain(|m| *m != id),
        }

        let subtree = self.subtree(id)?;
        for node in &subtree {
            self.node_mut(*node)?.attached = false;
        }
        Ok(subtree)
    }

    /// A node and all its descendants, pre-order.
    pub fn subtree(&self, id: NodeId) -> Result<Vec<NodeId>, ModelError> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            let node = self.node(current)?;
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(result)
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<(), ModelError> {
        self.node_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn documentation_mut(&mut self, id: NodeId) -> Result<&mut Documentation, ModelError> {
        Ok(&mut self.node_mut(id)?.doc)
    }

    pub fn set_mandatory(&mut self, id: NodeId, mandatory: bool) -> Result<(), ModelError> {
        self.node_mut(id)?.mandatory = mandatory;
        Ok(())
    }

    pub(crate) fn set_type_ref(
        &mut self,
        id: NodeId,
        provider: Option<NodeId>,
    ) -> Result<(), ModelError> {
        self.node_mut(id)?.type_ref = provider;
        Ok(())
    }

    pub(crate) fn set_base(&mut self, id: NodeId, base: Option<NodeId>) -> Result<(), ModelError> {
        self.node_mut(id)?.base = base;
        Ok(())
    }

    pub fn set_contributes_to(
        &mut self,
        id: NodeId,
        target: Option<NodeId>,
    ) -> Result<(), ModelError> {
        self.node_mut(id)?.contributes_to = target;
        Ok(())
    }

    /// The top-level member that contains `id` (a member contains itself).
    pub fn member_of(&self, id: NodeId) -> Result<NodeId, ModelError> {
        let mut current = id;
        loop {
            match self.node(current)?.owner {
                Some(owner) => current = owner,
                None => return Ok(current),
            }
        }
    }

    /// Standard facet of an object, if it has one in that role.
    pub fn facet(&self, member: NodeId, role: FacetRole) -> Option<NodeId> {
        let node = self.node(member).ok()?;
        node.children.iter().copied().find(|c| {
            self.node(*c)
                .map(|n| n.kind == NodeKind::Facet(role))
                .unwrap_or(false)
        })
    }

    /// Attached contextual facets contributed into `target`, in arena order.
    pub fn contributions(&self, target: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.attached && n.contributes_to == Some(target))
            .map(|(i, _)| NodeId::from_index(i))
            .collect()
    }

    /// Find an attached top-level member by name.
    pub fn find_member(&self, library: LibraryId, name: &str) -> Option<NodeId> {
        let lib = self.library(library).ok()?;
        lib.members.iter().copied().find(|m| {
            self.node(*m)
                .map(|n| n.attached && n.name == name)
                .unwrap_or(false)
        })
    }

    /// Libraries in the same version chain as `library`, oldest first.
    ///
    /// A chain is every library sharing namespace, name and major version.
    pub fn chain(&self, library: LibraryId) -> Vec<LibraryId> {
        let Ok(lib) = self.library(library) else {
            return Vec::new();
        };
        let mut chain: Vec<(LibraryId, &Library)> = self
            .libraries()
            .filter(|(_, other)| {
                other.namespace == lib.namespace
                    && other.name == lib.name
                    && other.version.major == lib.version.major
            })
            .collect();
        chain.sort_by(|a, b| a.1.version.cmp(&b.1.version));
        chain.into_iter().map(|(id, _)| id).collect()
    }

    /// Base-type chain of a member, nearest first, stopping at cycles.
    pub fn base_chain(&self, member: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::from([member]);
        let mut result = Vec::new();
        let mut current = self.node(member).ok().and_then(|n| n.base);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            result.push(base);
            current = self.node(base).ok().and_then(|n| n.base);
        }
        result
    }

    /// Fingerprint of all attached model content.
    pub fn fingerprint(&self) -> Fingerprint {
        let lines = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.attached)
            .map(|(i, n)| {
                format!(
                    "{} {:?} {} owner={:?} type={:?} base={:?} contrib={:?} m={} doc={}|{}|{} children={:?}",
                    NodeId::from_index(i),
                    n.kind,
                    n.name,
                    n.owner,
                    n.type_ref,
                    n.base,
                    n.contributes_to,
                    n.mandatory,
                    n.doc.description,
                    n.doc.example,
                    n.doc.deprecation,
                    n.children,
                )
            });
        Fingerprint::compute(lines)
    }
}
