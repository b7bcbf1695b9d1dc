//! facade
//!
//! Identity-stable domain objects over the compiler model.
//!
//! # Architecture
//!
//! [`FacadeGraph`] owns the compiler model together with the
//! [`IdentityRegistry`], the [`TypeTracker`] and the versioning service, so
//! their lifetimes are the loaded model's lifetime. Facades are plain
//! [`FacadeId`]s; derived state (name, documentation, editability,
//! inheritance) is computed on demand from the wrapped node and its owners.
//!
//! Facades are created lazily: operations that may meet a node for the first
//! time (`facade_for`, `children`, `where_used`, ...) take `&mut self`.
//!
//! # Invariants
//!
//! - At most one facade per node; repeated lookups return the same id
//! - Type references change only through `assign_type`, `unassign_type`,
//!   `set_base_type` and `clear_base_type`, which keep where-used in step
//! - Deleted facades stay registered but their nodes are detached
//!
//! # Example
//!
//! ```
//! use dexedit::facade::FacadeGraph;
//! use dexedit::model::{Library, ModelBuilder, NodeKind};
//! use dexedit::versioning::ChainVersioning;
//!
//! let mut b = ModelBuilder::new();
//! let lib = b.library(Library::draft("Travel", "http://example.com/travel"));
//! let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
//!
//! let mut graph = FacadeGraph::new(b.build(), Box::new(ChainVersioning::default())).unwrap();
//! let facade = graph.facade_for(profile).unwrap();
//! assert_eq!(graph.facade_for(profile).unwrap(), facade);
//! assert_eq!(graph.children(facade).unwrap().len(), 3);
//! ```

pub mod kind;
pub mod registry;
pub mod tracker;

pub use kind::{classify, FacadeKind, MemberKind, PropertyBehavior, PropertyKind, ProviderClass};
pub use registry::{FacadeRecord, IdentityRegistry};
pub use tracker::{TypeSlot, TypeTracker};

use std::collections::HashSet;

use thiserror::Error;

use crate::core::naming::{reference_name, unique_name, upper_first, NamingRule};
use crate::core::types::{FacadeId, Fingerprint, LibraryId, NodeId};
use crate::model::{CompilerModel, FacetRole, ModelError, Node, NodeKind};
use crate::versioning::{policy, Editability, VersioningService};

/// Errors from facade-graph operations.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("node {node} is already wrapped by {existing}")]
    IdentityConflict { node: NodeId, existing: FacadeId },

    #[error("{provider} cannot be assigned as a type of {user}")]
    TypeMismatch { user: FacadeId, provider: FacadeId },

    #[error("unknown facade: {0}")]
    UnknownFacade(FacadeId),

    #[error("node {0} has no supported facade category")]
    Unsupported(NodeId),

    #[error("{facade}: {reason}")]
    Structure { facade: FacadeId, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FacadeError {
    fn structure(facade: FacadeId, reason: impl Into<String>) -> Self {
        FacadeError::Structure {
            facade,
            reason: reason.into(),
        }
    }
}

/// Documentation fields carried by every facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocField {
    Description,
    Example,
    Deprecation,
}

/// The facade graph over one loaded compiler model.
pub struct FacadeGraph {
    model: CompilerModel,
    registry: IdentityRegistry,
    tracker: TypeTracker,
    versioning: Box<dyn VersioningService>,
}

impl std::fmt::Debug for FacadeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacadeGraph")
            .field("facades", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl FacadeGraph {
    /// Take ownership of a model, indexing the type references it already has.
    pub fn new(
        model: CompilerModel,
        versioning: Box<dyn VersioningService>,
    ) -> Result<Self, FacadeError> {
        let tracker = TypeTracker::seed(&model)?;
        Ok(Self {
            model,
            registry: IdentityRegistry::new(),
            tracker,
            versioning,
        })
    }

    pub fn model(&self) -> &CompilerModel {
        &self.model
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &TypeTracker {
        &self.tracker
    }

    pub fn versioning(&self) -> &dyn VersioningService {
        self.versioning.as_ref()
    }

    /// Fingerprint of the underlying model.
    pub fn fingerprint(&self) -> Fingerprint {
        self.model.fingerprint()
    }

    // ---- identity ----

    /// The facade wrapping `node`, creating it on first lookup.
    ///
    /// # Errors
    ///
    /// [`FacadeError::Unsupported`] for node categories without a facade.
    pub fn facade_for(&mut self, node: NodeId) -> Result<FacadeId, FacadeError> {
        let kind = self.model.node(node)?.kind();
        self.registry
            .get_or_create(node, || classify(kind).ok_or(FacadeError::Unsupported(node)))
    }

    /// The facade wrapping `node`, if one was created.
    pub fn lookup(&self, node: NodeId) -> Option<FacadeId> {
        self.registry.get(node)
    }

    pub fn record(&self, id: FacadeId) -> Result<&FacadeRecord, FacadeError> {
        self.registry.record(id).ok_or(FacadeError::UnknownFacade(id))
    }

    pub fn kind(&self, id: FacadeId) -> Result<FacadeKind, FacadeError> {
        Ok(self.record(id)?.kind)
    }

    pub fn node_of(&self, id: FacadeId) -> Result<NodeId, FacadeError> {
        Ok(self.record(id)?.node)
    }

    fn node(&self, id: FacadeId) -> Result<&Node, FacadeError> {
        Ok(self.model.node(self.node_of(id)?)?)
    }

    pub fn is_attached(&self, id: FacadeId) -> Result<bool, FacadeError> {
        Ok(self.node(id)?.is_attached())
    }

    fn ensure_attached(&self, id: FacadeId) -> Result<NodeId, FacadeError> {
        let node = self.node_of(id)?;
        if !self.model.node(node)?.is_attached() {
            return Err(FacadeError::structure(id, "has been deleted"));
        }
        Ok(node)
    }

    /// Facades of a library's top-level members, skipping unsupported nodes.
    pub fn members(&mut self, library: LibraryId) -> Result<Vec<FacadeId>, FacadeError> {
        let members = self.model.library(library)?.members().to_vec();
        self.wrap_all(members)
    }

    // ---- derived state ----

    /// Derived name.
    ///
    /// Facets are named after their owner (`Profile_Summary`); requests and
    /// responses after their action. Everything else uses the node's name.
    pub fn name(&self, id: FacadeId) -> Result<String, FacadeError> {
        self.node_name(self.node_of(id)?)
    }

    fn node_name(&self, node: NodeId) -> Result<String, FacadeError> {
        let n = self.model.node(node)?;
        let owner_name = || -> Result<String, FacadeError> {
            match n.owner() {
                Some(owner) => self.node_name(owner),
                None => Ok(String::new()),
            }
        };
        let name = match n.kind() {
            NodeKind::Facet(role) => format!("{}_{}", owner_name()?, role.suffix()),
            NodeKind::ActionRequest => format!("{}_Request", owner_name()?),
            NodeKind::ActionResponse => format!("{}_Response", owner_name()?),
            _ => n.name().to_string(),
        };
        Ok(name)
    }

    /// True if the name of `id` is currently taken from its assigned type.
    pub fn name_follows_type(&self, id: FacadeId) -> Result<bool, FacadeError> {
        let node = self.node_of(id)?;
        let Some(provider) = self.tracker.provider_of(node, TypeSlot::Type) else {
            return Ok(false);
        };
        Ok(self.derived_user_name(self.kind(id)?, provider)?.is_some())
    }

    /// Rename a facade under its category's naming rule.
    ///
    /// Returns the name actually stored. Users whose names follow this
    /// provider are renamed with it. A facade whose name follows its
    /// assigned type cannot be renamed.
    pub fn set_name(&mut self, id: FacadeId, name: &str) -> Result<String, FacadeError> {
        let node = self.ensure_attached(id)?;
        let rule = match self.kind(id)?.naming() {
            Some(NamingRule::FromType) | None => {
                return Err(FacadeError::structure(id, "name is derived"));
            }
            Some(rule) => rule,
        };
        if self.name_follows_type(id)? {
            return Err(FacadeError::structure(id, "name is derived"));
        }
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FacadeError::structure(id, "name cannot be empty"));
        }

        let applied = rule.apply(trimmed);
        self.model.set_name(node, &applied)?;
        self.propagate_names(node)?;
        tracing::debug!(facade = %id, name = %applied, "renamed");
        Ok(applied)
    }

    fn propagate_names(&mut self, provider: NodeId) -> Result<(), FacadeError> {
        let mut providers = vec![provider];
        providers.extend(
            self.model
                .node(provider)?
                .children()
                .iter()
                .copied()
                .filter(|c| {
                    self.model
                        .node(*c)
                        .map(|n| matches!(n.kind(), NodeKind::Facet(_)))
                        .unwrap_or(false)
                }),
        );

        for provider in providers {
            for (user, slot) in self.tracker.users_of(provider) {
                if slot != TypeSlot::Type {
                    continue;
                }
                let Some(kind) = classify(self.model.node(user)?.kind()) else {
                    continue;
                };
                if let Some(name) = self.derived_user_name(kind, provider)? {
                    self.model.set_name(user, &name)?;
                }
            }
        }
        Ok(())
    }

    /// Name a user takes from `provider`, if its name follows the type.
    fn derived_user_name(
        &self,
        user: FacadeKind,
        provider: NodeId,
    ) -> Result<Option<String>, FacadeError> {
        let Some(property) = user.as_property() else {
            return Ok(None);
        };
        let provider_name = self.node_name(provider)?;
        if property.behavior().naming == NamingRule::FromType {
            return Ok(Some(reference_name(&provider_name, property.is_attribute())));
        }
        let controls = classify(self.model.node(provider)?.kind())
            .and_then(FacadeKind::provider_class)
            .is_some_and(ProviderClass::controls_name);
        if property == PropertyKind::Element && controls {
            return Ok(Some(upper_first(&provider_name)));
        }
        Ok(None)
    }

    pub fn documentation(&self, id: FacadeId, field: DocField) -> Result<String, FacadeError> {
        let doc = self.node(id)?.documentation();
        let text = match field {
            DocField::Description => &doc.description,
            DocField::Example => &doc.example,
            DocField::Deprecation => &doc.deprecation,
        };
        Ok(text.clone())
    }

    pub fn set_documentation(
        &mut self,
        id: FacadeId,
        field: DocField,
        text: &str,
    ) -> Result<(), FacadeError> {
        let node = self.ensure_attached(id)?;
        let doc = self.model.documentation_mut(node)?;
        let slot = match field {
            DocField::Description => &mut doc.description,
            DocField::Example => &mut doc.example,
            DocField::Deprecation => &mut doc.deprecation,
        };
        *slot = text.to_string();
        Ok(())
    }

    pub fn description(&self, id: FacadeId) -> Result<String, FacadeError> {
        self.documentation(id, DocField::Description)
    }

    pub fn example(&self, id: FacadeId) -> Result<String, FacadeError> {
        self.documentation(id, DocField::Example)
    }

    pub fn deprecation(&self, id: FacadeId) -> Result<String, FacadeError> {
        self.documentation(id, DocField::Deprecation)
    }

    pub fn is_mandatory(&self, id: FacadeId) -> Result<bool, FacadeError> {
        Ok(self.node(id)?.is_mandatory())
    }

    // ---- ownership and editability ----

    /// Top-level member containing the facade's node (a member owns itself).
    pub fn owning_member(&mut self, id: FacadeId) -> Result<FacadeId, FacadeError> {
        let member = self.owning_member_node(id)?;
        self.facade_for(member)
    }

    pub fn owning_member_node(&self, id: FacadeId) -> Result<NodeId, FacadeError> {
        Ok(self.model.member_of(self.node_of(id)?)?)
    }

    pub fn library_of(&self, id: FacadeId) -> Result<LibraryId, FacadeError> {
        Ok(self.node(id)?.library())
    }

    /// Editability of the library that actually owns the facade's node.
    pub fn editability(&self, id: FacadeId) -> Result<Editability, FacadeError> {
        let library = self.library_of(id)?;
        Ok(self.versioning.editability(&self.model, library))
    }

    /// Whether the facade's owning member is new to its version chain.
    pub fn is_new_to_chain(&self, id: FacadeId) -> Result<bool, FacadeError> {
        let member = self.owning_member_node(id)?;
        Ok(self.versioning.is_new_to_chain(&self.model, member))
    }

    /// Whether the facade may be edited at all.
    ///
    /// Inherited facades wrap their ancestor's node, so this is always the
    /// editability of the true source.
    pub fn is_editable(&self, id: FacadeId) -> Result<bool, FacadeError> {
        if !self.is_attached(id)? {
            return Ok(false);
        }
        Ok(policy::is_editable(
            self.editability(id)?,
            self.is_new_to_chain(id)?,
        ))
    }

    /// True when the facade is shown under `parent` but is owned elsewhere.
    ///
    /// The logical owner of a contributed facet is the object it contributes
    /// into; for every other node it is the structural owner.
    pub fn is_inherited(&self, id: FacadeId, parent: FacadeId) -> Result<bool, FacadeError> {
        let node = self.node(id)?;
        let logical = node.contributes_to().or(node.owner());
        Ok(logical != Some(self.node_of(parent)?))
    }

    // ---- structure ----

    /// Ordered children: structural children, then facets contributed into
    /// the node. Each node appears once; unsupported nodes are skipped.
    pub fn children(&mut self, id: FacadeId) -> Result<Vec<FacadeId>, FacadeError> {
        let node = self.node_of(id)?;
        let mut nodes = self.model.node(node)?.children().to_vec();
        nodes.extend(self.model.contributions(node));
        self.wrap_all(nodes)
    }

    /// Children contributed by ancestors along the extension chain.
    ///
    /// For a facet these are properties of the same facet in each base
    /// object; for an object, facets contributed into its bases. Names
    /// declared locally or nearer in the chain hide farther ones.
    pub fn inherited_children(&mut self, id: FacadeId) -> Result<Vec<FacadeId>, FacadeError> {
        let node = self.node_of(id)?;
        let candidates: Vec<NodeId> = match self.kind(id)? {
            FacadeKind::Facet(role) => match self.model.node(node)?.owner() {
                Some(owner) => self
                    .model
                    .base_chain(owner)
                    .into_iter()
                    .filter_map(|base| self.model.facet(base, role))
                    .map(|facet| self.model.node(facet).map(|n| n.children().to_vec()))
                    .collect::<Result<Vec<_>, _>>()?
                    .concat(),
                None => Vec::new(),
            },
            FacadeKind::Member(member) if member.supports_base_type() => self
                .model
                .base_chain(node)
                .into_iter()
                .flat_map(|base| self.model.contributions(base))
                .collect(),
            _ => Vec::new(),
        };

        let mut hidden: HashSet<String> = self
            .model
            .node(node)?
            .children()
            .iter()
            .map(|c| self.node_name(*c))
            .collect::<Result<_, _>>()?;
        let mut visible = Vec::new();
        for candidate in candidates {
            if hidden.insert(self.node_name(candidate)?) {
                visible.push(candidate);
            }
        }
        self.wrap_all(visible)
    }

    fn wrap_all(&mut self, nodes: Vec<NodeId>) -> Result<Vec<FacadeId>, FacadeError> {
        let mut seen = HashSet::new();
        let mut facades = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !seen.insert(node) {
                continue;
            }
            match self.facade_for(node) {
                Ok(facade) => facades.push(facade),
                Err(FacadeError::Unsupported(node)) => {
                    tracing::warn!(%node, "skipping node without a facade category");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(facades)
    }

    /// Node that holds new properties added to `subject`, if any.
    ///
    /// Facets hold their own properties; business and core objects add to
    /// their summary facet, choice objects to the shared facet.
    pub fn property_container(&self, subject: FacadeId) -> Result<Option<NodeId>, FacadeError> {
        let node = self.node_of(subject)?;
        let container = match self.kind(subject)? {
            FacadeKind::Facet(_) => Some(node),
            FacadeKind::Member(MemberKind::BusinessObject | MemberKind::CoreObject) => {
                self.model.facet(node, FacetRole::Summary)
            }
            FacadeKind::Member(MemberKind::ChoiceObject) => {
                self.model.facet(node, FacetRole::Shared)
            }
            FacadeKind::Member(MemberKind::ValueWithAttributes | MemberKind::ContextualFacet(_)) => {
                Some(node)
            }
            _ => None,
        };
        Ok(container)
    }

    /// Whether `subject` can hold a new property of `kind`.
    pub fn accepts_property(&self, subject: FacadeId, kind: PropertyKind) -> Result<bool, FacadeError> {
        let Some(container) = self.property_container(subject)? else {
            return Ok(false);
        };
        let container = self.model.node(container)?;
        if !container.is_attached() {
            return Ok(false);
        }
        Ok(match container.kind() {
            NodeKind::ValueWithAttributes => {
                matches!(kind, PropertyKind::Attribute | PropertyKind::Indicator)
            }
            _ => true,
        })
    }

    // ---- edits ----

    /// Add a property of `kind` to `subject`.
    ///
    /// `name` is normalized by the kind's naming rule and made unique among
    /// siblings; reference kinds ignore it and start from their default.
    pub fn add_property(
        &mut self,
        subject: FacadeId,
        kind: PropertyKind,
        name: Option<&str>,
    ) -> Result<FacadeId, FacadeError> {
        if !self.accepts_property(subject, kind)? {
            return Err(FacadeError::structure(
                subject,
                format!("cannot hold {kind} properties"),
            ));
        }
        let container = self
            .property_container(subject)?
            .ok_or_else(|| FacadeError::structure(subject, "has no property container"))?;

        let behavior = kind.behavior();
        let requested = match (behavior.naming, name.map(str::trim)) {
            (NamingRule::FromType, _) | (_, None) | (_, Some("")) => {
                behavior.default_name.to_string()
            }
            (rule, Some(name)) => rule.apply(name),
        };
        let taken = self.child_names(container)?;
        let name = unique_name(&requested, &taken);

        let node = self.model.add_child(container, kind.node_kind(), &name)?;
        if behavior.required {
            self.model.set_mandatory(node, true)?;
        }
        let facade = self.facade_for(node)?;
        tracing::debug!(%subject, %facade, %kind, %name, "property added");
        Ok(facade)
    }

    fn child_names(&self, node: NodeId) -> Result<Vec<String>, FacadeError> {
        self.model
            .node(node)?
            .children()
            .iter()
            .map(|c| self.node_name(*c))
            .collect()
    }

    /// Whether the facade's node already has a child named `name`.
    pub fn has_child_named(&self, id: FacadeId, name: &str) -> Result<bool, FacadeError> {
        let node = self.node_of(id)?;
        Ok(self.child_names(node)?.iter().any(|n| n == name))
    }

    fn add_named_child(
        &mut self,
        subject: FacadeId,
        kind: NodeKind,
        name: &str,
    ) -> Result<FacadeId, FacadeError> {
        let owner = self.ensure_attached(subject)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(FacadeError::structure(subject, "name cannot be empty"));
        }
        let taken = self.child_names(owner)?;
        if taken.iter().any(|t| t == name) {
            return Err(FacadeError::structure(
                subject,
                format!("'{name}' already exists"),
            ));
        }
        let node = self.model.add_child(owner, kind, name)?;
        self.facade_for(node)
    }

    /// Add an alias to an object.
    pub fn add_alias(&mut self, subject: FacadeId, name: &str) -> Result<FacadeId, FacadeError> {
        if !self.kind(subject)?.as_member().is_some_and(MemberKind::supports_aliases) {
            return Err(FacadeError::structure(subject, "cannot carry aliases"));
        }
        self.add_named_child(subject, NodeKind::Alias, &upper_first(name.trim()))
    }

    /// Add a literal to an enumeration.
    pub fn add_enum_value(
        &mut self,
        subject: FacadeId,
        literal: &str,
    ) -> Result<FacadeId, FacadeError> {
        if !self.kind(subject)?.as_member().is_some_and(MemberKind::is_enumeration) {
            return Err(FacadeError::structure(subject, "is not an enumeration"));
        }
        self.add_named_child(subject, NodeKind::EnumValue, literal)
    }

    pub fn set_mandatory(&mut self, id: FacadeId, mandatory: bool) -> Result<(), FacadeError> {
        let node = self.ensure_attached(id)?;
        if self.kind(id)?.as_property().is_none() {
            return Err(FacadeError::structure(id, "is not a property"));
        }
        self.model.set_mandatory(node, mandatory)?;
        Ok(())
    }

    /// Delete a facade's node and its subtree.
    ///
    /// Every reference into or out of the subtree is unassigned first, so
    /// where-used never holds a detached user or provider. Returns the
    /// detached nodes.
    pub fn delete(&mut self, id: FacadeId) -> Result<Vec<NodeId>, FacadeError> {
        let node = self.ensure_attached(id)?;
        for n in self.model.subtree(node)? {
            for slot in [TypeSlot::Type, TypeSlot::Base] {
                if self.tracker.provider_of(n, slot).is_some() {
                    self.tracker.unassign(&mut self.model, n, slot)?;
                }
            }
            for (user, slot) in self.tracker.users_of(n) {
                self.tracker.unassign(&mut self.model, user, slot)?;
            }
        }
        let detached = self.model.detach(node)?;
        tracing::debug!(facade = %id, nodes = detached.len(), "deleted");
        Ok(detached)
    }

    // ---- type relationships ----

    /// Check that `provider` may be assigned as the type of `user`.
    pub fn can_assign(&self, user: FacadeId, provider: FacadeId) -> Result<(), FacadeError> {
        self.ensure_attached(user)?;
        self.ensure_attached(provider)?;
        let allowed = self.kind(user)?.assignable().unwrap_or(&[]);
        let class = self.kind(provider)?.provider_class();
        match class {
            Some(class) if user != provider && allowed.contains(&class) => Ok(()),
            _ => Err(FacadeError::TypeMismatch { user, provider }),
        }
    }

    /// Assign `provider` as the type of `user`; returns the previous type.
    ///
    /// Incompatible pairs fail with [`FacadeError::TypeMismatch`] before
    /// anything changes. Users whose names follow their type are renamed.
    pub fn assign_type(
        &mut self,
        user: FacadeId,
        provider: FacadeId,
    ) -> Result<Option<NodeId>, FacadeError> {
        self.can_assign(user, provider)?;
        let user_node = self.node_of(user)?;
        let provider_node = self.node_of(provider)?;

        let previous =
            self.tracker
                .assign(&mut self.model, user_node, TypeSlot::Type, provider_node)?;
        if let Some(name) = self.derived_user_name(self.kind(user)?, provider_node)? {
            self.model.set_name(user_node, &name)?;
        }
        Ok(previous)
    }

    /// Clear the type of `user`; returns the previous type.
    pub fn unassign_type(&mut self, user: FacadeId) -> Result<Option<NodeId>, FacadeError> {
        let node = self.ensure_attached(user)?;
        Ok(self.tracker.unassign(&mut self.model, node, TypeSlot::Type)?)
    }

    /// Currently assigned type of `user`.
    pub fn assigned_type(&mut self, user: FacadeId) -> Result<Option<FacadeId>, FacadeError> {
        let node = self.node_of(user)?;
        self.tracker
            .provider_of(node, TypeSlot::Type)
            .map(|p| self.facade_for(p))
            .transpose()
    }

    /// Check that `member` may extend `base`.
    pub fn can_extend(&self, member: FacadeId, base: FacadeId) -> Result<(), FacadeError> {
        let member_node = self.ensure_attached(member)?;
        let base_node = self.ensure_attached(base)?;
        match (self.kind(member)?.as_member(), self.kind(base)?.as_member()) {
            (Some(a), Some(b)) if a == b && a.supports_base_type() => {}
            _ => return Err(FacadeError::TypeMismatch { user: member, provider: base }),
        }
        if member_node == base_node || self.model.base_chain(base_node).contains(&member_node) {
            return Err(FacadeError::structure(member, "extension would form a cycle"));
        }
        Ok(())
    }

    /// Make `member` extend `base`; returns the previous base.
    pub fn set_base_type(
        &mut self,
        member: FacadeId,
        base: FacadeId,
    ) -> Result<Option<NodeId>, FacadeError> {
        self.can_extend(member, base)?;
        let member_node = self.node_of(member)?;
        let base_node = self.node_of(base)?;
        Ok(self
            .tracker
            .assign(&mut self.model, member_node, TypeSlot::Base, base_node)?)
    }

    pub fn clear_base_type(&mut self, member: FacadeId) -> Result<Option<NodeId>, FacadeError> {
        let node = self.ensure_attached(member)?;
        Ok(self.tracker.unassign(&mut self.model, node, TypeSlot::Base)?)
    }

    pub fn base_type(&mut self, member: FacadeId) -> Result<Option<FacadeId>, FacadeError> {
        let node = self.node_of(member)?;
        self.tracker
            .provider_of(node, TypeSlot::Base)
            .map(|p| self.facade_for(p))
            .transpose()
    }

    /// Owning members of everything that uses `provider` as a type or base.
    pub fn where_used(&mut self, provider: FacadeId) -> Result<Vec<FacadeId>, FacadeError> {
        let node = self.node_of(provider)?;
        let members = self.tracker.where_used(node);
        self.wrap_all(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Library, LibraryStatus, ModelBuilder};
    use crate::versioning::{ChainVersioning, StaticVersioning};

    struct Travel {
        graph: FacadeGraph,
        profile: NodeId,
        address: NodeId,
        string: NodeId,
        code: NodeId,
    }

    fn travel() -> Travel {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("Travel", "http://example.com/travel"));
        let string = b.xsd("string").unwrap();
        let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
        let address = b.member(lib, NodeKind::CoreObject, "Address").unwrap();
        let code = b
            .property(profile, FacetRole::Summary, NodeKind::Attribute, "code")
            .unwrap();
        b.assign(code, string).unwrap();
        let graph = FacadeGraph::new(b.build(), Box::new(ChainVersioning::default())).unwrap();
        Travel { graph, profile, address, string, code }
    }

    #[test]
    fn facets_are_named_after_owner() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let names: Vec<String> = t
            .graph
            .children(profile)
            .unwrap()
            .into_iter()
            .map(|c| t.graph.name(c).unwrap())
            .collect();
        assert_eq!(names, vec!["Profile_ID", "Profile_Summary", "Profile_Detail"]);
    }

    #[test]
    fn seeded_references_are_tracked() {
        let mut t = travel();
        let string = t.graph.facade_for(t.string).unwrap();
        let profile = t.graph.facade_for(t.profile).unwrap();
        assert_eq!(t.graph.where_used(string).unwrap(), vec![profile]);
    }

    #[test]
    fn naming_rules_apply_on_rename() {
        let mut t = travel();
        let code = t.graph.facade_for(t.code).unwrap();
        assert_eq!(t.graph.set_name(code, "CountryCode").unwrap(), "countryCode");

        let profile = t.graph.facade_for(t.profile).unwrap();
        let summary = t.graph.children(profile).unwrap()[1];
        assert!(matches!(
            t.graph.set_name(summary, "Other"),
            Err(FacadeError::Structure { .. })
        ));
    }

    #[test]
    fn element_names_follow_object_provider() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let address = t.graph.facade_for(t.address).unwrap();
        let element = t
            .graph
            .add_property(profile, PropertyKind::Element, Some("home"))
            .unwrap();
        assert_eq!(t.graph.name(element).unwrap(), "Home");

        t.graph.assign_type(element, address).unwrap();
        assert_eq!(t.graph.name(element).unwrap(), "Address");

        t.graph.set_name(address, "PostalAddress").unwrap();
        assert_eq!(t.graph.name(element).unwrap(), "PostalAddress");
    }

    #[test]
    fn element_typed_by_object_cannot_be_renamed() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let address = t.graph.facade_for(t.address).unwrap();
        let element = t
            .graph
            .add_property(profile, PropertyKind::Element, Some("home"))
            .unwrap();
        assert!(!t.graph.name_follows_type(element).unwrap());

        t.graph.assign_type(element, address).unwrap();
        assert!(t.graph.name_follows_type(element).unwrap());
        let before = t.graph.fingerprint();
        assert!(matches!(
            t.graph.set_name(element, "Other"),
            Err(FacadeError::Structure { .. })
        ));
        assert_eq!(t.graph.fingerprint(), before);
        assert_eq!(t.graph.name(element).unwrap(), "Address");

        t.graph.unassign_type(element).unwrap();
        assert!(!t.graph.name_follows_type(element).unwrap());
        assert_eq!(t.graph.set_name(element, "Other").unwrap(), "Other");
    }

    #[test]
    fn reference_names_come_from_type() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let address = t.graph.facade_for(t.address).unwrap();
        let reference = t
            .graph
            .add_property(profile, PropertyKind::ElementRef, Some("ignored"))
            .unwrap();
        assert_eq!(t.graph.name(reference).unwrap(), "NewRef");

        t.graph.assign_type(reference, address).unwrap();
        assert_eq!(t.graph.name(reference).unwrap(), "AddressRef");
        assert!(t.graph.set_name(reference, "Other").is_err());
    }

    #[test]
    fn type_mismatch_changes_nothing() {
        let mut t = travel();
        let code = t.graph.facade_for(t.code).unwrap();
        let address = t.graph.facade_for(t.address).unwrap();
        let before = t.graph.fingerprint();

        let err = t.graph.assign_type(code, address).unwrap_err();
        assert!(matches!(err, FacadeError::TypeMismatch { .. }));
        assert_eq!(before, t.graph.fingerprint());
        assert!(t.graph.where_used(address).unwrap().is_empty());
    }

    #[test]
    fn add_property_resolves_container_and_uniquifies() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let first = t.graph.add_property(profile, PropertyKind::Attribute, None).unwrap();
        let second = t.graph.add_property(profile, PropertyKind::Attribute, None).unwrap();

        assert_eq!(t.graph.name(first).unwrap(), "newAttribute");
        assert_eq!(t.graph.name(second).unwrap(), "newAttribute1");
        assert_eq!(t.graph.owning_member(first).unwrap(), profile);

        let summary = t.graph.model().facet(t.profile, FacetRole::Summary).unwrap();
        assert_eq!(t.graph.node(first).unwrap().owner(), Some(summary));
    }

    #[test]
    fn id_attributes_start_mandatory() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let id = t.graph.add_property(profile, PropertyKind::IdAttribute, None).unwrap();
        assert!(t.graph.is_mandatory(id).unwrap());
    }

    #[test]
    fn aliases_and_values_need_the_right_owner() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let string = t.graph.facade_for(t.string).unwrap();

        let alias = t.graph.add_alias(profile, "traveler").unwrap();
        assert_eq!(t.graph.name(alias).unwrap(), "Traveler");
        assert!(t.graph.add_alias(profile, "Traveler").is_err());
        assert!(t.graph.add_alias(string, "Text").is_err());
        assert!(t.graph.add_enum_value(profile, "A").is_err());
    }

    #[test]
    fn delete_unassigns_subtree() {
        let mut t = travel();
        let code = t.graph.facade_for(t.code).unwrap();
        let string = t.graph.facade_for(t.string).unwrap();

        let detached = t.graph.delete(code).unwrap();
        assert_eq!(detached, vec![t.code]);
        assert!(t.graph.where_used(string).unwrap().is_empty());
        assert!(!t.graph.is_attached(code).unwrap());
        assert_eq!(t.graph.facade_for(t.code).unwrap(), code);
        assert!(t.graph.delete(code).is_err());
    }

    #[test]
    fn deleting_a_provider_clears_its_users() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let address = t.graph.facade_for(t.address).unwrap();
        let element = t.graph.add_property(profile, PropertyKind::Element, None).unwrap();
        t.graph.assign_type(element, address).unwrap();

        t.graph.delete(address).unwrap();
        assert_eq!(t.graph.assigned_type(element).unwrap(), None);
        assert_eq!(t.graph.model().node(t.graph.node_of(element).unwrap()).unwrap().type_ref(), None);
    }

    #[test]
    fn base_types_follow_member_kind() {
        let mut t = travel();
        let profile = t.graph.facade_for(t.profile).unwrap();
        let address = t.graph.facade_for(t.address).unwrap();
        assert!(matches!(
            t.graph.set_base_type(profile, address),
            Err(FacadeError::TypeMismatch { .. })
        ));
        assert!(t.graph.set_base_type(profile, profile).is_err());
    }

    #[test]
    fn inherited_properties_keep_their_source_editability() {
        let mut b = ModelBuilder::new();
        let frozen = b.library(
            Library::draft("Common", "http://example.com/common").with_status(LibraryStatus::Final),
        );
        let open = b.library(Library::draft("Travel", "http://example.com/travel"));
        let base = b.member(frozen, NodeKind::BusinessObject, "Party").unwrap();
        let name = b
            .property(base, FacetRole::Summary, NodeKind::Attribute, "name")
            .unwrap();
        let sub = b.member(open, NodeKind::BusinessObject, "Traveler").unwrap();
        let own = b
            .property(sub, FacetRole::Summary, NodeKind::Attribute, "loyalty")
            .unwrap();
        b.extend(sub, base).unwrap();

        let mut graph =
            FacadeGraph::new(b.build(), Box::new(ChainVersioning::default())).unwrap();
        let sub_summary = graph
            .facade_for(graph.model().facet(sub, FacetRole::Summary).unwrap())
            .unwrap();
        let inherited = graph.inherited_children(sub_summary).unwrap();
        let name_facade = graph.facade_for(name).unwrap();
        let own_facade = graph.facade_for(own).unwrap();

        assert_eq!(inherited, vec![name_facade]);
        assert!(graph.is_inherited(name_facade, sub_summary).unwrap());
        assert!(!graph.is_inherited(own_facade, sub_summary).unwrap());
        assert!(!graph.is_editable(name_facade).unwrap());
        assert!(graph.is_editable(own_facade).unwrap());

        let base_facade = graph.facade_for(base).unwrap();
        assert_eq!(graph.where_used(base_facade).unwrap(), vec![graph.facade_for(sub).unwrap()]);
    }

    #[test]
    fn contributed_facets_share_identity() {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("Travel", "ns"));
        let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
        let custom = b
            .member(
                lib,
                NodeKind::ContextualFacet(crate::model::ContextualRole::Custom),
                "Profile_Web",
            )
            .unwrap();
        b.contribute(custom, profile).unwrap();
        let mut graph =
            FacadeGraph::new(b.build(), Box::new(StaticVersioning::new(Editability::Editable)))
                .unwrap();

        let profile_facade = graph.facade_for(profile).unwrap();
        let from_parent = *graph.children(profile_facade).unwrap().last().unwrap();
        let members = graph.members(lib).unwrap();
        assert!(members.contains(&from_parent));
        assert!(!graph.is_inherited(from_parent, profile_facade).unwrap());
    }

    #[test]
    fn extension_points_are_skipped() {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("Travel", "ns"));
        b.member(lib, NodeKind::ExtensionPointFacet, "Ext").unwrap();
        let profile = b.member(lib, NodeKind::CoreObject, "Profile").unwrap();
        let mut graph =
            FacadeGraph::new(b.build(), Box::new(StaticVersioning::new(Editability::Editable)))
                .unwrap();

        let members = graph.members(lib).unwrap();
        assert_eq!(members, vec![graph.facade_for(profile).unwrap()]);
    }
}
