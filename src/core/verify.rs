//! core::verify
//!
//! Consistency verification of a facade graph.
//!
//! # Checks
//!
//! - **Identity**: every node is wrapped by at most one facade, and the
//!   registry's lookup agrees with its records
//! - **Where-used**: the tracker's index and the model's type references and
//!   base types describe the same assignments
//! - **Structure**: owners and children agree, library member lists match
//!   top-level nodes, and attached nodes reference only attached nodes
//!
//! # Invariants
//!
//! - Never mutates the graph
//! - Must be deterministic

use std::collections::HashMap;

use thiserror::Error;

use crate::core::types::{FacadeId, LibraryId, NodeId};
use crate::facade::{FacadeGraph, IdentityRegistry, TypeSlot, TypeTracker};
use crate::model::{CompilerModel, ModelError};

/// One inconsistency found by verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("node {node} is wrapped by facades {first} and {second}")]
    DuplicateFacade {
        node: NodeId,
        first: FacadeId,
        second: FacadeId,
    },

    #[error("registry lookup for node {node} disagrees with facade {facade}")]
    LookupMismatch { node: NodeId, facade: FacadeId },

    #[error("node {user} {slot:?} reference is {model:?} in the model but {indexed:?} in the where-used index")]
    IndexMismatch {
        user: NodeId,
        slot: TypeSlot,
        model: Option<NodeId>,
        indexed: Option<NodeId>,
    },

    #[error("attached node {user} references detached node {provider}")]
    DanglingReference { user: NodeId, provider: NodeId },

    #[error("node {child} is not listed among the children of its owner {owner}")]
    OrphanChild { owner: NodeId, child: NodeId },

    #[error("node {child} is listed under {owner} but owned elsewhere")]
    ForeignChild { owner: NodeId, child: NodeId },

    #[error("member {member} is missing from library {library}")]
    UnlistedMember { library: LibraryId, member: NodeId },

    #[error("model error during verification: {0}")]
    Model(String),
}

/// Result of verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }
}

/// Verify identity, where-used and structural consistency of `graph`.
pub fn verify_graph(graph: &FacadeGraph) -> VerifyResult {
    verify_parts(graph.model(), graph.registry(), graph.tracker())
}

/// Verify a model against an identity registry and a where-used index.
pub fn verify_parts(
    model: &CompilerModel,
    registry: &IdentityRegistry,
    tracker: &TypeTracker,
) -> VerifyResult {
    let mut errors = Vec::new();

    check_identity(registry, &mut errors);
    if let Err(e) = check_structure(model, &mut errors) {
        errors.push(VerifyError::Model(e.to_string()));
    }
    if let Err(e) = check_where_used(model, tracker, &mut errors) {
        errors.push(VerifyError::Model(e.to_string()));
    }

    if errors.is_empty() {
        VerifyResult::success()
    } else {
        VerifyResult::failure(errors)
    }
}

fn check_identity(registry: &IdentityRegistry, errors: &mut Vec<VerifyError>) {
    let mut seen: HashMap<NodeId, FacadeId> = HashMap::new();
    for record in registry.iter() {
        if let Some(first) = seen.insert(record.node, record.id) {
            errors.push(VerifyError::DuplicateFacade {
                node: record.node,
                first,
                second: record.id,
            });
        }
        if registry.get(record.node) != Some(record.id) {
            errors.push(VerifyError::LookupMismatch {
                node: record.node,
                facade: record.id,
            });
        }
    }
}

fn check_structure(model: &CompilerModel, errors: &mut Vec<VerifyError>) -> Result<(), ModelError> {
    for id in model.node_ids() {
        let node = model.node(id)?;
        if !node.is_attached() {
            continue;
        }

        match node.owner() {
            Some(owner) => {
                if !model.node(owner)?.children().contains(&id) {
                    errors.push(VerifyError::OrphanChild { owner, child: id });
                }
            }
            None => {
                if !model.library(node.library())?.members().contains(&id) {
                    errors.push(VerifyError::UnlistedMember {
                        library: node.library(),
                        member: id,
                    });
                }
            }
        }

        for child in node.children() {
            if model.node(*child)?.owner() != Some(id) {
                errors.push(VerifyError::ForeignChild {
                    owner: id,
                    child: *child,
                });
            }
        }

        for provider in [node.type_ref(), node.base()].into_iter().flatten() {
            if !model.node(provider)?.is_attached() {
                errors.push(VerifyError::DanglingReference { user: id, provider });
            }
        }
    }
    Ok(())
}

fn check_where_used(
    model: &CompilerModel,
    tracker: &TypeTracker,
    errors: &mut Vec<VerifyError>,
) -> Result<(), ModelError> {
    // Model to index
    for id in model.node_ids() {
        let node = model.node(id)?;
        if !node.is_attached() {
            continue;
        }
        for (slot, reference) in [(TypeSlot::Type, node.type_ref()), (TypeSlot::Base, node.base())] {
            let indexed = tracker.provider_of(id, slot);
            if indexed != reference {
                errors.push(VerifyError::IndexMismatch {
                    user: id,
                    slot,
                    model: reference,
                    indexed,
                });
            }
        }
    }

    // Index to model
    let mut providers: Vec<NodeId> = tracker.providers().collect();
    providers.sort();
    for provider in providers {
        for (user, slot) in tracker.users_of(provider) {
            let node = model.node(user)?;
            let reference = match slot {
                TypeSlot::Type => node.type_ref(),
                TypeSlot::Base => node.base(),
            };
            if reference != Some(provider) {
                errors.push(VerifyError::IndexMismatch {
                    user,
                    slot,
                    model: reference,
                    indexed: Some(provider),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FacetRole, Library, ModelBuilder, NodeKind};
    use crate::versioning::{Editability, StaticVersioning};

    fn graph() -> (FacadeGraph, NodeId, NodeId, NodeId) {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("T", "ns"));
        let string = b.xsd("string").unwrap();
        let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
        let code = b
            .property(profile, FacetRole::Summary, NodeKind::Attribute, "code")
            .unwrap();
        b.assign(code, string).unwrap();
        let graph = FacadeGraph::new(
            b.build(),
            Box::new(StaticVersioning::new(Editability::Editable)),
        )
        .unwrap();
        (graph, string, profile, code)
    }

    #[test]
    fn fresh_graph_verifies() {
        let (mut graph, string, profile, code) = graph();
        for node in [string, profile, code] {
            graph.facade_for(node).unwrap();
        }
        let result = verify_graph(&graph);
        assert!(result.ok, "{:?}", result.errors);
    }

    #[test]
    fn edits_keep_graph_consistent() {
        let (mut graph, string, profile, code) = graph();
        let code = graph.facade_for(code).unwrap();
        graph.unassign_type(code).unwrap();
        let profile = graph.facade_for(profile).unwrap();
        let string = graph.facade_for(string).unwrap();
        let created = graph
            .add_property(profile, crate::facade::PropertyKind::Attribute, None)
            .unwrap();
        graph.assign_type(created, string).unwrap();
        graph.delete(created).unwrap();

        let result = verify_graph(&graph);
        assert!(result.ok, "{:?}", result.errors);
    }

    #[test]
    fn stale_index_is_reported() {
        let (graph, string, _, code) = graph();
        let result = verify_parts(graph.model(), graph.registry(), &TypeTracker::new());
        assert!(!result.ok);
        assert!(result.errors.contains(&VerifyError::IndexMismatch {
            user: code,
            slot: TypeSlot::Type,
            model: Some(string),
            indexed: None,
        }));
    }

    #[test]
    fn dangling_reference_is_reported() {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("T", "ns"));
        let money = b.member(lib, NodeKind::CoreObject, "Money").unwrap();
        let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
        let cost = b
            .property(profile, FacetRole::Summary, NodeKind::Element, "cost")
            .unwrap();
        b.assign(cost, money).unwrap();
        let tracker = TypeTracker::seed(b.model_mut()).unwrap();
        b.model_mut().detach(money).unwrap();
        let model = b.build();

        let result = verify_parts(&model, &IdentityRegistry::new(), &tracker);
        assert!(result
            .errors
            .contains(&VerifyError::DanglingReference { user: cost, provider: money }));
    }
}
