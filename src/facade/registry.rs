//! facade::registry
//!
//! Node-to-facade identity map.
//!
//! The registry is owned by one [`super::FacadeGraph`] and lives exactly as
//! long as the model it indexes. Each compiler-model node maps to at most one
//! [`FacadeId`]; associations are permanent for the registry's lifetime.

use std::collections::HashMap;

use crate::core::types::{FacadeId, NodeId};

use super::kind::FacadeKind;
use super::FacadeError;

/// A registered facade: the node it wraps and its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacadeRecord {
    pub id: FacadeId,
    pub node: NodeId,
    pub kind: FacadeKind,
}

/// Identity map from compiler-model nodes to facades.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    by_node: HashMap<NodeId, FacadeId>,
    records: Vec<FacadeRecord>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing facade for `node`, if any.
    pub fn get(&self, node: NodeId) -> Option<FacadeId> {
        self.by_node.get(&node).copied()
    }

    /// Record of a registered facade.
    pub fn record(&self, id: FacadeId) -> Option<&FacadeRecord> {
        self.records.get(id.index())
    }

    /// Existing facade for `node`, or register the one `factory` describes.
    ///
    /// `factory` runs only when `node` has no facade yet. A factory error
    /// leaves the registry untouched.
    pub fn get_or_create<F>(&mut self, node: NodeId, factory: F) -> Result<FacadeId, FacadeError>
    where
        F: FnOnce() -> Result<FacadeKind, FacadeError>,
    {
        if let Some(existing) = self.get(node) {
            return Ok(existing);
        }
        let kind = factory()?;
        Ok(self.insert(node, kind))
    }

    /// Register a facade for a node that must not have one yet.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::IdentityConflict`] carrying the existing facade
    /// if `node` is already wrapped.
    pub fn try_register(&mut self, node: NodeId, kind: FacadeKind) -> Result<FacadeId, FacadeError> {
        match self.get(node) {
            Some(existing) => Err(FacadeError::IdentityConflict { node, existing }),
            None => Ok(self.insert(node, kind)),
        }
    }

    /// Register a facade, recovering from a double registration by returning
    /// the facade that already wraps `node`.
    pub fn register(&mut self, node: NodeId, kind: FacadeKind) -> FacadeId {
        if let Some(existing) = self.get(node) {
            tracing::warn!(%node, %existing, "node already wrapped; reusing existing facade");
            return existing;
        }
        self.insert(node, kind)
    }

    /// Number of registered facades.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FacadeRecord> {
        self.records.iter()
    }

    fn insert(&mut self, node: NodeId, kind: FacadeKind) -> FacadeId {
        let id = FacadeId::from_index(self.records.len());
        self.records.push(FacadeRecord { id, node, kind });
        self.by_node.insert(node, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::kind::{MemberKind, PropertyKind};

    const ATTR: FacadeKind = FacadeKind::Property(PropertyKind::Attribute);

    #[test]
    fn get_or_create_is_idempotent() {
        let mut registry = IdentityRegistry::new();
        let node = NodeId::from_index(7);
        let first = registry.get_or_create(node, || Ok(ATTR)).unwrap();
        let second = registry
            .get_or_create(node, || panic!("factory must not run twice"))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(node), Some(first));
    }

    #[test]
    fn factory_error_registers_nothing() {
        let mut registry = IdentityRegistry::new();
        let node = NodeId::from_index(1);
        let result = registry.get_or_create(node, || Err(FacadeError::Unsupported(node)));
        assert!(result.is_err());
        assert!(registry.is_empty());
        assert_eq!(registry.get(node), None);
    }

    #[test]
    fn double_registration_is_rejected() {
        let mut registry = IdentityRegistry::new();
        let node = NodeId::from_index(3);
        let id = registry.try_register(node, ATTR).unwrap();

        let err = registry
            .try_register(node, FacadeKind::Member(MemberKind::CoreObject))
            .unwrap_err();
        assert!(matches!(err, FacadeError::IdentityConflict { existing, .. } if existing == id));

        assert_eq!(registry.register(node, ATTR), id);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.record(id).unwrap().kind, ATTR);
    }
}
