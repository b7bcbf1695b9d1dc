//! facade::tracker
//!
//! Where-used index between type users and type providers.
//!
//! # Invariants
//!
//! - For every provider `P`, `where_used(P)` equals the set of owning members
//!   of users whose reference in the model currently points at `P`
//! - The model's type references and base types change only through
//!   [`TypeTracker::assign`] and [`TypeTracker::unassign`], which update the
//!   model and the index together
//!
//! Users are indexed per provider by `(user, slot)`, so a member with two
//! users of one provider stays in the where-used set until both are gone.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::types::NodeId;
use crate::model::{CompilerModel, ModelError};

/// Which reference of a user node is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeSlot {
    /// The assigned type of a property, parameter, request or simple type.
    Type,
    /// The base type a member extends.
    Base,
}

/// Reverse index from providers to the users referencing them.
#[derive(Debug, Default, Clone)]
pub struct TypeTracker {
    users: HashMap<NodeId, BTreeMap<(NodeId, TypeSlot), NodeId>>,
    assigned: HashMap<(NodeId, TypeSlot), NodeId>,
}

impl TypeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every reference already present on attached nodes.
    pub fn seed(model: &CompilerModel) -> Result<Self, ModelError> {
        let mut tracker = Self::new();
        for id in model.node_ids() {
            let node = model.node(id)?;
            if !node.is_attached() {
                continue;
            }
            let member = model.member_of(id)?;
            if let Some(provider) = node.type_ref() {
                tracker.index(id, TypeSlot::Type, provider, member);
            }
            if let Some(base) = node.base() {
                tracker.index(id, TypeSlot::Base, base, member);
            }
        }
        Ok(tracker)
    }

    /// Point `user`'s `slot` at `provider`, moving it off any previous
    /// provider. Returns the previous provider.
    ///
    /// Compatibility is the caller's concern; this only keeps the model and
    /// the index in step.
    pub fn assign(
        &mut self,
        model: &mut CompilerModel,
        user: NodeId,
        slot: TypeSlot,
        provider: NodeId,
    ) -> Result<Option<NodeId>, ModelError> {
        let member = model.member_of(user)?;
        model.node(provider)?;
        write_slot(model, user, slot, Some(provider))?;

        let previous = self.forget(user, slot);
        self.index(user, slot, provider, member);
        tracing::debug!(%user, ?slot, %provider, ?previous, "type assigned");
        Ok(previous)
    }

    /// Clear `user`'s `slot`. Returns the provider it pointed at.
    pub fn unassign(
        &mut self,
        model: &mut CompilerModel,
        user: NodeId,
        slot: TypeSlot,
    ) -> Result<Option<NodeId>, ModelError> {
        write_slot(model, user, slot, None)?;
        let previous = self.forget(user, slot);
        if previous.is_some() {
            tracing::debug!(%user, ?slot, ?previous, "type unassigned");
        }
        Ok(previous)
    }

    /// Provider currently assigned to `user`'s `slot`.
    pub fn provider_of(&self, user: NodeId, slot: TypeSlot) -> Option<NodeId> {
        self.assigned.get(&(user, slot)).copied()
    }

    /// Distinct owning members of the users of `provider`, in id order.
    pub fn where_used(&self, provider: NodeId) -> Vec<NodeId> {
        self.users
            .get(&provider)
            .map(|users| {
                users
                    .values()
                    .copied()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every `(user, slot)` referencing `provider`, in id order.
    pub fn users_of(&self, provider: NodeId) -> Vec<(NodeId, TypeSlot)> {
        self.users
            .get(&provider)
            .map(|users| users.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Providers with at least one user.
    pub fn providers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.users.keys().copied()
    }

    fn index(&mut self, user: NodeId, slot: TypeSlot, provider: NodeId, member: NodeId) {
        self.users
            .entry(provider)
            .or_default()
            .insert((user, slot), member);
        self.assigned.insert((user, slot), provider);
    }

    fn forget(&mut self, user: NodeId, slot: TypeSlot) -> Option<NodeId> {
        let previous = self.assigned.remove(&(user, slot))?;
        if let Some(users) = self.users.get_mut(&previous) {
            users.remove(&(user, slot));
            if users.is_empty() {
                self.users.remove(&previous);
            }
        }
        Some(previous)
    }
}

fn write_slot(
    model: &mut CompilerModel,
    user: NodeId,
    slot: TypeSlot,
    provider: Option<NodeId>,
) -> Result<(), ModelError> {
    match slot {
        TypeSlot::Type => model.set_type_ref(user, provider),
        TypeSlot::Base => model.set_base(user, provider),
    }
}
