//! engine::validation
//!
//! Seam for the external validation service.
//!
//! The session never decides validity itself: after each successful action
//! it hands the owning member to a [`Validator`] and records the returned
//! [`ValidationState`].

use serde::{Deserialize, Serialize};

use crate::core::types::{FacadeId, NodeId};
use crate::facade::{classify, FacadeGraph, FacadeKind};

/// One validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub node: NodeId,
    pub message: String,
}

/// Recorded validation outcome of a member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "findings", rename_all = "snake_case")]
pub enum ValidationState {
    #[default]
    Unknown,
    Valid,
    Invalid(Vec<Finding>),
}

impl ValidationState {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationState::Valid)
    }

    pub fn findings(&self) -> &[Finding] {
        match self {
            ValidationState::Invalid(findings) => findings,
            _ => &[],
        }
    }

    /// `Valid` when there are no findings.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        if findings.is_empty() {
            ValidationState::Valid
        } else {
            ValidationState::Invalid(findings)
        }
    }
}

/// Validates a member after it was changed.
pub trait Validator {
    fn validate(&mut self, graph: &FacadeGraph, member: FacadeId) -> ValidationState;
}

impl<F> Validator for F
where
    F: FnMut(&FacadeGraph, FacadeId) -> ValidationState,
{
    fn validate(&mut self, graph: &FacadeGraph, member: FacadeId) -> ValidationState {
        self(graph, member)
    }
}

/// Flags properties that take a type but have none assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct UntypedPropertyValidator;

impl Validator for UntypedPropertyValidator {
    fn validate(&mut self, graph: &FacadeGraph, member: FacadeId) -> ValidationState {
        let Ok(root) = graph.node_of(member) else {
            return ValidationState::Unknown;
        };
        let Ok(subtree) = graph.model().subtree(root) else {
            return ValidationState::Unknown;
        };

        let findings = subtree
            .into_iter()
            .filter_map(|id| graph.model().node(id).ok().map(|n| (id, n)))
            .filter(|(_, node)| node.type_ref().is_none())
            .filter(|(_, node)| {
                matches!(
                    classify(node.kind()).and_then(FacadeKind::assignable),
                    Some(providers) if !providers.is_empty()
                )
            })
            .filter(|(_, node)| node.kind().is_property())
            .map(|(id, node)| Finding {
                node: id,
                message: format!("'{}' has no assigned type", node.name()),
            })
            .collect();
        ValidationState::from_findings(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FacetRole, Library, ModelBuilder, NodeKind};
    use crate::versioning::{Editability, StaticVersioning};

    #[test]
    fn untyped_properties_are_findings() {
        let mut b = ModelBuilder::new();
        let lib = b.library(Library::draft("T", "ns"));
        let string = b.xsd("string").unwrap();
        let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
        let code = b
            .property(profile, FacetRole::Summary, NodeKind::Attribute, "code")
            .unwrap();
        b.property(profile, FacetRole::Summary, NodeKind::Indicator, "activeInd")
            .unwrap();
        let mut graph = FacadeGraph::new(
            b.build(),
            Box::new(StaticVersioning::new(Editability::Editable)),
        )
        .unwrap();
        let profile = graph.facade_for(profile).unwrap();

        let state = UntypedPropertyValidator.validate(&graph, profile);
        assert_eq!(state.findings().len(), 1);
        assert_eq!(state.findings()[0].node, code);

        let code = graph.facade_for(code).unwrap();
        let string = graph.facade_for(string).unwrap();
        graph.assign_type(code, string).unwrap();
        assert!(UntypedPropertyValidator.validate(&graph, profile).is_valid());
    }

    #[test]
    fn closures_are_validators() {
        let graph = FacadeGraph::new(
            crate::model::CompilerModel::new(),
            Box::new(StaticVersioning::new(Editability::Editable)),
        )
        .unwrap();
        let mut always_valid = |_: &FacadeGraph, _: FacadeId| ValidationState::Valid;
        assert!(always_valid
            .validate(&graph, FacadeId::from_index(0))
            .is_valid());
    }
}
