//! model::snapshot
//!
//! JSON snapshot format for compiler models.
//!
//! # Format
//!
//! ```json
//! {
//!   "libraries": [{
//!     "name": "Travel",
//!     "namespace": "http://example.com/travel",
//!     "version": "1.0.0",
//!     "members": [
//!       { "kind": "business_object", "name": "Profile",
//!         "facets": { "summary": [
//!           { "kind": "attribute", "name": "code", "type": "xsd:string" } ] } }
//!     ]
//!   }]
//! }
//! ```
//!
//! # Keys
//!
//! Every node gets a stable string key used for references and by the CLI:
//! members use their `key` (default: name), properties `Member.name`, facets
//! `Member#role`, aliases `Member@alias`, resource actions `Member/action`.
//! References of the form `xsd:<name>` resolve to built-in simple types.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::{LibraryId, NodeId, VersionNumber};

use super::builder::ModelBuilder;
use super::{CompilerModel, FacetRole, Library, LibraryStatus, ModelError, NodeKind};

fn default_version() -> VersionNumber {
    VersionNumber::new(1, 0, 0)
}

/// A serialized model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSnapshot {
    #[serde(default)]
    pub libraries: Vec<LibrarySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibrarySnapshot {
    pub name: String,
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: VersionNumber,
    #[serde(default)]
    pub status: LibraryStatus,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub locked_by: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSnapshot {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub type_ref: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub contributes_to: Option<String>,
    /// Properties per standard facet role (`id`, `summary`, `detail`, `shared`).
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<PropertySnapshot>>,
    /// Properties owned directly (value-with-attributes, contextual facets).
    #[serde(default)]
    pub properties: Vec<PropertySnapshot>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub actions: Vec<ActionSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySnapshot {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_ref: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSnapshot {
    pub name: String,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

/// A model loaded from a snapshot, with its key table.
#[derive(Debug)]
pub struct LoadedModel {
    pub model: CompilerModel,
    keys: BTreeMap<String, NodeId>,
}

impl LoadedModel {
    /// Resolve a snapshot key.
    pub fn node(&self, key: &str) -> Result<NodeId, ModelError> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| ModelError::DanglingReference {
                key: key.to_string(),
            })
    }

    /// Reverse lookup of a node's key.
    pub fn key_of(&self, node: NodeId) -> Option<&str> {
        self.keys
            .iter()
            .find(|(_, id)| **id == node)
            .map(|(key, _)| key.as_str())
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

enum Reference {
    Type,
    Base,
    Contribution,
}

struct Loader {
    builder: ModelBuilder,
    keys: BTreeMap<String, NodeId>,
    pending: Vec<(NodeId, Reference, String)>,
}

impl Loader {
    fn key(&mut self, key: String, node: NodeId) -> Result<(), ModelError> {
        if self.keys.insert(key.clone(), node).is_some() {
            return Err(ModelError::DuplicateKey(key));
        }
        Ok(())
    }

    fn properties(
        &mut self,
        owner: NodeId,
        member_key: &str,
        properties: &[PropertySnapshot],
    ) -> Result<(), ModelError> {
        for prop in properties {
            if !prop.kind.is_property() {
                return Err(ModelError::Snapshot(format!(
                    "'{}' in '{member_key}' is not a property kind",
                    prop.name
                )));
            }
            let node = self.builder.child(owner, prop.kind, &prop.name)?;
            let model = self.builder.model_mut();
            model.set_mandatory(node, prop.mandatory)?;
            model.documentation_mut(node)?.description = prop.description.clone();
            if let Some(type_key) = &prop.type_ref {
                self.pending.push((node, Reference::Type, type_key.clone()));
            }
            self.key(format!("{member_key}.{}", prop.name), node)?;
        }
        Ok(())
    }

    fn member(
        &mut self,
        library: LibraryId,
        snapshot: &MemberSnapshot,
    ) -> Result<(), ModelError> {
        let key = snapshot.key.clone().unwrap_or_else(|| snapshot.name.clone());
        let member = self.builder.member(library, snapshot.kind, &snapshot.name)?;
        self.builder.model_mut().documentation_mut(member)?.description =
            snapshot.description.clone();
        self.key(key.clone(), member)?;

        for role in snapshot.kind.standard_facets() {
            if let Some(facet) = self.builder.model_mut().facet(member, *role) {
                self.key(format!("{key}#{}", role_key(*role)), facet)?;
            }
        }

        for (role_name, properties) in &snapshot.facets {
            let role = parse_role(role_name)?;
            let facet = self.builder.model_mut().facet(member, role).ok_or_else(|| {
                ModelError::Snapshot(format!("'{key}' has no {role_name} facet"))
            })?;
            self.properties(facet, &key, properties)?;
        }
        self.properties(member, &key, &snapshot.properties)?;

        for value in &snapshot.values {
            let node = self.builder.child(member, NodeKind::EnumValue, value)?;
            self.key(format!("{key}.{value}"), node)?;
        }
        for alias in &snapshot.aliases {
            let node = self.builder.child(member, NodeKind::Alias, alias)?;
            self.key(format!("{key}@{alias}"), node)?;
        }
        for action in &snapshot.actions {
            let node = self
                .builder
                .child(member, NodeKind::ResourceAction, &action.name)?;
            let action_key = format!("{key}/{}", action.name);
            self.key(action_key.clone(), node)?;
            for (kind, payload, suffix) in [
                (NodeKind::ActionRequest, &action.request, "request"),
                (NodeKind::ActionResponse, &action.response, "response"),
            ] {
                let child = self.builder.child(node, kind, suffix)?;
                self.key(format!("{action_key}#{suffix}"), child)?;
                if let Some(payload) = payload {
                    self.pending.push((child, Reference::Type, payload.clone()));
                }
            }
        }

        if let Some(type_key) = &snapshot.type_ref {
            self.pending.push((member, Reference::Type, type_key.clone()));
        }
        if let Some(base) = &snapshot.base {
            self.pending.push((member, Reference::Base, base.clone()));
        }
        if let Some(target) = &snapshot.contributes_to {
            self.pending
                .push((member, Reference::Contribution, target.clone()));
        }
        Ok(())
    }

    fn resolve(&mut self, key: &str) -> Result<NodeId, ModelError> {
        if let Some(id) = self.keys.get(key) {
            return Ok(*id);
        }
        if let Some(name) = key.strip_prefix("xsd:") {
            let id = self.builder.xsd(name)?;
            self.keys.insert(key.to_string(), id);
            return Ok(id);
        }
        Err(ModelError::DanglingReference {
            key: key.to_string(),
        })
    }

    fn finish(mut self) -> Result<LoadedModel, ModelError> {
        let pending = std::mem::take(&mut self.pending);
        for (node, reference, key) in pending {
            let target = self.resolve(&key)?;
            match reference {
                Reference::Type => {
                    self.builder.assign(node, target)?;
                }
                Reference::Base => {
                    self.builder.extend(node, target)?;
                }
                Reference::Contribution => {
                    self.builder.contribute(node, target)?;
                }
            }
        }
        Ok(LoadedModel {
            model: self.builder.build(),
            keys: self.keys,
        })
    }
}

fn role_key(role: FacetRole) -> &'static str {
    match role {
        FacetRole::Id => "id",
        FacetRole::Summary => "summary",
        FacetRole::Detail => "detail",
        FacetRole::Shared => "shared",
    }
}

fn parse_role(name: &str) -> Result<FacetRole, ModelError> {
    match name {
        "id" => Ok(FacetRole::Id),
        "summary" => Ok(FacetRole::Summary),
        "detail" => Ok(FacetRole::Detail),
        "shared" => Ok(FacetRole::Shared),
        other => Err(ModelError::Snapshot(format!("unknown facet role '{other}'"))),
    }
}

impl ModelSnapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a snapshot file.
    pub fn read(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the compiler model described by this snapshot.
    ///
    /// # Errors
    ///
    /// Fails on duplicate keys, unknown facet roles, non-member kinds at the
    /// top level, and references that resolve to nothing.
    pub fn into_model(self) -> Result<LoadedModel, ModelError> {
        let mut loader = Loader {
            builder: ModelBuilder::new(),
            keys: BTreeMap::new(),
            pending: Vec::new(),
        };

        for lib in &self.libraries {
            let mut library = Library::draft(&lib.name, &lib.namespace)
                .with_version(lib.version)
                .with_status(lib.status);
            library.managed = lib.managed;
            library.locked_by = lib.locked_by.clone();
            let id = loader.builder.library(library);
            for member in &lib.members {
                loader.member(id, member)?;
            }
        }

        loader.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "libraries": [{
        "name": "Travel",
        "namespace": "http://example.com/travel",
        "members": [
          { "kind": "business_object", "name": "Profile",
            "facets": { "summary": [
              { "kind": "attribute", "name": "code", "type": "xsd:string", "mandatory": true },
              { "kind": "element_ref", "name": "AddressRef", "type": "Address" }
            ] },
            "aliases": ["Traveler"] },
          { "kind": "core_object", "name": "Address" },
          { "kind": { "contextual_facet": "custom" }, "name": "Profile_Web",
            "contributes_to": "Profile",
            "properties": [ { "kind": "indicator", "name": "activeInd" } ] }
        ]
      }]
    }"#;

    #[test]
    fn loads_members_and_references() {
        let loaded = ModelSnapshot::from_json(SAMPLE).unwrap().into_model().unwrap();
        let model = &loaded.model;

        let profile = loaded.node("Profile").unwrap();
        let address = loaded.node("Address").unwrap();
        let code = loaded.node("Profile.code").unwrap();
        let reference = loaded.node("Profile.AddressRef").unwrap();
        let string = loaded.node("xsd:string").unwrap();

        assert_eq!(model.node(code).unwrap().type_ref(), Some(string));
        assert!(model.node(code).unwrap().is_mandatory());
        assert_eq!(model.node(reference).unwrap().type_ref(), Some(address));
        assert_eq!(model.contributions(profile), vec![loaded.node("Profile_Web").unwrap()]);
        assert_eq!(loaded.key_of(profile), Some("Profile"));
        assert!(loaded.node("Profile@Traveler").is_ok());
        assert!(loaded.node("Profile#summary").is_ok());
    }

    #[test]
    fn dangling_reference_fails() {
        let text = r#"{ "libraries": [{ "name": "T", "namespace": "ns", "members": [
            { "kind": "business_object", "name": "A", "base": "Missing" } ] }] }"#;
        let err = ModelSnapshot::from_json(text).unwrap().into_model().unwrap_err();
        assert!(matches!(err, ModelError::DanglingReference { key } if key == "Missing"));
    }

    #[test]
    fn duplicate_member_keys_fail() {
        let text = r#"{ "libraries": [{ "name": "T", "namespace": "ns", "members": [
            { "kind": "core_object", "name": "A" },
            { "kind": "core_object", "name": "A" } ] }] }"#;
        let err = ModelSnapshot::from_json(text).unwrap().into_model().unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = r#"{ "libraries": [], "extra": 1 }"#;
        assert!(ModelSnapshot::from_json(text).is_err());
    }

    #[test]
    fn non_property_kind_in_facet_is_rejected() {
        let text = r#"{ "libraries": [{ "name": "T", "namespace": "ns", "members": [
            { "kind": "core_object", "name": "A",
              "facets": { "summary": [ { "kind": "alias", "name": "x" } ] } } ] }] }"#;
        let err = ModelSnapshot::from_json(text).unwrap().into_model().unwrap_err();
        assert!(matches!(err, ModelError::Snapshot(_)));
    }
}
