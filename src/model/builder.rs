//! model::builder
//!
//! Fluent construction of compiler models for fixtures and loaders.
//!
//! The builder is the only place outside the facade graph that may set type
//! references and base types directly: it runs before any session exists, and
//! the facade graph indexes those references when it takes the model over.

use crate::core::types::{LibraryId, NodeId, VersionNumber};

use super::{CompilerModel, FacetRole, Library, LibraryStatus, ModelError, NodeKind};

/// Namespace of the built-in XML Schema library.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Builder for a [`CompilerModel`].
///
/// # Example
///
/// ```
/// use dexedit::model::{FacetRole, Library, ModelBuilder, NodeKind};
///
/// let mut b = ModelBuilder::new();
/// let lib = b.library(Library::draft("Travel", "http://example.com/travel"));
/// let string = b.xsd("string").unwrap();
/// let profile = b.member(lib, NodeKind::BusinessObject, "Profile").unwrap();
/// let code = b.property(profile, FacetRole::Summary, NodeKind::Attribute, "code").unwrap();
/// b.assign(code, string).unwrap();
///
/// let model = b.build();
/// assert_eq!(model.node(code).unwrap().type_ref(), Some(string));
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: CompilerModel,
    builtins: Option<LibraryId>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library.
    pub fn library(&mut self, library: Library) -> LibraryId {
        self.model.add_library(library)
    }

    /// Add a library at a specific version.
    pub fn library_version(
        &mut self,
        name: &str,
        namespace: &str,
        version: VersionNumber,
    ) -> LibraryId {
        self.model
            .add_library(Library::draft(name, namespace).with_version(version))
    }

    /// Built-in simple type, creating the XML Schema library on first use.
    pub fn xsd(&mut self, name: &str) -> Result<NodeId, ModelError> {
        let lib = match self.builtins {
            Some(lib) => lib,
            None => {
                let mut library =
                    Library::draft("XMLSchema", XSD_NAMESPACE).with_status(LibraryStatus::Final);
                library.builtin = true;
                let lib = self.model.add_library(library);
                self.builtins = Some(lib);
                lib
            }
        };
        if let Some(existing) = self.model.find_member(lib, name) {
            return Ok(existing);
        }
        self.model.add_member(lib, NodeKind::XsdSimple, name)
    }

    /// Add a top-level member.
    pub fn member(
        &mut self,
        library: LibraryId,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeId, ModelError> {
        self.model.add_member(library, kind, name)
    }

    /// Add a property to a standard facet of an object.
    pub fn property(
        &mut self,
        member: NodeId,
        role: FacetRole,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeId, ModelError> {
        let facet = self
            .model
            .facet(member, role)
            .ok_or_else(|| ModelError::Snapshot(format!("{member} has no {role:?} facet")))?;
        self.model.add_child(facet, kind, name)
    }

    /// Add a child directly under any node.
    pub fn child(
        &mut self,
        owner: NodeId,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodeId, ModelError> {
        self.model.add_child(owner, kind, name)
    }

    /// Assign a type to a user.
    pub fn assign(&mut self, user: NodeId, provider: NodeId) -> Result<&mut Self, ModelError> {
        self.model.node(provider)?;
        self.model.set_type_ref(user, Some(provider))?;
        Ok(self)
    }

    /// Make `member` extend `base`.
    pub fn extend(&mut self, member: NodeId, base: NodeId) -> Result<&mut Self, ModelError> {
        self.model.node(base)?;
        self.model.set_base(member, Some(base))?;
        Ok(self)
    }

    /// Contribute a contextual facet into `target`.
    pub fn contribute(&mut self, facet: NodeId, target: NodeId) -> Result<&mut Self, ModelError> {
        self.model.node(target)?;
        self.model.set_contributes_to(facet, Some(target))?;
        Ok(self)
    }

    /// Mutable access to the model under construction.
    pub fn model_mut(&mut self) -> &mut CompilerModel {
        &mut self.model
    }

    /// Finish building.
    pub fn build(self) -> CompilerModel {
        self.model
    }
}
