//! core
//!
//! Core types, naming rules, configuration and verification for dexedit.
//!
//! # Modules
//!
//! - [`types`] - Strong types: NodeId, FacadeId, ViewGroupId, VersionNumber, etc.
//! - [`naming`] - Name derivation rules for properties and facets
//! - [`config`] - Configuration schema and loading
//! - [`verify`] - Consistency verification of a facade graph
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - All verification is deterministic

pub mod config;
pub mod naming;
pub mod types;
pub mod verify;
