//! dexedit - Editing substrate for schema model editors
//!
//! dexedit sits between a schema compiler's in-memory model and the views of
//! an editor. It wraps every model node in exactly one facade, keeps a
//! where-used index of type assignments, decides which edits the versioning
//! rules allow, and publishes one event for every change.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface for the `dex` binary
//! - [`engine`] - Action catalogue, ActionManager policies and `DexSession`
//! - [`events`] - Event bus with view-group locks and navigation history
//! - [`facade`] - Identity registry, facade graph and where-used tracker
//! - [`versioning`] - Library editability and the versioning policy
//! - [`model`] - In-process compiler model, builder and JSON snapshots
//! - [`core`] - Strong types, naming rules, configuration and verification
//!
//! # Correctness Invariants
//!
//! dexedit maintains the following invariants:
//!
//! 1. A model node is wrapped by at most one facade for the life of a graph
//! 2. Where-used sets always match the model's current type references
//! 3. A refused action changes nothing and publishes nothing
//! 4. A successful action publishes exactly one action change event naming its
//!    subject, optionally followed by a validation event

pub mod cli;
pub mod core;
pub mod engine;
pub mod events;
pub mod facade;
pub mod model;
pub mod versioning;
