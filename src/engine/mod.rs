//! engine
//!
//! Action framework: descriptors, versioning-aware managers, handlers and
//! the editing session.
//!
//! # Architecture
//!
//! Every edit follows the same lifecycle:
//!
//! ```text
//! Check policy → Check preconditions → Apply → Publish → Revalidate
//! ```
//!
//! - [`action`] - Action ids, descriptors, parameters, error taxonomy
//! - [`manager`] - `Full`, `ReadOnly` and `MinorVersionOnly` policies
//! - [`handlers`] - Dispatch table of per-action preconditions and effects
//! - [`session`] - `DexSession`, the `is_enabled`/`run` surface
//! - [`validation`] - Validation seam and recorded outcomes
//!
//! # Invariants
//!
//! - `is_enabled` never fails and consults exactly the checks `run` enforces
//! - A refused `run` mutates nothing and publishes nothing
//! - A successful `run` publishes exactly one change event naming the subject

pub mod action;
pub(crate) mod handlers;
pub mod manager;
pub mod session;
pub mod validation;

pub use action::{
    parse_property_kind, ActionDescriptor, ActionError, ActionId, ActionOutcome, ActionParam,
    ErrorKind, ParamKind, ParseError,
};
pub use manager::ActionManager;
pub use session::{DexSession, SessionSettings};
pub use validation::{Finding, UntypedPropertyValidator, ValidationState, Validator};
