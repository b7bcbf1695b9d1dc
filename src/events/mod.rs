//! events
//!
//! Change propagation and navigation between independent views.
//!
//! # Modules
//!
//! - [`event`] - `DexEvent` records and their kinds
//! - [`bus`] - Synchronous pub/sub with view-group locks
//! - [`history`] - Bounded back/forward navigation history
//!
//! Everything here runs on the caller's thread; there is no queued delivery.

pub mod bus;
pub mod event;
pub mod history;

pub use bus::{EventBus, Handler, SubscriptionId};
pub use event::{DexEvent, EventDetail, EventKind};
pub use history::{NavigationHistory, DEFAULT_HISTORY_LIMIT};
