//! Guidance event bus and inter-navigation signalling.
//!
//! - [`GuidanceBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, used by UI layers to follow tour state.
//! - [`GuidanceEvent`] -- the tour lifecycle events.
//! - [`Inbox`] -- consume-once [`Signal`]s that survive a navigation.
//! - [`dispatcher`] -- maps lifecycle events to the signals they imply.

pub mod bus;
pub mod dispatcher;
pub mod inbox;

pub use bus::{AbandonReason, GuidanceBus, GuidanceEvent, PublishedEvent};
pub use dispatcher::dispatch;
pub use inbox::{Inbox, Signal, SignalKind};
