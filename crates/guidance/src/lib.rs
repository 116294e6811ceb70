//! Guidance tour orchestration.
//!
//! [`GuidanceController`] owns the general and data tours, the status cache
//! and the signal inbox. Hosts drive it with navigation notifications and
//! the user-facing `next`/`skip`/`start` operations, and render whatever
//! [`presentation::OverlayFrame`] it reports.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod locator;
pub mod presentation;
pub mod retry;
pub mod status;
pub mod tour;

pub use backend::GuidanceBackend;
pub use config::GuidanceConfig;
pub use controller::{GuidanceController, NextOutcome, StartOutcome};
pub use locator::{Anchor, AnchorProbe, Bounds, ElementLocator};
