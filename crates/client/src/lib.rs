//! REST client for the Menuwise backend.
//!
//! Wraps the guidance status, guidance popup catalog and restaurant
//! onboarding endpoints using [`reqwest`].

pub mod api;
pub mod config;

pub use api::{ApiError, MenuwiseApi};
pub use config::ClientConfig;
