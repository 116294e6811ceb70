//! Domain types and pure logic for the Menuwise guidance and onboarding core.
//!
//! Nothing in this crate performs I/O. The HTTP client, the tour state
//! machine and the presentation contract build on these types.

pub mod error;
pub mod guidance;
pub mod onboarding;
pub mod pages;
pub mod routing;
pub mod types;
