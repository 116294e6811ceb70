//! Locating guidance anchors in the rendered page.
//!
//! Popups point at elements carrying the [`ANCHOR_ATTRIBUTE`] attribute.
//! Those elements may mount late (inside modals or lazily rendered panels),
//! so lookups are retried with [`await_until`]. The page itself is reached
//! through the [`AnchorProbe`] trait, which the host implements over its
//! real document.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use menuwise_core::guidance::GuidancePopup;

use crate::retry::{await_until, AwaitError, RetryPolicy};

/// Attribute whose value is a popup `key`.
pub const ANCHOR_ATTRIBUTE: &str = "data-guidance-key";

/// Single-attribute selector matching the anchor for `key`.
pub fn anchor_selector(key: &str) -> String {
    format!("[{ANCHOR_ATTRIBUTE}=\"{key}\"]")
}

/// Viewport-relative rectangle of a rendered element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// A mounted anchor element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub key: String,
    pub bounds: Bounds,
}

/// Read-only view of the rendered page.
pub trait AnchorProbe: Send + Sync {
    /// The element matching [`anchor_selector`]`(key)`, if mounted.
    fn locate(&self, key: &str) -> Option<Anchor>;
}

pub struct ElementLocator {
    probe: Arc<dyn AnchorProbe>,
    policy: RetryPolicy,
}

impl ElementLocator {
    pub fn new(probe: Arc<dyn AnchorProbe>, policy: RetryPolicy) -> Self {
        Self { probe, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Look up `key` once, without waiting.
    pub fn locate(&self, key: &str) -> Option<Anchor> {
        self.probe.locate(key)
    }

    /// Poll for the anchor of `key` until it mounts or retries run out.
    pub async fn wait_for(&self, key: &str, cancel: &CancellationToken) -> Option<Anchor> {
        match await_until(|| self.probe.locate(key), &self.policy, cancel).await {
            Ok(anchor) => Some(anchor),
            Err(AwaitError::Exhausted { attempts }) => {
                tracing::warn!(key, attempts, "Guidance anchor never mounted");
                None
            }
            Err(AwaitError::Cancelled) => None,
        }
    }

    /// Keep only the popups whose anchor is mounted right now.
    pub fn filter_existing(&self, popups: &[GuidancePopup]) -> Vec<GuidancePopup> {
        popups
            .iter()
            .filter(|p| self.probe.locate(&p.key).is_some())
            .cloned()
            .collect()
    }

    /// Wait until at least one popup's anchor is mounted and return the
    /// renderable subset.
    pub async fn prune(
        &self,
        popups: &[GuidancePopup],
        cancel: &CancellationToken,
    ) -> Result<Vec<GuidancePopup>, AwaitError> {
        if popups.is_empty() {
            return Ok(Vec::new());
        }
        let result = await_until(
            || {
                let existing = self.filter_existing(popups);
                (!existing.is_empty()).then_some(existing)
            },
            &self.policy,
            cancel,
        )
        .await;

        if let Err(AwaitError::Exhausted { attempts }) = result {
            let keys: Vec<&str> = popups.iter().map(|p| p.key.as_str()).collect();
            tracing::warn!(?keys, attempts, "No guidance anchors mounted for tour");
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
