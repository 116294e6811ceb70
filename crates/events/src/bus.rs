//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`GuidanceBus`] is the publish/subscribe hub for [`GuidanceEvent`]s. It is
//! designed to be shared via `Arc<GuidanceBus>` between the guidance
//! controller and whatever presentation layer renders the tours.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use menuwise_core::guidance::TourKind;

// ---------------------------------------------------------------------------
// GuidanceEvent
// ---------------------------------------------------------------------------

/// Why a tour start ended without showing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    /// The catalog had no eligible popups for the page.
    NoPopups,
    /// Popups existed but none of their anchors mounted in time.
    NoAnchors,
    /// The user navigated away while the tour was being prepared.
    Superseded,
}

/// A state change in the guidance tours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuidanceEvent {
    /// A tour became active on `page` with `steps` renderable popups.
    TourStarted {
        kind: TourKind,
        page: String,
        steps: usize,
    },

    /// The active tour moved to another step.
    StepChanged {
        kind: TourKind,
        index: usize,
        key: String,
    },

    /// A tour finished, either on its last step or by skipping.
    TourCompleted { kind: TourKind, skipped: bool },

    /// The general tour finished; carries the data flag at that moment.
    GeneralTourCompleted { data_seen: bool },

    /// A tour start was dropped before anything was shown.
    TourAbandoned {
        kind: TourKind,
        page: String,
        reason: AbandonReason,
    },

    /// A tour step needs the host to navigate before it can continue.
    /// The step at `index` (anchored at `key`) is acknowledged once the host
    /// arrives at `path`.
    NavigationRequested {
        kind: TourKind,
        from_page: String,
        path: String,
        index: usize,
        key: String,
        is_last: bool,
    },
}

/// A [`GuidanceEvent`] stamped with its publication time.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedEvent {
    #[serde(flatten)]
    pub event: GuidanceEvent,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// GuidanceBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out bus for guidance events.
///
/// ```rust
/// use menuwise_events::bus::{GuidanceBus, GuidanceEvent};
/// use menuwise_core::guidance::TourKind;
///
/// let bus = GuidanceBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(GuidanceEvent::TourCompleted { kind: TourKind::General, skipped: true });
/// ```
pub struct GuidanceBus {
    sender: broadcast::Sender<PublishedEvent>,
}

impl GuidanceBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer is full.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: GuidanceEvent) {
        tracing::debug!(?event, "Guidance event");
        let _ = self.sender.send(PublishedEvent {
            event,
            timestamp: Utc::now(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }
}

impl Default for GuidanceBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
