//! What the overlay and tooltip render for the presented tour step.
//!
//! The presentation layer never mutates tours; it renders an
//! [`OverlayFrame`] and calls back into the controller's `next`/`skip`.

use serde::Serialize;

use menuwise_core::guidance::{GuidancePopup, TourKind};

use crate::locator::{Anchor, Bounds};
use crate::tour::TourState;

/// Space kept between the anchor and the tooltip card, in CSS pixels.
pub const TOOLTIP_GAP: f64 = 12.0;
/// Minimum distance between the tooltip card and the viewport edge.
pub const VIEWPORT_MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// One rendered step: the highlighted anchor plus the tooltip content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    pub kind: TourKind,
    pub popup: GuidancePopup,
    /// `None` when the anchor unmounted after the tour started; the overlay
    /// then shows the card without a highlight.
    pub anchor: Option<Anchor>,
    /// 1-based.
    pub step: usize,
    pub total: usize,
    pub is_last: bool,
}

impl OverlayFrame {
    pub fn build(tour: &TourState, anchor: Option<Anchor>) -> Option<Self> {
        let popup = tour.current()?.clone();
        Some(Self {
            kind: tour.kind(),
            popup,
            anchor,
            step: tour.current_index() + 1,
            total: tour.popups().len(),
            is_last: tour.is_last(),
        })
    }

    /// "Step n of m" label shown in the tooltip footer.
    pub fn progress_label(&self) -> String {
        format!("{} of {}", self.step, self.total)
    }

    /// Label of the primary button.
    pub fn primary_action(&self) -> &'static str {
        if self.is_last {
            "Finish"
        } else {
            "Next"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipSide {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TooltipPlacement {
    pub x: f64,
    pub y: f64,
    pub side: TooltipSide,
}

/// Position a tooltip of `tooltip` size next to `anchor` inside `viewport`.
///
/// Prefers below the anchor, flips above when there is no room below but
/// there is above, and centres horizontally on the anchor, clamped to the
/// viewport margins.
pub fn place_tooltip(anchor: &Bounds, tooltip: Size, viewport: Size) -> TooltipPlacement {
    let below_y = anchor.bottom() + TOOLTIP_GAP;
    let above_y = anchor.y - TOOLTIP_GAP - tooltip.height;
    let fits_below = below_y + tooltip.height <= viewport.height - VIEWPORT_MARGIN;
    let fits_above = above_y >= VIEWPORT_MARGIN;

    let (y, side) = if !fits_below && fits_above {
        (above_y, TooltipSide::Above)
    } else {
        (below_y, TooltipSide::Below)
    };

    let max_x = (viewport.width - VIEWPORT_MARGIN - tooltip.width).max(VIEWPORT_MARGIN);
    let x = (anchor.center_x() - tooltip.width / 2.0).clamp(VIEWPORT_MARGIN, max_x);

    TooltipPlacement { x, y, side }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
