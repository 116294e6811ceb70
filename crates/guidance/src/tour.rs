//! Per-tour state: the renderable popups and the current position.

use menuwise_core::guidance::{GuidancePopup, TourKind};

/// Result of advancing a tour by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the step at this index.
    Moved(usize),
    /// The last step was already showing; the tour is over.
    Finished,
    /// The tour was not active.
    Inactive,
}

/// State of one tour instance.
///
/// While active, `popups` is non-empty and `current_index` points into it.
#[derive(Debug, Clone)]
pub struct TourState {
    kind: TourKind,
    popups: Vec<GuidancePopup>,
    current_index: usize,
    /// Page the tour was started on.
    page: Option<String>,
}

impl TourState {
    pub fn new(kind: TourKind) -> Self {
        Self {
            kind,
            popups: Vec::new(),
            current_index: 0,
            page: None,
        }
    }

    pub fn kind(&self) -> TourKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        !self.popups.is_empty()
    }

    pub fn popups(&self) -> &[GuidancePopup] {
        &self.popups
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    pub fn current(&self) -> Option<&GuidancePopup> {
        self.popups.get(self.current_index)
    }

    pub fn is_last(&self) -> bool {
        self.is_active() && self.current_index + 1 == self.popups.len()
    }

    /// Activate with `popups` at index 0. An empty list leaves the tour idle.
    pub fn activate(&mut self, page: &str, popups: Vec<GuidancePopup>) -> bool {
        if popups.is_empty() {
            self.clear();
            return false;
        }
        self.popups = popups;
        self.current_index = 0;
        self.page = Some(page.to_string());
        true
    }

    /// Move one step forward. On the last step the tour is cleared.
    pub fn advance(&mut self) -> Advance {
        if !self.is_active() {
            return Advance::Inactive;
        }
        if self.is_last() {
            self.clear();
            return Advance::Finished;
        }
        self.current_index += 1;
        Advance::Moved(self.current_index)
    }

    pub fn clear(&mut self) {
        self.popups.clear();
        self.current_index = 0;
        self.page = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
