//! Consume-once signals that carry tour intent across a navigation.
//!
//! A signal is posted before the host navigates and taken by the first
//! mount that cares about it. At most one signal of each kind is pending;
//! posting again replaces the earlier one.

use std::collections::VecDeque;

/// A message for the next mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The navigation in progress continues a general tour begun on
    /// `origin_page`. The step at `index` (anchored at `key`) is
    /// acknowledged on arrival: the tour completes if it was the last one,
    /// otherwise it resumes at the following step.
    ContinueTour {
        origin_page: String,
        index: usize,
        key: String,
        is_last: bool,
    },
    /// The general tour just finished; start the data tour on arrival.
    StartDataTour,
    /// The host started impersonating another user.
    ImpersonationStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    ContinueTour,
    StartDataTour,
    ImpersonationStarted,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::ContinueTour { .. } => SignalKind::ContinueTour,
            Self::StartDataTour => SignalKind::StartDataTour,
            Self::ImpersonationStarted => SignalKind::ImpersonationStarted,
        }
    }
}

#[derive(Debug, Default)]
pub struct Inbox {
    pending: VecDeque<Signal>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a signal, replacing any pending signal of the same kind.
    pub fn post(&mut self, signal: Signal) {
        let kind = signal.kind();
        self.pending.retain(|s| s.kind() != kind);
        self.pending.push_back(signal);
    }

    /// Remove and return the pending signal of `kind`.
    pub fn take(&mut self, kind: SignalKind) -> Option<Signal> {
        let index = self.pending.iter().position(|s| s.kind() == kind)?;
        self.pending.remove(index)
    }

    pub fn contains(&self, kind: SignalKind) -> bool {
        self.pending.iter().any(|s| s.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
