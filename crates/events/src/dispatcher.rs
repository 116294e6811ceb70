//! Turns tour lifecycle events into signals for the next mount.

use crate::bus::GuidanceEvent;
use crate::inbox::{Inbox, Signal};

/// Signals implied by `event`.
///
/// - General tour completed while the data tour is unseen: start the data
///   tour after the next mount.
/// - A step requested navigation: the next mount continues that tour.
pub fn signals_for(event: &GuidanceEvent) -> Vec<Signal> {
    match event {
        GuidanceEvent::GeneralTourCompleted { data_seen: false } => vec![Signal::StartDataTour],
        GuidanceEvent::NavigationRequested {
            from_page,
            index,
            key,
            is_last,
            ..
        } => vec![Signal::ContinueTour {
            origin_page: from_page.clone(),
            index: *index,
            key: key.clone(),
            is_last: *is_last,
        }],
        _ => Vec::new(),
    }
}

/// Post every signal implied by `event` into `inbox`. Returns how many.
pub fn dispatch(event: &GuidanceEvent, inbox: &mut Inbox) -> usize {
    let signals = signals_for(event);
    let count = signals.len();
    for signal in signals {
        tracing::debug!(?signal, "Queued guidance signal");
        inbox.post(signal);
    }
    count
}
