//! The guidance tour state machine.
//!
//! [`GuidanceController`] owns both tours, the status cache and the signal
//! inbox. A tour moves `Idle -> Active -> Idle`:
//!
//! - `start` passes the status gate (unless forced), fetches the page's
//!   popups, waits for the page to settle and prunes the popups to mounted
//!   anchors. A non-empty result activates the tour at index 0.
//! - `next` advances, or completes on the last step. The general tour's
//!   `week_selector` step is acknowledged on the dashboard: `next` asks the
//!   host to navigate there and the deferred advance is applied on arrival.
//! - `skip` completes immediately.
//!
//! Every navigation cancels in-flight starts. Each start captures the
//! navigation epoch and only commits if it is still current, so a late
//! polling result never activates a tour on a page the user already left.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;

use menuwise_core::guidance::{
    GuidancePopup, GuidanceStatus, StatusPatch, TourKind, KEY_WEEK_SELECTOR,
};
use menuwise_core::pages::{resolve_page, DASHBOARD_PAGE, DASHBOARD_PATH};
use menuwise_events::{
    dispatch, AbandonReason, GuidanceBus, GuidanceEvent, Inbox, PublishedEvent, Signal, SignalKind,
};

use crate::backend::GuidanceBackend;
use crate::catalog::CatalogFetcher;
use crate::config::GuidanceConfig;
use crate::locator::{AnchorProbe, ElementLocator};
use crate::presentation::OverlayFrame;
use crate::retry::AwaitError;
use crate::status::StatusCache;
use crate::tour::TourState;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a tour start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    Started { steps: usize },
    AlreadyActive,
    /// The status gate refused the start.
    Gated,
    Abandoned { reason: AbandonReason },
}

/// Result of [`GuidanceController::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// No tour was active.
    Idle,
    /// Moved to the step at this index.
    Moved(usize),
    /// The last step was acknowledged and the tour completed.
    Completed(TourKind),
    /// The host must navigate to this path; the tour resumes there.
    Navigate(String),
}

/// What a navigation started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountReport {
    pub page: String,
    pub general: Option<StartOutcome>,
    pub data: Option<StartOutcome>,
    /// A continued tour that completed on arrival.
    pub completed: Option<TourKind>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

struct ControllerState {
    path: String,
    page: String,
    /// Bumped on every navigation.
    epoch: u64,
    /// Cancels polling started under the current epoch.
    cancel: CancellationToken,
    general: TourState,
    data: TourState,
    inbox: Inbox,
}

impl ControllerState {
    fn tour(&self, kind: TourKind) -> &TourState {
        match kind {
            TourKind::General => &self.general,
            TourKind::Data => &self.data,
        }
    }

    fn tour_mut(&mut self, kind: TourKind) -> &mut TourState {
        match kind {
            TourKind::General => &mut self.general,
            TourKind::Data => &mut self.data,
        }
    }

    /// The tour to present. The data tour wins if both are active.
    fn active_kind(&self) -> Option<TourKind> {
        if self.data.is_active() {
            Some(TourKind::Data)
        } else if self.general.is_active() {
            Some(TourKind::General)
        } else {
            None
        }
    }
}

/// Owns the guidance tours for one signed-in session.
///
/// Created once via [`GuidanceController::new`]; the returned `Arc` can be
/// cloned into UI callbacks and spawned tasks.
pub struct GuidanceController {
    config: GuidanceConfig,
    status: StatusCache,
    catalog: CatalogFetcher,
    locator: ElementLocator,
    bus: GuidanceBus,
    state: Mutex<ControllerState>,
}

impl GuidanceController {
    pub fn new(
        backend: Arc<dyn GuidanceBackend>,
        probe: Arc<dyn AnchorProbe>,
        config: GuidanceConfig,
    ) -> Arc<Self> {
        let status = StatusCache::new(backend.clone(), config.status_ttl);
        let catalog = CatalogFetcher::new(backend);
        let locator = ElementLocator::new(probe, config.locator);

        Arc::new(Self {
            config,
            status,
            catalog,
            locator,
            bus: GuidanceBus::default(),
            state: Mutex::new(ControllerState {
                path: "/".into(),
                page: resolve_page("/"),
                epoch: 0,
                cancel: CancellationToken::new(),
                general: TourState::new(TourKind::General),
                data: TourState::new(TourKind::Data),
                inbox: Inbox::new(),
            }),
        })
    }

    /// Subscribe to tour lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.bus.subscribe()
    }

    pub fn status_cache(&self) -> &StatusCache {
        &self.status
    }

    pub async fn status(&self) -> GuidanceStatus {
        self.status.current().await
    }

    pub async fn current_page(&self) -> String {
        self.state.lock().await.page.clone()
    }

    pub async fn current_path(&self) -> String {
        self.state.lock().await.path.clone()
    }

    /// Whether the tour of `kind` is active.
    pub async fn is_active(&self, kind: TourKind) -> bool {
        self.state.lock().await.tour(kind).is_active()
    }

    /// The tour the presentation layer should show, if any.
    pub async fn active_kind(&self) -> Option<TourKind> {
        self.state.lock().await.active_kind()
    }

    /// Current step index of the tour of `kind`, while active.
    pub async fn current_index(&self, kind: TourKind) -> Option<usize> {
        let state = self.state.lock().await;
        let tour = state.tour(kind);
        tour.is_active().then(|| tour.current_index())
    }

    /// Whether a signal of `kind` is waiting for the next mount.
    pub async fn has_pending(&self, kind: SignalKind) -> bool {
        self.state.lock().await.inbox.contains(kind)
    }

    /// Record that the host started impersonating another user.
    ///
    /// On the next navigation the cached status is dropped and both tours
    /// reset, so nothing read for the previous identity leaks into status
    /// writes for the impersonated one.
    pub async fn begin_impersonation(&self) {
        self.post_signal(Signal::ImpersonationStarted).await;
    }

    /// Queue `signal` for the next navigation, e.g. a continuation the host
    /// restored after a full page reload.
    pub async fn post_signal(&self, signal: Signal) {
        tracing::debug!(?signal, "Guidance signal posted by host");
        self.state.lock().await.inbox.post(signal);
    }

    /// Frame for the overlay and tooltip, from the presented tour.
    pub async fn overlay_frame(&self) -> Option<OverlayFrame> {
        let state = self.state.lock().await;
        let tour = state.tour(state.active_kind()?);
        let popup = tour.current()?;
        OverlayFrame::build(tour, self.locator.locate(&popup.key))
    }

    // ---- navigation ----

    /// Handle a settled navigation to `path`.
    ///
    /// Cancels in-flight starts, clears both tours, consumes pending signals,
    /// re-reads the status once and starts whichever tours apply. A pending
    /// continuation acknowledges the step that requested the navigation:
    /// the general tour completes if that step was its last, otherwise it
    /// resumes at the following step.
    pub async fn navigate(&self, path: &str) -> MountReport {
        let page = resolve_page(path);
        let (epoch, impersonating, continuing, mut start_data) = {
            let mut state = self.state.lock().await;
            state.cancel.cancel();
            state.cancel = CancellationToken::new();
            state.epoch += 1;
            state.path = path.to_string();
            state.page = page.clone();
            state.general.clear();
            state.data.clear();
            (
                state.epoch,
                state.inbox.take(SignalKind::ImpersonationStarted).is_some(),
                state.inbox.take(SignalKind::ContinueTour),
                state.inbox.take(SignalKind::StartDataTour).is_some(),
            )
        };
        tracing::debug!(path, page = %page, epoch, "Guidance navigation");

        if impersonating {
            tracing::info!("Impersonation started, resetting guidance state");
            self.status.invalidate().await;
        }
        self.status.read().await;

        let mut report = MountReport {
            page: page.clone(),
            general: None,
            data: None,
            completed: None,
        };

        match continuing {
            Some(Signal::ContinueTour {
                origin_page,
                is_last: true,
                ..
            }) => {
                tracing::info!(origin_page = %origin_page, page = %page, "Continued tour ends here");
                self.complete(TourKind::General, false).await;
                report.completed = Some(TourKind::General);
            }
            Some(Signal::ContinueTour {
                origin_page,
                index,
                key,
                ..
            }) => {
                let outcome = self.resume_general(&origin_page, index, &key).await;
                if let StartOutcome::Abandoned { reason } = outcome {
                    if reason != AbandonReason::Superseded {
                        tracing::info!(origin_page = %origin_page, page = %page, "Continued tour has nothing left to show, completing");
                        self.complete(TourKind::General, false).await;
                        report.completed = Some(TourKind::General);
                    }
                }
                report.general = Some(outcome);
            }
            _ if self.config.auto_start => {
                report.general = Some(self.start(TourKind::General, false).await);
            }
            _ => {}
        }

        if !self.is_current(epoch).await {
            return report;
        }

        start_data |= self.state.lock().await.inbox.take(SignalKind::StartDataTour).is_some();
        let general_started = matches!(report.general, Some(StartOutcome::Started { .. }));
        if !general_started && (start_data || self.config.auto_start) {
            report.data = Some(self.start(TourKind::Data, false).await);
        }

        report
    }

    // ---- tour operations ----

    /// Start the tour of `kind` on the current page.
    ///
    /// Without `force` the status gate applies: the general tour needs the
    /// general flag unset, the data tour needs it set and the data flag
    /// unset. `force` skips the gate and resets the tour's flag locally.
    pub async fn start(&self, kind: TourKind, force: bool) -> StartOutcome {
        let (epoch, page, cancel) = {
            let state = self.state.lock().await;
            if state.tour(kind).is_active() {
                return StartOutcome::AlreadyActive;
            }
            (state.epoch, state.page.clone(), state.cancel.clone())
        };

        if force {
            self.status.patch_local(StatusPatch::for_kind(kind, false)).await;
        } else {
            let status = self.status.current().await;
            if !status.allows_start(kind) {
                tracing::debug!(kind = kind.as_str(), ?status, "Guidance tour gated by status");
                return StartOutcome::Gated;
            }
        }

        let popups = self.catalog.fetch(kind, &page).await;
        self.present(kind, &page, popups, epoch, &cancel).await
    }

    /// Resume a general tour begun on `origin_page` after the acknowledged
    /// step, on the current page. The status gate does not apply.
    ///
    /// The step is found by `key` in the origin page's catalog; `index` is
    /// used only when the key is gone from it.
    async fn resume_general(&self, origin_page: &str, index: usize, key: &str) -> StartOutcome {
        let (epoch, page, cancel) = {
            let state = self.state.lock().await;
            (state.epoch, state.page.clone(), state.cancel.clone())
        };
        let mut popups = self.catalog.fetch_general(origin_page).await;
        let resume_at = popups
            .iter()
            .position(|p| p.key == key)
            .unwrap_or(index)
            + 1;
        let remaining = popups.split_off(resume_at.min(popups.len()));
        self.present(TourKind::General, &page, remaining, epoch, &cancel).await
    }

    /// Settle, prune `popups` to mounted anchors and activate the tour if
    /// the navigation epoch is still current.
    async fn present(
        &self,
        kind: TourKind,
        page: &str,
        popups: Vec<GuidancePopup>,
        epoch: u64,
        cancel: &CancellationToken,
    ) -> StartOutcome {
        if popups.is_empty() {
            return self.abandon(kind, page, AbandonReason::NoPopups);
        }

        tokio::select! {
            _ = cancel.cancelled() => return self.abandon(kind, page, AbandonReason::Superseded),
            _ = tokio::time::sleep(self.config.settle_delay) => {}
        }

        let pruned = match self.locator.prune(&popups, cancel).await {
            Ok(pruned) => pruned,
            Err(AwaitError::Cancelled) => {
                return self.abandon(kind, page, AbandonReason::Superseded)
            }
            Err(AwaitError::Exhausted { .. }) => {
                return self.abandon(kind, page, AbandonReason::NoAnchors)
            }
        };

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            drop(state);
            return self.abandon(kind, page, AbandonReason::Superseded);
        }

        let steps = pruned.len();
        if !state.tour_mut(kind).activate(page, pruned) {
            drop(state);
            return self.abandon(kind, page, AbandonReason::NoAnchors);
        }
        tracing::info!(kind = kind.as_str(), page, steps, "Guidance tour started");
        self.bus.publish(GuidanceEvent::TourStarted {
            kind,
            page: page.to_string(),
            steps,
        });
        StartOutcome::Started { steps }
    }

    /// Acknowledge the current step of the presented tour.
    pub async fn next(&self) -> NextOutcome {
        let kind = {
            let mut state = self.state.lock().await;
            let Some(kind) = state.active_kind() else {
                return NextOutcome::Idle;
            };

            let needs_dashboard = kind == TourKind::General
                && state.page != DASHBOARD_PAGE
                && state
                    .tour(kind)
                    .current()
                    .is_some_and(|p| p.key == KEY_WEEK_SELECTOR);

            if needs_dashboard {
                let tour = state.tour(kind);
                let event = GuidanceEvent::NavigationRequested {
                    kind,
                    from_page: state.page.clone(),
                    path: DASHBOARD_PATH.to_string(),
                    index: tour.current_index(),
                    key: KEY_WEEK_SELECTOR.to_string(),
                    is_last: tour.is_last(),
                };
                dispatch(&event, &mut state.inbox);
                self.bus.publish(event);
                return NextOutcome::Navigate(DASHBOARD_PATH.to_string());
            }

            let tour = state.tour_mut(kind);
            if !tour.is_last() {
                tour.advance();
                let index = tour.current_index();
                let key = tour.current().map(|p| p.key.clone()).unwrap_or_default();
                self.bus.publish(GuidanceEvent::StepChanged { kind, index, key });
                return NextOutcome::Moved(index);
            }
            kind
        };

        self.complete(kind, false).await;
        NextOutcome::Completed(kind)
    }

    /// Close the presented tour now and mark it seen.
    pub async fn skip(&self) -> Option<TourKind> {
        let kind = self.active_kind().await?;
        self.complete(kind, true).await;
        Some(kind)
    }

    /// Close the tour of `kind` and persist its flag.
    ///
    /// The tour closes locally even if the status write fails. Completing the
    /// general tour while the data tour is unseen queues the data tour for
    /// the next mount.
    pub async fn complete(&self, kind: TourKind, skipped: bool) {
        self.state.lock().await.tour_mut(kind).clear();

        let data_seen = match self.status.write(StatusPatch::for_kind(kind, true)).await {
            Ok(status) => status.has_seen_user_guidance_data,
            Err(_) => {
                let local = self.status.patch_local(StatusPatch::for_kind(kind, true)).await;
                local.has_seen_user_guidance_data
            }
        };

        tracing::info!(kind = kind.as_str(), skipped, "Guidance tour completed");
        self.bus.publish(GuidanceEvent::TourCompleted { kind, skipped });

        if kind == TourKind::General {
            let event = GuidanceEvent::GeneralTourCompleted { data_seen };
            dispatch(&event, &mut self.state.lock().await.inbox);
            self.bus.publish(event);
        }
    }

    // ---- private helpers ----

    async fn is_current(&self, epoch: u64) -> bool {
        self.state.lock().await.epoch == epoch
    }

    fn abandon(&self, kind: TourKind, page: &str, reason: AbandonReason) -> StartOutcome {
        tracing::debug!(kind = kind.as_str(), page, ?reason, "Guidance tour not started");
        self.bus.publish(GuidanceEvent::TourAbandoned {
            kind,
            page: page.to_string(),
            reason,
        });
        StartOutcome::Abandoned { reason }
    }
}
