//! End-to-end tour flows against an in-memory backend and page.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use assert_matches::assert_matches;

use menuwise_core::guidance::{GuidanceStatus, TourKind};
use menuwise_events::{AbandonReason, GuidanceEvent, Signal, SignalKind};
use menuwise_guidance::{GuidanceConfig, NextOutcome, StartOutcome};

use common::{controller, manual_config, popup, FakeBackend, FakePage};

// ---------------------------------------------------------------------------
// Start and complete
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn single_step_general_tour_completes_and_queues_data_tour() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, manual_config());

    ctrl.navigate("/dashboard/budget").await;
    assert_eq!(
        ctrl.start(TourKind::General, false).await,
        StartOutcome::Started { steps: 1 }
    );
    assert!(ctrl.is_active(TourKind::General).await);
    assert_eq!(ctrl.current_index(TourKind::General).await, Some(0));

    assert_eq!(ctrl.next().await, NextOutcome::Completed(TourKind::General));
    assert_eq!(backend.status(), GuidanceStatus::new(true, false));
    assert!(!ctrl.is_active(TourKind::General).await);
    assert!(ctrl.has_pending(SignalKind::StartDataTour).await);
}

#[tokio::test(start_paused = true)]
async fn skip_marks_tour_seen_from_any_step() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![
            popup(1, "budget", "summary_table"),
            popup(2, "budget", "sidebar_budget"),
            popup(3, "budget", "budget_overview"),
        ],
    );
    let page = FakePage::with(&["summary_table", "sidebar_budget", "budget_overview"]);
    let ctrl = controller(&backend, &page, manual_config());

    ctrl.navigate("/dashboard/budget").await;
    ctrl.start(TourKind::General, false).await;
    assert_eq!(ctrl.next().await, NextOutcome::Moved(1));
    assert_eq!(ctrl.skip().await, Some(TourKind::General));

    assert!(!ctrl.is_active(TourKind::General).await);
    assert!(backend.status().has_seen_user_guidance);
    assert_eq!(ctrl.skip().await, None);
    assert_eq!(ctrl.next().await, NextOutcome::Idle);
}

#[tokio::test(start_paused = true)]
async fn missing_anchors_are_pruned_from_the_tour() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![
            popup(1, "budget", "summary_table"),
            popup(2, "budget", "sidebar_budget"),
        ],
    );
    let page = FakePage::with(&["sidebar_budget"]);
    let ctrl = controller(&backend, &page, manual_config());

    ctrl.navigate("/dashboard/budget").await;
    assert_eq!(
        ctrl.start(TourKind::General, false).await,
        StartOutcome::Started { steps: 1 }
    );
    let frame = ctrl.overlay_frame().await.expect("a frame is presented");
    assert_eq!(frame.popup.key, "sidebar_budget");
    assert_eq!(frame.progress_label(), "1 of 1");
}

#[tokio::test(start_paused = true)]
async fn tour_with_no_mounted_anchors_is_abandoned_after_polling() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&[]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard/budget").await;

    let started = tokio::time::Instant::now();
    assert_eq!(
        ctrl.start(TourKind::General, false).await,
        StartOutcome::Abandoned {
            reason: AbandonReason::NoAnchors
        }
    );
    assert_eq!(started.elapsed(), Duration::from_millis(6000));
    assert!(!ctrl.is_active(TourKind::General).await);
    assert_eq!(backend.status(), GuidanceStatus::default());
}

#[tokio::test(start_paused = true)]
async fn late_anchor_is_picked_up_while_polling() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&[]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard/budget").await;

    let mounter = page.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2200)).await;
        mounter.mount("summary_table");
    });

    assert_eq!(
        ctrl.start(TourKind::General, false).await,
        StartOutcome::Started { steps: 1 }
    );
}

// ---------------------------------------------------------------------------
// Gating
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn data_tour_never_starts_before_general_is_seen() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "dashboard", "daily_sales"), popup(2, "dashboard", "weekly_sales")],
    );
    let page = FakePage::with(&["daily_sales", "weekly_sales"]);
    let ctrl = controller(&backend, &page, GuidanceConfig::default());

    let report = ctrl.navigate("/dashboard").await;
    assert_eq!(
        report.general,
        Some(StartOutcome::Abandoned {
            reason: AbandonReason::NoPopups
        })
    );
    assert_eq!(report.data, Some(StartOutcome::Gated));
    assert_eq!(ctrl.start(TourKind::Data, false).await, StartOutcome::Gated);
    assert!(!ctrl.is_active(TourKind::Data).await);
}

#[tokio::test(start_paused = true)]
async fn seen_general_tour_is_gated() {
    let backend = FakeBackend::new(
        GuidanceStatus::new(true, false),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard/budget").await;

    assert_eq!(ctrl.start(TourKind::General, false).await, StartOutcome::Gated);
}

#[tokio::test(start_paused = true)]
async fn forced_start_bypasses_gate_and_resets_flag_locally() {
    let backend = FakeBackend::new(
        GuidanceStatus::new(true, true),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard/budget").await;

    assert_eq!(
        ctrl.start(TourKind::General, true).await,
        StartOutcome::Started { steps: 1 }
    );
    assert_eq!(ctrl.status().await, GuidanceStatus::new(false, true));
    assert_eq!(
        ctrl.status_cache().cached().await,
        Some(GuidanceStatus::new(true, true))
    );
    assert_eq!(backend.status(), GuidanceStatus::new(true, true));
}

#[tokio::test(start_paused = true)]
async fn forced_resets_never_reach_server_when_status_read_fails() {
    let backend = FakeBackend::new(
        GuidanceStatus::new(true, true),
        vec![
            popup(1, "dashboard", "sidebar_dashboard"),
            popup(2, "dashboard", "daily_sales"),
        ],
    );
    let page = FakePage::with(&["sidebar_dashboard", "daily_sales"]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard").await;

    ctrl.start(TourKind::General, true).await;
    ctrl.start(TourKind::Data, true).await;
    backend.status_reads_offline.store(true, Ordering::SeqCst);

    assert_eq!(ctrl.skip().await, Some(TourKind::Data));
    assert_eq!(backend.status(), GuidanceStatus::new(true, true));

    assert_eq!(ctrl.skip().await, Some(TourKind::General));
    assert_eq!(backend.status(), GuidanceStatus::new(true, true));
    assert_eq!(backend.status_writes.load(Ordering::SeqCst), 2);
    assert!(!ctrl.has_pending(SignalKind::StartDataTour).await);
}

#[tokio::test(start_paused = true)]
async fn data_tour_takes_presentation_priority() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![
            popup(1, "dashboard", "sidebar_dashboard"),
            popup(2, "dashboard", "daily_sales"),
        ],
    );
    let page = FakePage::with(&["sidebar_dashboard", "daily_sales"]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard").await;

    ctrl.start(TourKind::General, false).await;
    ctrl.start(TourKind::Data, true).await;

    assert_eq!(ctrl.active_kind().await, Some(TourKind::Data));
    let frame = ctrl.overlay_frame().await.expect("a frame is presented");
    assert_eq!(frame.kind, TourKind::Data);
    assert_eq!(frame.popup.key, "daily_sales");
    assert_eq!(ctrl.start(TourKind::Data, true).await, StartOutcome::AlreadyActive);
}

// ---------------------------------------------------------------------------
// Cross-page continuation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn week_selector_completes_general_tour_on_dashboard_then_data_tour_follows() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![
            popup(2, "budget", "week_selector"),
            popup(1, "budget", "summary_table"),
            popup(3, "dashboard", "sidebar_dashboard"),
            popup(4, "dashboard", "daily_sales"),
        ],
    );
    let page = FakePage::with(&["summary_table", "week_selector", "sidebar_dashboard", "daily_sales"]);
    let ctrl = controller(&backend, &page, GuidanceConfig::default());

    let report = ctrl.navigate("/dashboard/budget").await;
    assert_eq!(report.general, Some(StartOutcome::Started { steps: 2 }));

    assert_eq!(ctrl.next().await, NextOutcome::Moved(1));
    assert_eq!(ctrl.next().await, NextOutcome::Navigate("/dashboard".into()));
    assert!(ctrl.has_pending(SignalKind::ContinueTour).await);
    assert_eq!(backend.status(), GuidanceStatus::default());

    let report = ctrl.navigate("/dashboard").await;
    assert_eq!(report.completed, Some(TourKind::General));
    assert_eq!(report.general, None);
    assert_eq!(backend.status(), GuidanceStatus::new(true, false));
    assert!(!ctrl.has_pending(SignalKind::ContinueTour).await);
    assert!(!ctrl.is_active(TourKind::General).await);

    assert_eq!(report.data, Some(StartOutcome::Started { steps: 1 }));
    assert_eq!(ctrl.active_kind().await, Some(TourKind::Data));
    assert_eq!(ctrl.next().await, NextOutcome::Completed(TourKind::Data));
    assert_eq!(backend.status(), GuidanceStatus::new(true, true));
}

#[tokio::test(start_paused = true)]
async fn week_selector_completion_queues_data_tour_even_without_data_popups() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "week_selector")],
    );
    let page = FakePage::with(&["week_selector"]);
    let ctrl = controller(&backend, &page, manual_config());

    ctrl.navigate("/dashboard/budget").await;
    ctrl.start(TourKind::General, false).await;
    assert_eq!(ctrl.next().await, NextOutcome::Navigate("/dashboard".into()));

    let report = ctrl.navigate("/dashboard").await;
    assert_eq!(report.completed, Some(TourKind::General));
    assert!(backend.status().has_seen_user_guidance);
    assert_matches!(
        report.data,
        Some(StartOutcome::Abandoned {
            reason: AbandonReason::NoPopups
        })
    );
    assert!(!ctrl.has_pending(SignalKind::StartDataTour).await);
}

#[tokio::test(start_paused = true)]
async fn restored_continuation_resumes_after_acknowledged_step() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![
            popup(1, "budget", "summary_table"),
            popup(2, "budget", "sidebar_budget"),
            popup(3, "budget", "budget_overview"),
        ],
    );
    let page = FakePage::with(&["summary_table", "sidebar_budget", "budget_overview"]);
    let ctrl = controller(&backend, &page, manual_config());

    ctrl.post_signal(Signal::ContinueTour {
        origin_page: "budget".into(),
        index: 0,
        key: "summary_table".into(),
        is_last: false,
    })
    .await;
    let report = ctrl.navigate("/dashboard").await;

    assert_eq!(report.general, Some(StartOutcome::Started { steps: 2 }));
    assert_eq!(report.completed, None);
    let frame = ctrl.overlay_frame().await.expect("a frame is presented");
    assert_eq!(frame.popup.key, "sidebar_budget");
    assert_eq!(backend.status(), GuidanceStatus::default());
}

// ---------------------------------------------------------------------------
// Navigation races
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn navigation_supersedes_pending_start() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&[]);
    let ctrl = controller(&backend, &page, GuidanceConfig::default());

    let first = {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.navigate("/dashboard/budget").await })
    };
    tokio::time::sleep(Duration::from_millis(2000)).await;
    ctrl.navigate("/dashboard/settings").await;
    page.mount("summary_table");

    let report = first.await.unwrap();
    assert_eq!(
        report.general,
        Some(StartOutcome::Abandoned {
            reason: AbandonReason::Superseded
        })
    );
    assert_eq!(report.data, None);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!ctrl.is_active(TourKind::General).await);
    assert_eq!(ctrl.current_page().await, "settings");
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn catalog_failure_means_no_tour() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    backend.catalog_offline.store(true, Ordering::SeqCst);
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, GuidanceConfig::default());

    let report = ctrl.navigate("/dashboard/budget").await;
    assert_eq!(
        report.general,
        Some(StartOutcome::Abandoned {
            reason: AbandonReason::NoPopups
        })
    );
    assert_eq!(ctrl.active_kind().await, None);
}

#[tokio::test(start_paused = true)]
async fn status_read_failure_fails_open() {
    let backend = FakeBackend::new(
        GuidanceStatus::new(true, true),
        vec![popup(1, "budget", "summary_table")],
    );
    backend.status_offline.store(true, Ordering::SeqCst);
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, GuidanceConfig::default());

    let report = ctrl.navigate("/dashboard/budget").await;
    assert_eq!(report.general, Some(StartOutcome::Started { steps: 1 }));
}

#[tokio::test(start_paused = true)]
async fn status_write_failure_still_closes_tour() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, manual_config());
    ctrl.navigate("/dashboard/budget").await;
    ctrl.start(TourKind::General, false).await;

    backend.status_offline.store(true, Ordering::SeqCst);
    assert_eq!(ctrl.next().await, NextOutcome::Completed(TourKind::General));
    assert!(!ctrl.is_active(TourKind::General).await);
    assert_eq!(backend.status_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn impersonation_drops_cached_status() {
    let backend = FakeBackend::new(GuidanceStatus::new(true, true), Vec::new());
    let page = FakePage::with(&[]);
    let ctrl = controller(&backend, &page, manual_config());

    ctrl.navigate("/dashboard").await;
    assert!(ctrl.status_cache().cached().await.is_some());

    ctrl.begin_impersonation().await;
    backend.status_offline.store(true, Ordering::SeqCst);
    ctrl.navigate("/dashboard").await;

    assert!(ctrl.status_cache().cached().await.is_none());
    assert!(!ctrl.has_pending(SignalKind::ImpersonationStarted).await);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn subscribers_follow_tour_lifecycle() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, manual_config());
    let mut rx = ctrl.subscribe();

    ctrl.navigate("/dashboard/budget").await;
    ctrl.start(TourKind::General, false).await;
    ctrl.next().await;

    let mut events = Vec::new();
    while let Ok(published) = rx.try_recv() {
        events.push(published.event);
    }
    assert_eq!(
        events,
        vec![
            GuidanceEvent::TourStarted {
                kind: TourKind::General,
                page: "budget".into(),
                steps: 1,
            },
            GuidanceEvent::TourCompleted {
                kind: TourKind::General,
                skipped: false,
            },
            GuidanceEvent::GeneralTourCompleted { data_seen: false },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn mount_report_serializes_tagged_outcomes() {
    let backend = FakeBackend::new(
        GuidanceStatus::default(),
        vec![popup(1, "budget", "summary_table")],
    );
    let page = FakePage::with(&["summary_table"]);
    let ctrl = controller(&backend, &page, GuidanceConfig::default());

    let report = ctrl.navigate("/dashboard/budget").await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["page"], "budget");
    assert_eq!(json["general"]["outcome"], "started");
    assert_eq!(json["general"]["steps"], 1);
    assert!(json["data"].is_null());
}
