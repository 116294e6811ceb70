//! Guidance popup and status types plus catalog filtering.
//!
//! A guidance tour is an ordered list of [`GuidancePopup`]s scoped to one
//! page. Two tours exist side by side: the general tour over sidebar and
//! summary anchors, and the data tour over live performance widgets. Which
//! popups belong to which tour is decided here by fixed anchor allow-lists.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::PopupId;

// ---------------------------------------------------------------------------
// Anchor keys
// ---------------------------------------------------------------------------

/// Budget summary table. Always the first step of a general tour.
pub const KEY_SUMMARY_TABLE: &str = "summary_table";
/// Week selector. Always the last step of a general tour, and the step
/// that continues the tour on the dashboard screen.
pub const KEY_WEEK_SELECTOR: &str = "week_selector";

/// Anchors eligible for the general tour.
pub const ALLOWED_GENERAL_KEYS: &[&str] = &[
    KEY_SUMMARY_TABLE,
    "sidebar_dashboard",
    "sidebar_budget",
    "sidebar_report_card",
    "sidebar_onboarding",
    "sidebar_settings",
    "budget_overview",
    KEY_WEEK_SELECTOR,
];

/// Anchors eligible for the data tour (daily and weekly performance widgets).
pub const ALLOWED_DATA_KEYS: &[&str] = &[
    "daily_sales",
    "daily_labour_cost",
    "daily_food_cost",
    "daily_performance",
    "weekly_sales",
    "weekly_labour_cost",
    "weekly_food_cost",
    "weekly_performance",
];

// ---------------------------------------------------------------------------
// Popup
// ---------------------------------------------------------------------------

/// One step of a guidance tour, as served by the popup catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidancePopup {
    pub id: PopupId,
    /// Page key this popup belongs to, e.g. `"budget"`.
    pub page: String,
    /// Value of the anchor attribute on the target element.
    pub key: String,
    /// Missing or `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for creating or replacing a popup through the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupDraft {
    pub page: String,
    pub key: String,
    pub title: String,
    pub text: String,
    pub is_active: bool,
}

/// Validate a popup draft before it is sent to the catalog.
///
/// Page, key and title must be non-blank. The text may be empty.
pub fn validate_popup_draft(draft: &PopupDraft) -> Result<(), CoreError> {
    for (label, value) in [
        ("page", &draft.page),
        ("key", &draft.key),
        ("title", &draft.title),
    ] {
        if value.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Popup {label} must be a non-empty string"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Per-user record of which tours have been completed or skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceStatus {
    #[serde(default)]
    pub has_seen_user_guidance: bool,
    #[serde(default)]
    pub has_seen_user_guidance_data: bool,
}

impl GuidanceStatus {
    pub fn new(general: bool, data: bool) -> Self {
        Self {
            has_seen_user_guidance: general,
            has_seen_user_guidance_data: data,
        }
    }

    /// Whether the flag for `kind` is set.
    pub fn seen(&self, kind: TourKind) -> bool {
        match kind {
            TourKind::General => self.has_seen_user_guidance,
            TourKind::Data => self.has_seen_user_guidance_data,
        }
    }

    /// Apply a partial update, keeping every flag the patch leaves unset.
    pub fn merged(self, patch: StatusPatch) -> Self {
        Self {
            has_seen_user_guidance: patch.general.unwrap_or(self.has_seen_user_guidance),
            has_seen_user_guidance_data: patch.data.unwrap_or(self.has_seen_user_guidance_data),
        }
    }

    /// Whether a non-forced start of `kind` passes the status gate.
    ///
    /// The data tour requires the general tour to have been seen first.
    pub fn allows_start(&self, kind: TourKind) -> bool {
        match kind {
            TourKind::General => !self.has_seen_user_guidance,
            TourKind::Data => self.has_seen_user_guidance && !self.has_seen_user_guidance_data,
        }
    }
}

/// Partial status update. `None` leaves the corresponding flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub general: Option<bool>,
    pub data: Option<bool>,
}

impl StatusPatch {
    /// Patch that sets only the flag belonging to `kind`.
    pub fn for_kind(kind: TourKind, seen: bool) -> Self {
        match kind {
            TourKind::General => Self {
                general: Some(seen),
                data: None,
            },
            TourKind::Data => Self {
                general: None,
                data: Some(seen),
            },
        }
    }

    /// Combine with a later patch. Flags set by `later` win.
    pub fn then(self, later: StatusPatch) -> Self {
        Self {
            general: later.general.or(self.general),
            data: later.data.or(self.data),
        }
    }

    /// This patch without the flags `other` sets.
    pub fn without(self, other: StatusPatch) -> Self {
        Self {
            general: self.general.filter(|_| other.general.is_none()),
            data: self.data.filter(|_| other.data.is_none()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_none() && self.data.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tour kinds and catalog selection
// ---------------------------------------------------------------------------

/// The two parallel tours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourKind {
    General,
    Data,
}

impl TourKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Data => "data",
        }
    }

    /// Anchor allow-list for this tour.
    pub fn allowed_keys(self) -> &'static [&'static str] {
        match self {
            Self::General => ALLOWED_GENERAL_KEYS,
            Self::Data => ALLOWED_DATA_KEYS,
        }
    }
}

/// Select the general tour for `page` out of the full catalog.
///
/// Keeps active popups on `page` whose key is in [`ALLOWED_GENERAL_KEYS`],
/// then orders them: `summary_table` first, `week_selector` last, the rest
/// by ascending id.
pub fn select_general(catalog: &[GuidancePopup], page: &str) -> Vec<GuidancePopup> {
    let mut popups = select(catalog, page, TourKind::General);
    popups.sort_by_key(|p| (general_rank(&p.key), p.id));
    popups
}

/// Select the data tour for `page`, ordered by ascending id.
pub fn select_data(catalog: &[GuidancePopup], page: &str) -> Vec<GuidancePopup> {
    let mut popups = select(catalog, page, TourKind::Data);
    popups.sort_by_key(|p| p.id);
    popups
}

/// Select the tour of the given kind for `page`.
pub fn select_tour(catalog: &[GuidancePopup], page: &str, kind: TourKind) -> Vec<GuidancePopup> {
    match kind {
        TourKind::General => select_general(catalog, page),
        TourKind::Data => select_data(catalog, page),
    }
}

fn select(catalog: &[GuidancePopup], page: &str, kind: TourKind) -> Vec<GuidancePopup> {
    let allowed = kind.allowed_keys();
    catalog
        .iter()
        .filter(|p| p.is_active && p.page == page && allowed.contains(&p.key.as_str()))
        .cloned()
        .collect()
}

fn general_rank(key: &str) -> u8 {
    match key {
        KEY_SUMMARY_TABLE => 0,
        KEY_WEEK_SELECTOR => 2,
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
