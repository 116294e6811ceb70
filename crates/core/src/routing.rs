//! Onboarding redirect rules.
//!
//! Screen containers call [`decide_redirect`] after fetching restaurant data
//! and navigate to the returned path, if any. The rules are evaluated in a
//! fixed precedence order and the first matching rule decides.

use serde::Serialize;
use serde_json::Value;

use crate::onboarding::{
    extract_restaurant, record_flag, FIELD_ONBOARDING_COMPLETE, FIELD_ONE_MONTH_SALES,
    FIELD_SALES_INFORMATION,
};
use crate::pages::{
    normalize_path, CONGRATULATIONS_PATH, ONBOARDING_PATH, PROFITABILITY_PATH, REPORT_CARD_PATH,
    SCORE_PATH,
};

/// Inputs to the redirect decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RedirectFlags {
    pub has_restaurant: bool,
    pub has_one_month_sales_info: bool,
    pub has_sales_data: bool,
    /// Carried for callers; no rule depends on it.
    pub onboarding_completed: bool,
}

impl RedirectFlags {
    /// Derive the flags from a `/restaurants-onboarding` payload.
    pub fn from_payload(payload: Option<&Value>) -> Self {
        let Some(record) = payload.and_then(extract_restaurant) else {
            return Self::default();
        };
        Self {
            has_restaurant: true,
            has_one_month_sales_info: record_flag(record, FIELD_ONE_MONTH_SALES),
            has_sales_data: record_flag(record, FIELD_SALES_INFORMATION),
            onboarding_completed: record_flag(record, FIELD_ONBOARDING_COMPLETE),
        }
    }
}

/// The rule that decided a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectRule {
    HasSalesData,
    HasOneMonthSales,
    RestaurantWithoutSales,
    NoRestaurant,
}

impl RedirectRule {
    /// Select the single rule that applies to `flags`.
    pub fn for_flags(flags: &RedirectFlags) -> Self {
        if flags.has_sales_data {
            Self::HasSalesData
        } else if flags.has_one_month_sales_info {
            Self::HasOneMonthSales
        } else if flags.has_restaurant {
            Self::RestaurantWithoutSales
        } else {
            Self::NoRestaurant
        }
    }

    /// Redirect target under this rule for `path`, or `None` to stay.
    pub fn target(self, path: &str) -> Option<&'static str> {
        let path = normalize_path(path);
        let path = path.as_str();
        match self {
            Self::HasSalesData => (path == ONBOARDING_PATH).then_some(REPORT_CARD_PATH),
            Self::HasOneMonthSales => {
                matches!(path, ONBOARDING_PATH | SCORE_PATH | PROFITABILITY_PATH)
                    .then_some(REPORT_CARD_PATH)
            }
            Self::RestaurantWithoutSales => {
                (!matches!(path, SCORE_PATH | PROFITABILITY_PATH | CONGRATULATIONS_PATH))
                    .then_some(SCORE_PATH)
            }
            Self::NoRestaurant => {
                (!path.starts_with(ONBOARDING_PATH)).then_some(ONBOARDING_PATH)
            }
        }
    }
}

/// Decide whether `current_path` must redirect, and where.
pub fn decide_redirect(flags: &RedirectFlags, current_path: &str) -> Option<&'static str> {
    RedirectRule::for_flags(flags).target(current_path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
