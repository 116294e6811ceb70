//! Route constants and the path-to-page resolver.

use crate::types::PageName;

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Bare onboarding landing path.
pub const ONBOARDING_PATH: &str = "/onboarding";
/// Onboarding score screen.
pub const SCORE_PATH: &str = "/onboarding/score";
/// Onboarding profitability screen.
pub const PROFITABILITY_PATH: &str = "/onboarding/profitability";
/// Onboarding congratulations screen.
pub const CONGRATULATIONS_PATH: &str = "/onboarding/congratulations";
/// Dashboard home.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Budget screen.
pub const BUDGET_PATH: &str = "/dashboard/budget";
/// Report card screen.
pub const REPORT_CARD_PATH: &str = "/dashboard/report-card";

/// Page name of the dashboard screen.
pub const DASHBOARD_PAGE: &str = "dashboard";

/// Known routes (without surrounding slashes) and their canonical page names.
const PAGE_TABLE: &[(&str, &str)] = &[
    ("", DASHBOARD_PAGE),
    ("dashboard", DASHBOARD_PAGE),
    ("dashboard/budget", "budget"),
    ("dashboard/report-card", "report_card"),
    ("dashboard/settings", "settings"),
    ("dashboard/subscription", "subscription"),
    ("onboarding", "onboarding"),
    ("onboarding/basic-information", "onboarding_basic_information"),
    ("onboarding/labour-information", "onboarding_labour_information"),
    ("onboarding/food-cost-details", "onboarding_food_cost_details"),
    ("onboarding/fixed-costs", "onboarding_fixed_costs"),
    ("onboarding/variable-costs", "onboarding_variable_costs"),
    ("onboarding/one-month-sales", "onboarding_one_month_sales"),
    ("onboarding/suppliers", "onboarding_suppliers"),
    ("onboarding/sales-information", "onboarding_sales_information"),
    ("onboarding/expenses", "onboarding_expenses"),
    ("onboarding/score", "score"),
    ("onboarding/profitability", "profitability"),
    ("onboarding/congratulations", "congratulations"),
];

/// Map a navigation path to the canonical page name used by the catalog.
///
/// Leading and trailing slashes are ignored. Unmapped paths fall back to the
/// trimmed path with every `/` replaced by `_`.
pub fn resolve_page(path: &str) -> PageName {
    let trimmed = path.trim_matches('/');
    PAGE_TABLE
        .iter()
        .find(|(route, _)| *route == trimmed)
        .map(|(_, page)| (*page).to_string())
        .unwrap_or_else(|| trimmed.replace('/', "_"))
}

/// Normalise a path for comparison: a single leading slash, no trailing one.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
