//! Onboarding checklist derived from a restaurant record.
//!
//! The backend stores one boolean per onboarding section, keyed by the
//! section's display name (e.g. `"Basic Information"`). The checklist is a
//! fixed ordered template of ten steps; the last one is a navigational
//! "go to budget" step that never counts toward completion.

use serde::Serialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Static definition of one checklist step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingStepDef {
    pub label: &'static str,
    /// Boolean field on the restaurant record backing this step.
    pub field: &'static str,
    pub route: &'static str,
}

/// Record field for the basic information section.
pub const FIELD_BASIC_INFORMATION: &str = "Basic Information";
/// Record field for the labour information section.
pub const FIELD_LABOUR_INFORMATION: &str = "Labour Information";
/// Record field for the one month sales section.
pub const FIELD_ONE_MONTH_SALES: &str = "One Month Sales Information";
/// Record field for the full sales data section.
pub const FIELD_SALES_INFORMATION: &str = "Sales Information";
/// Pseudo-field of the trailing navigational step.
pub const FIELD_GO_TO_BUDGET: &str = "Go to Budget";
/// Record field for the overall onboarding flag.
pub const FIELD_ONBOARDING_COMPLETE: &str = "onboarding_complete";
/// Optional server-computed completion percentage.
pub const FIELD_COMPLETION_PERCENTAGE: &str = "completion_percentage";

/// The ten onboarding steps in display order.
pub const ONBOARDING_TEMPLATE: [OnboardingStepDef; 10] = [
    OnboardingStepDef {
        label: "Basic Information",
        field: FIELD_BASIC_INFORMATION,
        route: "/onboarding/basic-information",
    },
    OnboardingStepDef {
        label: "Labour Information",
        field: FIELD_LABOUR_INFORMATION,
        route: "/onboarding/labour-information",
    },
    OnboardingStepDef {
        label: "Food Cost Details",
        field: "Food Cost Details",
        route: "/onboarding/food-cost-details",
    },
    OnboardingStepDef {
        label: "Fixed Costs",
        field: "Fixed Costs",
        route: "/onboarding/fixed-costs",
    },
    OnboardingStepDef {
        label: "Variable Costs",
        field: "Variable Costs",
        route: "/onboarding/variable-costs",
    },
    OnboardingStepDef {
        label: "One Month Sales",
        field: FIELD_ONE_MONTH_SALES,
        route: "/onboarding/one-month-sales",
    },
    OnboardingStepDef {
        label: "Suppliers",
        field: "Supplier Information",
        route: "/onboarding/suppliers",
    },
    OnboardingStepDef {
        label: "Sales Information",
        field: FIELD_SALES_INFORMATION,
        route: "/onboarding/sales-information",
    },
    OnboardingStepDef {
        label: "Expenses",
        field: "Expense Information",
        route: "/onboarding/expenses",
    },
    OnboardingStepDef {
        label: "Go to Budget",
        field: FIELD_GO_TO_BUDGET,
        route: "/dashboard/budget",
    },
];

/// Number of steps that count toward the completion percentage.
pub const COUNTED_STEPS: usize = ONBOARDING_TEMPLATE.len() - 1;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// One checklist row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingItem {
    pub label: &'static str,
    pub field: &'static str,
    pub route: &'static str,
    pub is_completed: bool,
}

/// Checklist state derived from the latest restaurant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingProgress {
    pub items: Vec<OnboardingItem>,
    /// 0..=100.
    pub completion_percentage: u8,
    /// 1-based index of the first incomplete item.
    pub current_step: usize,
}

impl OnboardingProgress {
    /// Progress with every item incomplete.
    pub fn zeroed() -> Self {
        Self::from_flags(|_| false, None)
    }

    fn from_flags(is_set: impl Fn(&str) -> bool, server_percentage: Option<u8>) -> Self {
        let items: Vec<OnboardingItem> = ONBOARDING_TEMPLATE
            .iter()
            .enumerate()
            .map(|(i, def)| OnboardingItem {
                label: def.label,
                field: def.field,
                route: def.route,
                is_completed: i < COUNTED_STEPS && is_set(def.field),
            })
            .collect();

        let completed = items.iter().filter(|item| item.is_completed).count();
        let computed = ((completed as f64 / COUNTED_STEPS as f64) * 100.0).round() as u8;

        let current_step = items
            .iter()
            .position(|item| !item.is_completed)
            .map_or(items.len(), |i| i + 1);

        Self {
            items,
            completion_percentage: server_percentage.unwrap_or(computed),
            current_step,
        }
    }
}

/// Compute the onboarding checklist from a restaurant payload.
///
/// Accepts a bare record, `{ restaurants: [...] }`, or either of those
/// wrapped once more under `data`. Anything else yields
/// [`OnboardingProgress::zeroed`].
pub fn compute_progress(payload: Option<&Value>) -> OnboardingProgress {
    let Some(record) = payload.and_then(extract_restaurant) else {
        return OnboardingProgress::zeroed();
    };

    OnboardingProgress::from_flags(
        |field| record_flag(record, field),
        server_percentage(record),
    )
}

/// Locate the restaurant record inside an onboarding payload.
///
/// Unwraps at most one `data` level and one `restaurants` array (taking the
/// first restaurant).
pub fn extract_restaurant(payload: &Value) -> Option<&Map<String, Value>> {
    let inner = payload.get("data").unwrap_or(payload);
    match inner.get("restaurants") {
        Some(restaurants) => restaurants.as_array()?.first()?.as_object(),
        None => inner
            .as_object()
            .filter(|obj| looks_like_restaurant(obj)),
    }
}

/// Read a boolean field from a restaurant record; missing or non-boolean is false.
pub fn record_flag(record: &Map<String, Value>, field: &str) -> bool {
    record.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn looks_like_restaurant(obj: &Map<String, Value>) -> bool {
    obj.contains_key(FIELD_ONBOARDING_COMPLETE)
        || ONBOARDING_TEMPLATE
            .iter()
            .any(|def| obj.contains_key(def.field))
}

fn server_percentage(record: &Map<String, Value>) -> Option<u8> {
    let value = record.get(FIELD_COMPLETION_PERCENTAGE)?;
    let pct = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(pct.round().clamp(0.0, 100.0) as u8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
