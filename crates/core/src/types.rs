/// Guidance popup identifiers are backend-assigned integers.
pub type PopupId = i64;

/// Canonical screen name used as the filter key into the popup catalog.
pub type PageName = String;
