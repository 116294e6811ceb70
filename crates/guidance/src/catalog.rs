//! Fetching the popup catalog and selecting a page's tours from it.

use std::sync::Arc;

use menuwise_core::guidance::{select_tour, GuidancePopup, TourKind};

use crate::backend::GuidanceBackend;

pub struct CatalogFetcher {
    backend: Arc<dyn GuidanceBackend>,
}

impl CatalogFetcher {
    pub fn new(backend: Arc<dyn GuidanceBackend>) -> Self {
        Self { backend }
    }

    /// General tour popups for `page`, ordered for display.
    pub async fn fetch_general(&self, page: &str) -> Vec<GuidancePopup> {
        self.fetch(TourKind::General, page).await
    }

    /// Data tour popups for `page`, ordered by id.
    pub async fn fetch_data(&self, page: &str) -> Vec<GuidancePopup> {
        self.fetch(TourKind::Data, page).await
    }

    /// Popups of `kind` for `page`. A transport failure yields an empty tour.
    pub async fn fetch(&self, kind: TourKind, page: &str) -> Vec<GuidancePopup> {
        match self.backend.fetch_popups().await {
            Ok(catalog) => {
                let popups = select_tour(&catalog, page, kind);
                tracing::debug!(
                    kind = kind.as_str(),
                    page,
                    catalog = catalog.len(),
                    selected = popups.len(),
                    "Selected guidance popups",
                );
                popups
            }
            Err(e) => {
                tracing::warn!(kind = kind.as_str(), page, error = %e, "Failed to fetch guidance popups");
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
