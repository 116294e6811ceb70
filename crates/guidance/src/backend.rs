//! The remote operations the guidance core depends on.

use async_trait::async_trait;

use menuwise_client::{ApiError, MenuwiseApi};
use menuwise_core::guidance::{GuidancePopup, GuidanceStatus};

/// Status and catalog access used by the controller.
///
/// [`MenuwiseApi`] is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait GuidanceBackend: Send + Sync {
    async fn fetch_status(&self) -> Result<GuidanceStatus, ApiError>;

    /// Persist the full status pair exactly as given.
    async fn store_status(&self, status: &GuidanceStatus) -> Result<(), ApiError>;

    /// The whole popup catalog, unfiltered.
    async fn fetch_popups(&self) -> Result<Vec<GuidancePopup>, ApiError>;
}

#[async_trait]
impl GuidanceBackend for MenuwiseApi {
    async fn fetch_status(&self) -> Result<GuidanceStatus, ApiError> {
        self.get_guidance_status().await
    }

    async fn store_status(&self, status: &GuidanceStatus) -> Result<(), ApiError> {
        self.set_guidance_status(status).await
    }

    async fn fetch_popups(&self) -> Result<Vec<GuidancePopup>, ApiError> {
        self.list_guidance_popups().await
    }
}
