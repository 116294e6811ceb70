//! HTTP client for the guidance and onboarding endpoints.
//!
//! All calls are JSON over HTTP(S). Authentication is a plain bearer token
//! taken from [`ClientConfig`]; refreshing it is the host application's job.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use menuwise_core::error::CoreError;
use menuwise_core::guidance::{validate_popup_draft, GuidancePopup, GuidanceStatus, PopupDraft};
use menuwise_core::types::PopupId;

use crate::config::ClientConfig;

/// Guidance status endpoint (GET and POST).
pub const GUIDANCE_STATUS_ENDPOINT: &str = "/guidance-status";
/// Guidance popup catalog endpoint.
pub const GUIDANCE_POPUPS_ENDPOINT: &str = "/guidance-popups";
/// Restaurant onboarding endpoint.
pub const RESTAURANTS_ONBOARDING_ENDPOINT: &str = "/restaurants-onboarding";

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// The popup catalog is served either as a bare array or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogBody {
    List(Vec<GuidancePopup>),
    Wrapped { data: Vec<GuidancePopup> },
}

impl CatalogBody {
    fn into_popups(self) -> Vec<GuidancePopup> {
        match self {
            Self::List(popups) | Self::Wrapped { data: popups } => popups,
        }
    }
}

/// HTTP client for one Menuwise backend.
#[derive(Clone)]
pub struct MenuwiseApi {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl MenuwiseApi {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- guidance status ----

    /// `GET /guidance-status`.
    pub async fn get_guidance_status(&self) -> Result<GuidanceStatus, ApiError> {
        let response = self.request(reqwest::Method::GET, GUIDANCE_STATUS_ENDPOINT).send().await?;
        Self::parse_response(response).await
    }

    /// `POST /guidance-status` with the full pair of flags.
    ///
    /// The endpoint persists exactly what it receives, so callers must send
    /// a merged status rather than a partial one.
    pub async fn set_guidance_status(&self, status: &GuidanceStatus) -> Result<(), ApiError> {
        let response = self
            .request(reqwest::Method::POST, GUIDANCE_STATUS_ENDPOINT)
            .json(status)
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- popup catalog ----

    /// `GET /guidance-popups`: the full catalog, unfiltered.
    pub async fn list_guidance_popups(&self) -> Result<Vec<GuidancePopup>, ApiError> {
        let response = self.request(reqwest::Method::GET, GUIDANCE_POPUPS_ENDPOINT).send().await?;
        let body: CatalogBody = Self::parse_response(response).await?;
        Ok(body.into_popups())
    }

    /// `POST /guidance-popups`.
    pub async fn create_guidance_popup(&self, draft: &PopupDraft) -> Result<GuidancePopup, ApiError> {
        validate_popup_draft(draft)?;
        let response = self
            .request(reqwest::Method::POST, GUIDANCE_POPUPS_ENDPOINT)
            .json(draft)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT /guidance-popups/{id}`.
    pub async fn update_guidance_popup(
        &self,
        id: PopupId,
        draft: &PopupDraft,
    ) -> Result<GuidancePopup, ApiError> {
        validate_popup_draft(draft)?;
        let response = self
            .request(reqwest::Method::PUT, &popup_path(id))
            .json(draft)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(popup_not_found(id));
        }
        Self::parse_response(response).await
    }

    /// `DELETE /guidance-popups/{id}`.
    pub async fn delete_guidance_popup(&self, id: PopupId) -> Result<(), ApiError> {
        let response = self.request(reqwest::Method::DELETE, &popup_path(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(popup_not_found(id));
        }
        Self::check_status(response).await
    }

    // ---- onboarding ----

    /// `GET /restaurants-onboarding` as raw JSON.
    ///
    /// The payload shape varies (optionally wrapped in `data`), so it is
    /// left to `menuwise_core::onboarding` to unwrap.
    pub async fn get_restaurants_onboarding(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .request(reqwest::Method::GET, RESTAURANTS_ONBOARDING_ENDPOINT)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code, returning it
    /// unchanged or an [`ApiError::Status`] carrying the body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), body = %body, "Backend request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

fn popup_path(id: PopupId) -> String {
    format!("{GUIDANCE_POPUPS_ENDPOINT}/{id}")
}

fn popup_not_found(id: PopupId) -> ApiError {
    ApiError::Core(CoreError::NotFound {
        entity: "guidance_popup",
        id,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
