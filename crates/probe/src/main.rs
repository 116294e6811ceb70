//! `menuwise-probe` -- inspect a user's guidance and onboarding state.
//!
//! Fetches the restaurant onboarding record, the guidance status and the
//! popup catalog for the configured user, then logs the checklist progress,
//! the redirect the screen containers would apply and the tours a page would
//! show.
//!
//! # Environment variables
//!
//! | Variable                     | Required | Default                     | Description                    |
//! |------------------------------|----------|-----------------------------|--------------------------------|
//! | `MENUWISE_API_URL`           | no       | `http://localhost:8000/api` | Backend API base URL           |
//! | `MENUWISE_API_TOKEN`         | no       | --                          | Bearer token of the user       |
//! | `MENUWISE_REQUEST_TIMEOUT_SECS` | no    | `30`                        | Per-request timeout            |
//! | `MENUWISE_PROBE_PATH`        | no       | `/dashboard/budget`         | Path whose tours are inspected |

use std::sync::Arc;

use menuwise_client::{ClientConfig, MenuwiseApi};
use menuwise_core::guidance::TourKind;
use menuwise_core::onboarding::compute_progress;
use menuwise_core::pages::resolve_page;
use menuwise_core::routing::{decide_redirect, RedirectFlags};
use menuwise_guidance::catalog::CatalogFetcher;
use menuwise_guidance::status::StatusCache;
use menuwise_guidance::{GuidanceBackend, GuidanceConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PROBE_PATH: &str = "/dashboard/budget";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menuwise_probe=info,menuwise_guidance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client_config = ClientConfig::from_env();
    let guidance_config = GuidanceConfig::from_env();
    let path = std::env::var("MENUWISE_PROBE_PATH").unwrap_or_else(|_| DEFAULT_PROBE_PATH.into());

    if client_config.api_token.is_none() {
        tracing::warn!("MENUWISE_API_TOKEN is not set, requests will be anonymous");
    }

    let api = MenuwiseApi::new(&client_config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build API client");
        std::process::exit(1);
    });

    tracing::info!(api_url = %api.api_url(), path = %path, "Starting menuwise-probe");

    // ---- onboarding ----

    let payload = match api.get_restaurants_onboarding().await {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch onboarding data");
            None
        }
    };

    let progress = compute_progress(payload.as_ref());
    tracing::info!(
        completion_percentage = progress.completion_percentage,
        current_step = progress.current_step,
        "Onboarding progress",
    );
    for item in progress.items.iter().filter(|item| !item.is_completed) {
        tracing::info!(label = item.label, route = item.route, "Onboarding step pending");
    }

    let flags = RedirectFlags::from_payload(payload.as_ref());
    match decide_redirect(&flags, &path) {
        Some(target) => tracing::info!(?flags, from = %path, to = target, "Screen would redirect"),
        None => tracing::info!(?flags, path = %path, "No redirect applies"),
    }

    // ---- guidance ----

    let backend: Arc<dyn GuidanceBackend> = Arc::new(api);
    let status_cache = StatusCache::new(backend.clone(), guidance_config.status_ttl);
    let catalog = CatalogFetcher::new(backend);

    let status = status_cache.read().await;
    tracing::info!(
        has_seen_user_guidance = status.has_seen_user_guidance,
        has_seen_user_guidance_data = status.has_seen_user_guidance_data,
        "Guidance status",
    );

    let page = resolve_page(&path);
    for kind in [TourKind::General, TourKind::Data] {
        let popups = catalog.fetch(kind, &page).await;
        let keys: Vec<&str> = popups.iter().map(|p| p.key.as_str()).collect();
        tracing::info!(
            kind = kind.as_str(),
            page = %page,
            eligible = status.allows_start(kind),
            steps = popups.len(),
            keys = %serde_json::to_string(&keys).unwrap_or_default(),
            "Tour for page",
        );
    }
}
