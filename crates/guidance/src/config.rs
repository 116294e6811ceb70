use std::time::Duration;

use crate::retry::RetryPolicy;

/// Delay before anchors are looked up after a navigation.
const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
/// Locator retries after the first lookup.
const DEFAULT_LOCATOR_RETRIES: u32 = 10;
const MIN_LOCATOR_RETRIES: u32 = 10;
const MAX_LOCATOR_RETRIES: u32 = 15;
/// Delay between locator lookups.
const DEFAULT_LOCATOR_INTERVAL_MS: u64 = 500;
/// How long a fetched status pair is trusted without a navigation.
const DEFAULT_STATUS_TTL_SECS: u64 = 300;

/// Runtime configuration for the guidance controller.
#[derive(Debug, Clone)]
pub struct GuidanceConfig {
    pub settle_delay: Duration,
    pub locator: RetryPolicy,
    pub status_ttl: Duration,
    /// Start gated tours automatically on every navigation.
    pub auto_start: bool,
}

impl GuidanceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `GUIDANCE_SETTLE_DELAY_MS`    | `1000`  |
    /// | `GUIDANCE_LOCATOR_RETRIES`    | `10`    |
    /// | `GUIDANCE_LOCATOR_INTERVAL_MS`| `500`   |
    /// | `GUIDANCE_STATUS_TTL_SECS`    | `300`   |
    /// | `GUIDANCE_AUTO_START`         | `true`  |
    ///
    /// Locator retries are clamped to 10..=15. Unparseable values fall back
    /// to the default.
    pub fn from_env() -> Self {
        let settle_delay_ms = env_or("GUIDANCE_SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS);
        let retries = env_or("GUIDANCE_LOCATOR_RETRIES", DEFAULT_LOCATOR_RETRIES)
            .clamp(MIN_LOCATOR_RETRIES, MAX_LOCATOR_RETRIES);
        let interval_ms = env_or("GUIDANCE_LOCATOR_INTERVAL_MS", DEFAULT_LOCATOR_INTERVAL_MS);
        let ttl_secs = env_or("GUIDANCE_STATUS_TTL_SECS", DEFAULT_STATUS_TTL_SECS);
        let auto_start = env_or("GUIDANCE_AUTO_START", true);

        Self {
            settle_delay: Duration::from_millis(settle_delay_ms),
            locator: RetryPolicy::new(retries, Duration::from_millis(interval_ms)),
            status_ttl: Duration::from_secs(ttl_secs),
            auto_start,
        }
    }
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            locator: RetryPolicy::new(
                DEFAULT_LOCATOR_RETRIES,
                Duration::from_millis(DEFAULT_LOCATOR_INTERVAL_MS),
            ),
            status_ttl: Duration::from_secs(DEFAULT_STATUS_TTL_SECS),
            auto_start: true,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %raw, "Ignoring unparseable guidance setting");
            default
        }),
        Err(_) => default,
    }
}
