//! Session cache for the two "has seen guidance" flags.
//!
//! Reads fail open: a transport error reads as "nothing seen" so the user
//! still gets guidance. Writes are read-modify-write over the full pair,
//! because the status endpoint persists exactly what it receives.
//!
//! The cache keeps the last pair confirmed by the server apart from local
//! overrides (forced restarts, completions whose write failed). Overrides
//! feed the start gate but are never merged into a write.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use menuwise_client::ApiError;
use menuwise_core::guidance::{GuidanceStatus, StatusPatch};

use crate::backend::GuidanceBackend;

#[derive(Debug, Clone, Copy)]
struct CachedStatus {
    status: GuidanceStatus,
    fetched_at: Instant,
}

pub struct StatusCache {
    backend: Arc<dyn GuidanceBackend>,
    ttl: Duration,
    /// Last server-confirmed pair. `None` until the first successful read.
    cached: RwLock<Option<CachedStatus>>,
    /// Local-only flag changes layered over the confirmed pair.
    overrides: RwLock<StatusPatch>,
}

impl StatusCache {
    pub fn new(backend: Arc<dyn GuidanceBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            cached: RwLock::new(None),
            overrides: RwLock::new(StatusPatch::default()),
        }
    }

    /// Fetch the remote status, caching it on success.
    ///
    /// Never fails: a transport error is logged and reads as `{false, false}`.
    /// Local overrides are not applied.
    pub async fn read(&self) -> GuidanceStatus {
        match self.backend.fetch_status().await {
            Ok(status) => {
                self.store_local(status).await;
                status
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read guidance status, assuming unseen");
                GuidanceStatus::default()
            }
        }
    }

    /// The status the start gate sees: the confirmed pair while fresh
    /// (otherwise a new [`read`](Self::read)) with local overrides applied.
    pub async fn current(&self) -> GuidanceStatus {
        let fresh = self
            .cached
            .read()
            .await
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.status);
        let base = match fresh {
            Some(status) => status,
            None => self.read().await,
        };
        base.merged(*self.overrides.read().await)
    }

    /// The last server-confirmed pair regardless of age; `None` when never
    /// checked.
    pub async fn cached(&self) -> Option<GuidanceStatus> {
        self.cached.read().await.map(|entry| entry.status)
    }

    /// Pending local overrides.
    pub async fn overrides(&self) -> StatusPatch {
        *self.overrides.read().await
    }

    /// Drop the cached pair and every override so the next access reads
    /// remotely.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
        *self.overrides.write().await = StatusPatch::default();
    }

    /// Override flags locally without touching the backend.
    ///
    /// Returns the resulting gate view. The override never reaches the
    /// server through [`write`](Self::write).
    pub async fn patch_local(&self, patch: StatusPatch) -> GuidanceStatus {
        let overrides = {
            let mut overrides = self.overrides.write().await;
            *overrides = overrides.then(patch);
            *overrides
        };
        self.cached().await.unwrap_or_default().merged(overrides)
    }

    /// Merge `patch` into the current remote status and persist the full pair.
    ///
    /// The remote status is read first so the flag the patch leaves unset is
    /// sent back unchanged. If that read fails, the last server-confirmed
    /// pair is used instead; with nothing confirmed the write is refused
    /// rather than risk resetting the sibling flag.
    ///
    /// On success the overrides for the written flags are dropped and the
    /// gate view is returned.
    pub async fn write(&self, patch: StatusPatch) -> Result<GuidanceStatus, ApiError> {
        let base = match self.backend.fetch_status().await {
            Ok(status) => status,
            Err(e) => match self.cached().await {
                Some(status) => {
                    tracing::warn!(error = %e, "Status read failed before write, merging into cached status");
                    status
                }
                None => {
                    tracing::error!(error = %e, "Status read failed before write and nothing is cached");
                    return Err(e);
                }
            },
        };

        let merged = base.merged(patch);
        self.backend.store_status(&merged).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to write guidance status");
            e
        })?;
        self.store_local(merged).await;

        let mut overrides = self.overrides.write().await;
        *overrides = overrides.without(patch);
        Ok(merged.merged(*overrides))
    }

    async fn store_local(&self, status: GuidanceStatus) {
        *self.cached.write().await = Some(CachedStatus {
            status,
            fetched_at: Instant::now(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
