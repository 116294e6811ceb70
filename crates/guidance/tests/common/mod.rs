#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use menuwise_client::ApiError;
use menuwise_core::guidance::{GuidancePopup, GuidanceStatus};
use menuwise_guidance::{Anchor, AnchorProbe, Bounds, GuidanceBackend, GuidanceConfig, GuidanceController};

/// In-memory stand-in for the guidance endpoints.
#[derive(Default)]
pub struct FakeBackend {
    status: Mutex<GuidanceStatus>,
    popups: Mutex<Vec<GuidancePopup>>,
    /// Fails both status reads and writes.
    pub status_offline: AtomicBool,
    /// Fails status reads only.
    pub status_reads_offline: AtomicBool,
    pub catalog_offline: AtomicBool,
    pub status_writes: AtomicUsize,
}

impl FakeBackend {
    pub fn new(status: GuidanceStatus, popups: Vec<GuidancePopup>) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            popups: Mutex::new(popups),
            ..Default::default()
        })
    }

    pub fn status(&self) -> GuidanceStatus {
        *self.status.lock().unwrap()
    }

    pub fn set_status(&self, status: GuidanceStatus) {
        *self.status.lock().unwrap() = status;
    }

    fn unavailable() -> ApiError {
        ApiError::Status {
            status: 503,
            body: "service unavailable".into(),
        }
    }
}

#[async_trait]
impl GuidanceBackend for FakeBackend {
    async fn fetch_status(&self) -> Result<GuidanceStatus, ApiError> {
        if self.status_offline.load(Ordering::SeqCst)
            || self.status_reads_offline.load(Ordering::SeqCst)
        {
            return Err(Self::unavailable());
        }
        Ok(self.status())
    }

    async fn store_status(&self, status: &GuidanceStatus) -> Result<(), ApiError> {
        if self.status_offline.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        self.set_status(*status);
        Ok(())
    }

    async fn fetch_popups(&self) -> Result<Vec<GuidancePopup>, ApiError> {
        if self.catalog_offline.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.popups.lock().unwrap().clone())
    }
}

/// A page whose mounted anchors can change during a test.
#[derive(Default)]
pub struct FakePage {
    mounted: Mutex<HashSet<String>>,
}

impl FakePage {
    pub fn with(keys: &[&str]) -> Arc<Self> {
        let page = Self::default();
        for key in keys {
            page.mount(key);
        }
        Arc::new(page)
    }

    pub fn mount(&self, key: &str) {
        self.mounted.lock().unwrap().insert(key.to_string());
    }

    pub fn unmount(&self, key: &str) {
        self.mounted.lock().unwrap().remove(key);
    }
}

impl AnchorProbe for FakePage {
    fn locate(&self, key: &str) -> Option<Anchor> {
        self.mounted.lock().unwrap().contains(key).then(|| Anchor {
            key: key.to_string(),
            bounds: Bounds::new(100.0, 100.0, 240.0, 48.0),
        })
    }
}

pub fn popup(id: i64, page: &str, key: &str) -> GuidancePopup {
    GuidancePopup {
        id,
        page: page.to_string(),
        key: key.to_string(),
        title: format!("Step {id}"),
        text: format!("About {key}"),
        is_active: true,
    }
}

/// Config with tours started only on request or by signals.
pub fn manual_config() -> GuidanceConfig {
    GuidanceConfig {
        auto_start: false,
        ..Default::default()
    }
}

pub fn controller(
    backend: &Arc<FakeBackend>,
    page: &Arc<FakePage>,
    config: GuidanceConfig,
) -> Arc<GuidanceController> {
    GuidanceController::new(backend.clone(), page.clone(), config)
}
