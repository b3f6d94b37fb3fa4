//! Shared application state for the appinfo server.
//!
//! Snapshot of the server context taken after metrics initialization, plus
//! the metrics hub and the draining flag. Cheap to clone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::ServerContext;
use crate::obs::metrics::MetricsHub;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    hub: Arc<MetricsHub>,
}

struct AppStateInner {
    server_info: String,
    runtime_version: String,
    library_version: Option<String>,
    draining: AtomicBool,
}

impl AppState {
    pub fn new(ctx: &ServerContext, hub: Arc<MetricsHub>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                server_info: ctx.server_info().to_string(),
                runtime_version: ctx.runtime_version().to_string(),
                library_version: ctx.library_version().map(str::to_string),
                draining: AtomicBool::new(false),
            }),
            hub,
        }
    }

    pub fn server_info(&self) -> &str {
        &self.inner.server_info
    }

    pub fn runtime_version(&self) -> &str {
        &self.inner.runtime_version
    }

    pub fn library_version(&self) -> Option<&str> {
        self.inner.library_version.as_deref()
    }

    pub fn metrics(&self) -> Arc<MetricsHub> {
        Arc::clone(&self.hub)
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
