//! Host-owned server context.
//!
//! One per running server. Holds the identity facts reported by `/info` and
//! the handle of the active metrics registry between the two lifecycle
//! transitions.

use std::sync::Arc;

use crate::config::AppInfoConfig;
use crate::info::{RUNTIME_VERSION, SERVER_INFO};
use crate::obs::metrics::MetricsRegistry;

#[derive(Default)]
pub struct ServerContext {
    server_info: String,
    runtime_version: String,
    library_version: Option<String>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl ServerContext {
    pub fn new(server_info: impl Into<String>, runtime_version: impl Into<String>) -> Self {
        Self {
            server_info: server_info.into(),
            runtime_version: runtime_version.into(),
            library_version: None,
            metrics: None,
        }
    }

    pub fn from_config(cfg: &AppInfoConfig) -> Self {
        let server_info = cfg
            .server
            .server_info
            .clone()
            .unwrap_or_else(|| SERVER_INFO.to_string());
        Self::new(server_info, RUNTIME_VERSION)
    }

    pub fn server_info(&self) -> &str {
        &self.server_info
    }

    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    /// Library version detected during the last initialization, if any.
    pub fn library_version(&self) -> Option<&str> {
        self.library_version.as_deref()
    }

    /// The active registry, if the context is initialized.
    pub fn metrics_registry(&self) -> Option<&Arc<MetricsRegistry>> {
        self.metrics.as_ref()
    }

    pub(crate) fn set_library_version(&mut self, version: Option<String>) {
        self.library_version = version;
    }

    pub(crate) fn set_metrics_registry(&mut self, registry: Arc<MetricsRegistry>) {
        self.metrics = Some(registry);
    }

    pub(crate) fn take_metrics_registry(&mut self) -> Option<Arc<MetricsRegistry>> {
        self.metrics.take()
    }
}
