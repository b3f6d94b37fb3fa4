//! Metrics registry lifecycle.
//!
//! `context_initialized` builds a registry, binds the standard collectors and
//! the application info counter, adds it to the hub, and stores the handle in
//! the server context. `context_destroyed` takes it back out and detaches it.
//! Both transitions borrow the context mutably, so they cannot overlap.

pub mod probe;

use std::future::Future;
use std::sync::Arc;

use appinfo_core::tags::{CustomMetricTags, TAG_APPLICATION};

use crate::config::MetricsSection;
use crate::context::ServerContext;
use crate::obs::collectors::{
    CommonTags, ProcessMemoryMetrics, ProcessThreadMetrics, RuntimeSchedulerMetrics,
};
use crate::obs::metrics::{MetricsHub, MetricsRegistry};

pub use probe::LibraryProbe;

/// Name of the application info counter.
pub const APP_INFO_COUNTER: &str = "app_info_total";
const APP_INFO_HELP: &str = "Get application info";

pub struct MetricsLifecycle {
    cfg: MetricsSection,
}

impl MetricsLifecycle {
    pub fn new(cfg: MetricsSection) -> Self {
        Self { cfg }
    }

    pub fn common_tags(&self) -> CommonTags {
        vec![(TAG_APPLICATION.to_string(), self.cfg.application.clone())]
    }

    /// Uninitialized -> active.
    pub async fn context_initialized(
        &self,
        ctx: &mut ServerContext,
        hub: &MetricsHub,
    ) -> Arc<MetricsRegistry> {
        self.context_initialized_with_cancel(ctx, hub, std::future::pending())
            .await
    }

    /// Same as `context_initialized`, aborting the library probe once `cancel` resolves.
    pub async fn context_initialized_with_cancel<C>(
        &self,
        ctx: &mut ServerContext,
        hub: &MetricsHub,
        cancel: C,
    ) -> Arc<MetricsRegistry>
    where
        C: Future<Output = ()>,
    {
        if let Some(previous) = ctx.take_metrics_registry() {
            tracing::warn!(
                registry_id = previous.id(),
                "metrics registry already active; detaching it before re-initializing"
            );
            hub.remove(&previous);
        }

        let registry = Arc::new(MetricsRegistry::new());
        hub.add(Arc::clone(&registry));

        let tags = self.common_tags();
        registry.register_collector(Arc::new(ProcessMemoryMetrics::new(tags.clone())));
        registry.register_collector(Arc::new(RuntimeSchedulerMetrics::new(tags.clone())));
        registry.register_collector(Arc::new(ProcessThreadMetrics::new(tags)));

        let lib = probe::probe_configured(&self.cfg.probe, cancel).await;
        let info_tags =
            CustomMetricTags::new(&self.cfg.application, ctx.runtime_version(), lib.version());
        add_app_info_counter(&registry, &info_tags);
        ctx.set_library_version(lib.version().map(str::to_string));

        ctx.set_metrics_registry(Arc::clone(&registry));
        tracing::info!(
            registry_id = registry.id(),
            application = %self.cfg.application,
            library_version = ?lib.version(),
            "metrics registry initialized"
        );
        registry
    }

    /// Active -> uninitialized. A context without a registry is left alone.
    pub fn context_destroyed(&self, ctx: &mut ServerContext, hub: &MetricsHub) {
        match ctx.take_metrics_registry() {
            Some(registry) => {
                let was_attached = hub.remove(&registry);
                tracing::info!(
                    registry_id = registry.id(),
                    was_attached,
                    "metrics registry destroyed"
                );
            }
            None => tracing::debug!("no metrics registry to destroy"),
        }
    }
}

/// Register the info counter and bump it once; its value stays 1.
pub fn add_app_info_counter(registry: &MetricsRegistry, tags: &CustomMetricTags) {
    registry
        .counter(APP_INFO_COUNTER, APP_INFO_HELP)
        .inc(&tags.as_pairs());
}
