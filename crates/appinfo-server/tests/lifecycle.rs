#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use appinfo_core::tags::CustomMetricTags;
use appinfo_server::config::{self, MetricsSection};
use appinfo_server::context::ServerContext;
use appinfo_server::lifecycle::{MetricsLifecycle, APP_INFO_COUNTER};
use appinfo_server::obs::metrics::MetricsHub;

fn metrics_cfg(probe: &str) -> MetricsSection {
    let yaml = format!("version: 1\nmetrics:\n  application: \"appinfo\"\n  probe:\n{probe}");
    config::load_from_str(&yaml).expect("config").metrics
}

fn no_probe() -> MetricsSection {
    metrics_cfg("    enabled: false\n")
}

fn ctx() -> ServerContext {
    ServerContext::new("test-server/1.0", "1.79.0")
}

#[tokio::test]
async fn startup_stores_single_registry() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let lifecycle = MetricsLifecycle::new(no_probe());

    assert!(ctx.metrics_registry().is_none());
    let registry = lifecycle.context_initialized(&mut ctx, &hub).await;

    let stored = ctx.metrics_registry().expect("registry stored");
    assert!(Arc::ptr_eq(stored, &registry));
    assert_eq!(hub.len(), 1);
    assert!(hub.contains(&registry));
    assert_eq!(
        registry.collector_names(),
        vec!["process_memory", "process_threads", "runtime_scheduler"]
    );
}

#[tokio::test]
async fn info_counter_is_one_with_tags() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let registry = MetricsLifecycle::new(no_probe())
        .context_initialized(&mut ctx, &hub)
        .await;

    let tags = CustomMetricTags::new("appinfo", "1.79.0", None);
    let counter = registry.find_counter(APP_INFO_COUNTER).expect("counter registered");
    assert_eq!(counter.get(&tags.as_pairs()), Some(1));
    assert_eq!(ctx.library_version(), None);

    let body = hub.render();
    assert!(body.contains("# HELP app_info_total Get application info\n"));
    assert!(body.contains("# TYPE app_info_total counter\n"));
    assert!(body.contains(r#"app_info_total{application="appinfo",runtime_version="1.79.0"} 1"#));
}

#[cfg(unix)]
#[tokio::test]
async fn detected_library_version_tags_counter() {
    let probe = concat!(
        "    program: \"sh\"\n",
        "    args: [\"-c\", \"echo 'OpenSSL 3.0.2'; echo 'not available'\"]\n",
    );
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    MetricsLifecycle::new(metrics_cfg(probe))
        .context_initialized(&mut ctx, &hub)
        .await;

    assert_eq!(ctx.library_version(), Some("OpenSSL 3.0.2"));
    let expected = concat!(
        r#"app_info_total{application="appinfo","#,
        r#"library_version="OpenSSL 3.0.2",runtime_version="1.79.0"} 1"#,
    );
    assert!(hub.render().contains(expected));
}

#[cfg(unix)]
#[tokio::test]
async fn failing_probe_does_not_block_startup() {
    let probe = "    program: \"sh\"\n    args: [\"-c\", \"exit 1\"]\n";
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let lifecycle = MetricsLifecycle::new(metrics_cfg(probe));
    let (registry, logs) =
        common::with_captured_logs(lifecycle.context_initialized(&mut ctx, &hub)).await;

    assert_eq!(ctx.library_version(), None);
    assert!(ctx.metrics_registry().is_some());
    assert_eq!(logs.count("WARN"), 1, "logs: {}", logs.contents());
    assert!(logs.contents().contains("metrics registry initialized"));
    let tags = CustomMetricTags::new("appinfo", "1.79.0", None);
    assert_eq!(
        registry.find_counter(APP_INFO_COUNTER).unwrap().get(&tags.as_pairs()),
        Some(1)
    );
}

#[cfg(unix)]
#[tokio::test]
async fn cancelled_probe_still_initializes() {
    let probe = "    program: \"sh\"\n    args: [\"-c\", \"sleep 10\"]\n";
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    MetricsLifecycle::new(metrics_cfg(probe))
        .context_initialized_with_cancel(&mut ctx, &hub, std::future::ready(()))
        .await;

    assert_eq!(ctx.library_version(), None);
    assert_eq!(hub.len(), 1);
}

#[tokio::test]
async fn shutdown_detaches_and_clears() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let lifecycle = MetricsLifecycle::new(no_probe());
    let registry = lifecycle.context_initialized(&mut ctx, &hub).await;

    lifecycle.context_destroyed(&mut ctx, &hub);
    assert!(ctx.metrics_registry().is_none());
    assert!(!hub.contains(&registry));
    assert!(hub.is_empty());
}

#[tokio::test]
async fn shutdown_twice_is_noop() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let lifecycle = MetricsLifecycle::new(no_probe());
    lifecycle.context_initialized(&mut ctx, &hub).await;

    lifecycle.context_destroyed(&mut ctx, &hub);
    lifecycle.context_destroyed(&mut ctx, &hub);
    assert!(ctx.metrics_registry().is_none());
    assert!(hub.is_empty());
}

#[test]
fn shutdown_without_startup_is_noop() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    MetricsLifecycle::new(no_probe()).context_destroyed(&mut ctx, &hub);
    assert!(ctx.metrics_registry().is_none());
}

#[tokio::test]
async fn reinitialize_replaces_previous_registry() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let lifecycle = MetricsLifecycle::new(no_probe());

    let first = lifecycle.context_initialized(&mut ctx, &hub).await;
    let second = lifecycle.context_initialized(&mut ctx, &hub).await;

    assert_eq!(hub.len(), 1);
    assert!(!hub.contains(&first));
    assert!(hub.contains(&second));
    assert!(Arc::ptr_eq(ctx.metrics_registry().unwrap(), &second));
}

#[tokio::test]
async fn restart_after_shutdown() {
    let hub = MetricsHub::new();
    let mut ctx = ctx();
    let lifecycle = MetricsLifecycle::new(no_probe());

    lifecycle.context_initialized(&mut ctx, &hub).await;
    lifecycle.context_destroyed(&mut ctx, &hub);
    let again = lifecycle.context_initialized(&mut ctx, &hub).await;

    assert_eq!(hub.len(), 1);
    assert!(hub.contains(&again));
}
