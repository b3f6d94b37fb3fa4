//! Minimal metrics registry and hub.
//!
//! Counter/gauge families with dynamic labels backed by `DashMap`. Labels are
//! flattened into sorted key vectors to keep deterministic ordering. Bound
//! collectors refresh their gauges right before a registry renders, so the
//! values reflect scrape time.

use std::collections::BTreeMap;
use std::fmt::{Display, Write};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Label names only allow `[a-zA-Z0-9_]`, so dotted tag keys become `_`.
fn sanitize_label_name(k: &str) -> String {
    k.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn render_samples<V: Display>(name: &str, mut rows: Vec<(LabelKey, V)>, out: &mut String) {
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, val) in rows {
        if key.is_empty() {
            let _ = writeln!(out, "{} {}", name, val);
            continue;
        }
        let label_str = key
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", sanitize_label_name(k), escape_label(v)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}{{{}}} {}", name, label_str, val);
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label set, if it was ever touched.
    pub fn get(&self, labels: &[(&str, &str)]) -> Option<u64> {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, out: &mut String) {
        let rows = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        render_samples(name, rows, out);
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    /// Overwrite the value for a label set.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
    }

    /// Set every given label set, then drop label sets not among them.
    ///
    /// Readers never see the family empty while values are swapped in.
    pub fn replace(&self, rows: &[(Vec<(&str, &str)>, i64)]) {
        let keys: Vec<LabelKey> = rows
            .iter()
            .map(|(labels, v)| {
                self.set(labels, *v);
                label_key(labels)
            })
            .collect();
        self.map.retain(|k, _| keys.contains(k));
    }

    fn render(&self, name: &str, out: &mut String) {
        let rows = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        render_samples(name, rows, out);
    }
}

/// Source of gauges refreshed at scrape time.
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;
    fn collect(&self, registry: &MetricsRegistry);
}

struct Family<T> {
    help: String,
    metric: Arc<T>,
}

/// A single registry: counter and gauge families plus bound collectors.
pub struct MetricsRegistry {
    id: u64,
    counters: DashMap<String, Family<CounterVec>>,
    gauges: DashMap<String, Family<GaugeVec>>,
    collectors: DashMap<&'static str, Arc<dyn Collector>>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            counters: DashMap::new(),
            gauges: DashMap::new(),
            collectors: DashMap::new(),
        }
    }

    /// Process-unique identifier, used as the hub key.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get or create a counter family.
    pub fn counter(&self, name: &str, help: &str) -> Arc<CounterVec> {
        let entry = self.counters.entry(name.to_string()).or_insert_with(|| Family {
            help: help.to_string(),
            metric: Arc::new(CounterVec::default()),
        });
        Arc::clone(&entry.metric)
    }

    /// Get or create a gauge family.
    pub fn gauge(&self, name: &str, help: &str) -> Arc<GaugeVec> {
        let entry = self.gauges.entry(name.to_string()).or_insert_with(|| Family {
            help: help.to_string(),
            metric: Arc::new(GaugeVec::default()),
        });
        Arc::clone(&entry.metric)
    }

    pub fn find_counter(&self, name: &str) -> Option<Arc<CounterVec>> {
        self.counters.get(name).map(|f| Arc::clone(&f.metric))
    }

    pub fn find_gauge(&self, name: &str) -> Option<Arc<GaugeVec>> {
        self.gauges.get(name).map(|f| Arc::clone(&f.metric))
    }

    /// Bind a collector. A collector with the same name replaces the old one.
    pub fn register_collector(&self, collector: Arc<dyn Collector>) {
        self.collectors.insert(collector.name(), collector);
    }

    pub fn collector_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.collectors.iter().map(|e| *e.key()).collect();
        names.sort_unstable();
        names
    }

    /// Run every bound collector once.
    pub fn collect(&self) {
        // Snapshot first: collectors call back into `gauge()`.
        let collectors: Vec<Arc<dyn Collector>> =
            self.collectors.iter().map(|e| Arc::clone(e.value())).collect();
        for c in collectors {
            c.collect(self);
        }
    }

    /// Refresh collectors, then render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.collect();

        let mut blocks: BTreeMap<String, String> = BTreeMap::new();
        for f in self.counters.iter() {
            let mut block = String::new();
            let _ = writeln!(block, "# HELP {} {}", f.key(), f.help);
            let _ = writeln!(block, "# TYPE {} counter", f.key());
            f.metric.render(f.key(), &mut block);
            blocks.insert(f.key().clone(), block);
        }
        for f in self.gauges.iter() {
            let mut block = String::new();
            let _ = writeln!(block, "# HELP {} {}", f.key(), f.help);
            let _ = writeln!(block, "# TYPE {} gauge", f.key());
            f.metric.render(f.key(), &mut block);
            blocks.entry(f.key().clone()).or_default().push_str(&block);
        }
        blocks.into_values().collect()
    }
}

/// The set of registries exposed by the scrape endpoint.
///
/// Passed explicitly to whoever adds or removes registries; there is no
/// global instance.
#[derive(Default)]
pub struct MetricsHub {
    registries: DashMap<u64, Arc<MetricsRegistry>>,
}

impl MetricsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, registry: Arc<MetricsRegistry>) {
        self.registries.insert(registry.id(), registry);
    }

    /// Returns whether the registry was present.
    pub fn remove(&self, registry: &MetricsRegistry) -> bool {
        self.registries.remove(&registry.id()).is_some()
    }

    pub fn contains(&self, registry: &MetricsRegistry) -> bool {
        self.registries.contains_key(&registry.id())
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Render every registry, oldest first.
    pub fn render(&self) -> String {
        let mut regs: Vec<Arc<MetricsRegistry>> =
            self.registries.iter().map(|e| Arc::clone(e.value())).collect();
        regs.sort_by_key(|r| r.id());
        regs.iter().map(|r| r.render()).collect()
    }
}
