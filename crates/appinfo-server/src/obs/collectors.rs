//! Standard process and runtime collectors.
//!
//! Each collector carries the common tags (the `application` label) and
//! refreshes its gauges when the owning registry renders.

use std::collections::BTreeMap;
use std::sync::Mutex;

use sysinfo::{get_current_pid, Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::runtime::Handle;

use super::metrics::{Collector, MetricsRegistry};

/// Labels applied to every sample a collector emits.
pub type CommonTags = Vec<(String, String)>;

fn labels<'a>(common: &'a CommonTags, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    common
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(extra.iter().copied())
        .collect()
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Resident and virtual memory of this process.
pub struct ProcessMemoryMetrics {
    tags: CommonTags,
    pid: Option<Pid>,
    sys: Mutex<System>,
}

impl ProcessMemoryMetrics {
    pub fn new(tags: CommonTags) -> Self {
        Self {
            tags,
            pid: get_current_pid().ok(),
            sys: Mutex::new(System::new()),
        }
    }
}

impl Collector for ProcessMemoryMetrics {
    fn name(&self) -> &'static str {
        "process_memory"
    }

    fn collect(&self, registry: &MetricsRegistry) {
        let Some(pid) = self.pid else { return };
        let Ok(mut sys) = self.sys.lock() else { return };

        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::new().with_memory(),
        );
        let Some(process) = sys.process(pid) else {
            tracing::debug!(%pid, "current process not found; skipping memory metrics");
            return;
        };

        let used = registry.gauge(
            "process_memory_used_bytes",
            "Memory used by the process, by area",
        );
        used.set(&labels(&self.tags, &[("area", "resident")]), saturating_i64(process.memory()));
        used.set(
            &labels(&self.tags, &[("area", "virtual")]),
            saturating_i64(process.virtual_memory()),
        );
    }
}

/// Async runtime scheduler statistics.
///
/// Captures the runtime handle at construction; built outside a runtime it
/// reports nothing.
pub struct RuntimeSchedulerMetrics {
    tags: CommonTags,
    handle: Option<Handle>,
}

impl RuntimeSchedulerMetrics {
    pub fn new(tags: CommonTags) -> Self {
        Self {
            tags,
            handle: Handle::try_current().ok(),
        }
    }
}

impl Collector for RuntimeSchedulerMetrics {
    fn name(&self) -> &'static str {
        "runtime_scheduler"
    }

    fn collect(&self, registry: &MetricsRegistry) {
        let Some(handle) = &self.handle else { return };
        let m = handle.metrics();
        let l = labels(&self.tags, &[]);

        registry
            .gauge("runtime_workers", "Number of async runtime worker threads")
            .set(&l, saturating_i64(m.num_workers() as u64));
        registry
            .gauge("runtime_tasks_alive", "Number of alive tasks on the async runtime")
            .set(&l, saturating_i64(m.num_alive_tasks() as u64));
        registry
            .gauge("runtime_global_queue_depth", "Tasks waiting in the runtime injection queue")
            .set(&l, saturating_i64(m.global_queue_depth() as u64));
    }
}

/// OS thread counts of this process, by scheduler state.
pub struct ProcessThreadMetrics {
    tags: CommonTags,
    pid: Option<Pid>,
    sys: Mutex<System>,
}

impl ProcessThreadMetrics {
    pub fn new(tags: CommonTags) -> Self {
        Self {
            tags,
            pid: get_current_pid().ok(),
            sys: Mutex::new(System::new()),
        }
    }
}

impl Collector for ProcessThreadMetrics {
    fn name(&self) -> &'static str {
        "process_threads"
    }

    fn collect(&self, registry: &MetricsRegistry) {
        let Some(pid) = self.pid else { return };
        let Ok(mut sys) = self.sys.lock() else { return };

        // A pid-scoped refresh lists the task ids; a second pass refreshes
        // those tasks so their states are current.
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::new(),
        );
        let mut to_refresh = vec![pid];
        if let Some(tasks) = sys.process(pid).and_then(|p| p.tasks()) {
            to_refresh.extend(tasks.iter().copied());
        }
        if to_refresh.len() > 1 {
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&to_refresh),
                true,
                ProcessRefreshKind::new(),
            );
        }
        let Some(process) = sys.process(pid) else { return };

        // The main thread is the process entry itself; `tasks()` skips it.
        let mut by_state: BTreeMap<String, i64> = BTreeMap::new();
        by_state.insert(process.status().to_string().to_lowercase(), 1);
        let mut live = 1usize;
        for tid in process.tasks().into_iter().flatten() {
            let state = sys
                .process(*tid)
                .map(|t| t.status().to_string().to_lowercase())
                .unwrap_or_else(|| "unknown".to_string());
            *by_state.entry(state).or_default() += 1;
            live += 1;
        }

        let rows: Vec<(Vec<(&str, &str)>, i64)> = by_state
            .iter()
            .map(|(state, count)| (labels(&self.tags, &[("state", state.as_str())]), *count))
            .collect();
        registry
            .gauge("process_threads", "Threads of the process, by state")
            .replace(&rows);
        registry
            .gauge("process_threads_live", "Live threads of the process")
            .set(&labels(&self.tags, &[]), saturating_i64(live as u64));
    }
}
