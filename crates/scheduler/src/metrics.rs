//! Process-wide dispatch counters, totalled and broken down by tool.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use once_cell::sync::Lazy;

#[derive(Default)]
struct Counters {
    invoked: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    frame_gone: AtomicU64,
    stability_timeouts: AtomicU64,
}

impl Counters {
    fn load(&self) -> ToolCounts {
        ToolCounts {
            invoked: self.invoked.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            frame_gone: self.frame_gone.load(Ordering::Relaxed),
            stability_timeouts: self.stability_timeouts.load(Ordering::Relaxed),
        }
    }
}

static TOTALS: Lazy<Counters> = Lazy::new(Counters::default);
static PER_TOOL: Lazy<DashMap<&'static str, Counters>> = Lazy::new(DashMap::new);

fn bump(tool: &'static str, pick: fn(&Counters) -> &AtomicU64) {
    pick(&TOTALS).fetch_add(1, Ordering::Relaxed);
    let entry = PER_TOOL.entry(tool).or_default();
    pick(entry.value()).fetch_add(1, Ordering::Relaxed);
}

pub fn record_invoked(tool: &'static str) {
    bump(tool, |c| &c.invoked);
}

pub fn record_succeeded(tool: &'static str) {
    bump(tool, |c| &c.succeeded);
}

pub fn record_failed(tool: &'static str) {
    bump(tool, |c| &c.failed);
}

pub fn record_frame_gone(tool: &'static str) {
    bump(tool, |c| &c.frame_gone);
}

pub fn record_stability_timeout(tool: &'static str) {
    bump(tool, |c| &c.stability_timeouts);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolCounts {
    pub invoked: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub frame_gone: u64,
    pub stability_timeouts: u64,
}

#[derive(Clone, Debug, Default)]
pub struct DispatchMetricsSnapshot {
    pub invoked: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub frame_gone: u64,
    pub stability_timeouts: u64,
    pub per_tool: BTreeMap<String, ToolCounts>,
}

pub fn snapshot() -> DispatchMetricsSnapshot {
    let totals = TOTALS.load();
    DispatchMetricsSnapshot {
        invoked: totals.invoked,
        succeeded: totals.succeeded,
        failed: totals.failed,
        frame_gone: totals.frame_gone,
        stability_timeouts: totals.stability_timeouts,
        per_tool: PER_TOOL
            .iter()
            .map(|entry| (entry.key().to_string(), entry.value().load()))
            .collect(),
    }
}
