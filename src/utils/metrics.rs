//! Motion metrics
//!
//! Counters, gauges and histograms collected by the engine while it runs.
//! The collector is shared behind an `Arc` so the frame driver and the
//! replay tool can snapshot it from outside the tick loop.
//!
//! Snapshots serialize to JSON for the replay summary.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

/// Observations kept per histogram; older values are discarded
pub const HISTOGRAM_WINDOW: usize = 4096;

/// Metrics collector for the motion engine
pub struct MetricsCollector {
    counters: RwLock<BTreeMap<String, u64>>,
    gauges: RwLock<BTreeMap<String, f64>>,
    histograms: RwLock<BTreeMap<String, Histogram>>,
    start_time: Instant,
}

impl MetricsCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            gauges: RwLock::new(BTreeMap::new()),
            histograms: RwLock::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter by `value`
    pub fn increment_counter(&self, name: &str, value: u64) {
        if value == 0 {
            return;
        }
        let mut counters = self.counters.write();
        *counters.entry(name.to_string()).or_insert(0) += value;
    }

    /// Set a gauge value
    pub fn set_gauge(&self, name: &str, value: f64) {
        self.gauges.write().insert(name.to_string(), value);
    }

    /// Record a histogram observation
    pub fn record_histogram(&self, name: &str, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.histograms
            .write()
            .entry(name.to_string())
            .or_insert_with(Histogram::new)
            .record(value);
    }

    /// Counter value
    pub fn get_counter(&self, name: &str) -> Option<u64> {
        self.counters.read().get(name).copied()
    }

    /// Gauge value
    pub fn get_gauge(&self, name: &str) -> Option<f64> {
        self.gauges.read().get(name).copied()
    }

    /// Histogram statistics
    pub fn get_histogram(&self, name: &str) -> Option<HistogramStats> {
        self.histograms.read().get(name).map(|h| h.stats())
    }

    /// All metrics at this instant
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            counters: self.counters.read().clone(),
            gauges: self.gauges.read().clone(),
            histograms: self
                .histograms
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.stats()))
                .collect(),
        }
    }

    /// Drop every metric
    pub fn reset(&self) {
        self.counters.write().clear();
        self.gauges.write().clear();
        self.histograms.write().clear();
    }

    /// Snapshot as pretty JSON
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Sliding-window histogram
struct Histogram {
    values: VecDeque<f64>,
    total: u64,
}

impl Histogram {
    fn new() -> Self {
        Self {
            values: VecDeque::new(),
            total: 0,
        }
    }

    fn record(&mut self, value: f64) {
        if self.values.len() == HISTOGRAM_WINDOW {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.total += 1;
    }

    fn stats(&self) -> HistogramStats {
        if self.values.is_empty() {
            return HistogramStats::default();
        }

        let mut sorted: Vec<f64> = self.values.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let mean = sum / count as f64;

        HistogramStats {
            count: self.total,
            window: count as u64,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
        }
    }
}

/// Inclusive percentile over sorted values (p=0 first, p=1 last)
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let index = ((sorted_values.len() - 1) as f64 * p) as usize;
    sorted_values[index.min(sorted_values.len() - 1)]
}

/// Histogram statistics over the retained window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramStats {
    /// Observations ever recorded
    pub count: u64,
    /// Observations in the window
    pub window: u64,
    /// Minimum in the window
    pub min: f64,
    /// Maximum in the window
    pub max: f64,
    /// Mean over the window
    pub mean: f64,
    /// Median
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

/// Point-in-time snapshot of all metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Collector age at snapshot time
    pub uptime: Duration,
    /// Counter values
    pub counters: BTreeMap<String, u64>,
    /// Gauge values
    pub gauges: BTreeMap<String, f64>,
    /// Histogram statistics
    pub histograms: BTreeMap<String, HistogramStats>,
}

pub mod metric_names {
    //! Metric names used by the engine.

    /// Frames ticked
    pub const FRAMES_TICKED: &str = "frames_ticked_total";
    /// Frame delta fed to the tick (ms)
    pub const FRAME_DT_MS: &str = "frame_dt_ms";
    /// Wall-clock time spent inside one tick (µs)
    pub const TICK_TIME_US: &str = "tick_time_us";

    /// Input events handled
    pub const EVENTS_HANDLED: &str = "events_handled_total";
    /// Input events rejected by the sampler
    pub const EVENTS_REJECTED: &str = "events_rejected_total";

    /// Cursor mode transitions
    pub const MODE_TRANSITIONS: &str = "mode_transitions_total";
    /// Classifier scans
    pub const CLASSIFIER_SCANS: &str = "classifier_scans_total";

    /// Particles emitted
    pub const PARTICLES_EMITTED: &str = "particles_emitted_total";
    /// Particle render handles released
    pub const PARTICLES_RELEASED: &str = "particles_released_total";
    /// Live particles
    pub const PARTICLES_LIVE: &str = "particles_live";

    /// Active frame index changes across all sections
    pub const FRAME_INDEX_CHANGES: &str = "frame_index_changes_total";

    /// Quality tier changes
    pub const TIER_CHANGES: &str = "tier_changes_total";
    /// Effective tier (0 = high .. 3 = reduced)
    pub const QUALITY_TIER: &str = "quality_tier";
    /// Measured frame rate
    pub const FPS: &str = "fps";

    /// Sink writes accepted
    pub const SINK_WRITES: &str = "sink_writes_total";
    /// Sink writes rejected (detached targets)
    pub const SINK_REJECTED: &str = "sink_writes_rejected_total";
}
