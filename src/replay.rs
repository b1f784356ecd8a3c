//! Trace replay
//!
//! A trace is a JSON file describing the environment, the document and a
//! timestamped list of input events:
//!
//! ```json
//! {
//!   "environment": { "fine_pointer": true, "viewport": { "width": 1280, "height": 720 } },
//!   "document": [ { "id": 1, "tag": "button" } ],
//!   "events": [
//!     { "at_ms": 0, "event": { "type": "pointer_move", "x": 40, "y": 40, "timestamp_ms": 0 } },
//!     { "at_ms": 20, "event": { "type": "pointer_over", "target": 1 } }
//!   ]
//! }
//! ```
//!
//! [`replay_offline`] steps the engine with a fixed frame delta and
//! delivers each event before the first frame at or after its `at_ms`, so
//! a trace always produces the same result for the same particle seed.
//! [`replay_realtime`] feeds the same trace to a [`FrameDriver`] on the
//! wall clock.

use crate::config::MotionConfig;
use crate::dom::DocumentTree;
use crate::engine::{EngineSummary, MotionEngine, StaticProbe, TeardownReport};
use crate::input::InputEvent;
use crate::render::RenderSink;
use crate::runtime::FrameDriver;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default offline frame delta (60 Hz)
pub const DEFAULT_FRAME_MS: f32 = 1000.0 / 60.0;

/// Time replayed after the last event so transitions settle (ms)
pub const SETTLE_MS: f64 = 1000.0;

/// One event with its replay time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Replay time (ms from start)
    pub at_ms: f64,
    /// Event to deliver
    pub event: InputEvent,
}

/// Replay input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayTrace {
    /// Environment answers
    #[serde(default)]
    pub environment: StaticProbe,

    /// Document the classifier scans
    #[serde(default)]
    pub document: DocumentTree,

    /// Events in any order; replay sorts them by time
    #[serde(default)]
    pub events: Vec<TimedEvent>,

    /// Total replay length; defaults to the last event plus a settle period
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

impl ReplayTrace {
    /// Load a trace from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file: {}", path.display()))?;
        let trace: ReplayTrace =
            serde_json::from_str(&content).context("Failed to parse trace file")?;
        debug!(
            "Trace loaded: {} events, {} elements",
            trace.events.len(),
            trace.document.len()
        );
        Ok(trace)
    }

    /// Events sorted by replay time (stable for equal times)
    pub fn sorted_events(&self) -> Vec<TimedEvent> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        events
    }

    /// Replay length (ms)
    pub fn duration_ms(&self) -> f64 {
        let last = self
            .events
            .iter()
            .map(|e| e.at_ms)
            .fold(0.0_f64, f64::max);
        self.duration_ms.unwrap_or(last + SETTLE_MS).max(0.0)
    }
}

/// Replay result
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Events delivered to the engine
    pub events_delivered: usize,
    /// Events the engine ignored
    pub events_ignored: usize,
    /// Engine state at the end of the trace, before teardown
    pub summary: EngineSummary,
    /// What teardown released
    pub teardown: TeardownReport,
}

/// Replay a trace with a fixed frame delta
pub fn replay_offline(
    config: MotionConfig,
    trace: &ReplayTrace,
    sink: &mut dyn RenderSink,
    frame_ms: f32,
) -> Result<ReplayReport> {
    let frame_ms = if frame_ms.is_finite() && frame_ms > 0.0 {
        frame_ms
    } else {
        DEFAULT_FRAME_MS
    };

    let mut engine = MotionEngine::mount(config, &trace.environment, &trace.document)
        .context("Failed to mount motion engine")?;

    let events = trace.sorted_events();
    let duration = trace.duration_ms();
    let mut pending = events.iter().peekable();
    let mut delivered = 0;
    let mut ignored = 0;
    let mut now = 0.0_f64;

    info!(
        "Replaying {} events over {:.0}ms at {:.2}ms per frame",
        events.len(),
        duration,
        frame_ms
    );

    loop {
        while let Some(timed) = pending.next_if(|e| e.at_ms <= now) {
            if engine.handle_event(timed.event.clone(), &trace.document) {
                delivered += 1;
            } else {
                ignored += 1;
            }
        }

        engine.tick(frame_ms, sink);
        engine.poll_rescan(&trace.document);
        now += frame_ms as f64;

        if now > duration && pending.peek().is_none() {
            break;
        }
    }

    let summary = engine.summary();
    let teardown = engine.teardown(sink);

    Ok(ReplayReport {
        events_delivered: delivered,
        events_ignored: ignored,
        summary,
        teardown,
    })
}

/// Replay a trace on the wall clock through the frame driver
///
/// The summary is taken after teardown, so it reports zero live
/// subscriptions.
pub async fn replay_realtime<S>(config: MotionConfig, trace: &ReplayTrace, sink: S) -> Result<ReplayReport>
where
    S: RenderSink + Send + 'static,
{
    let engine = MotionEngine::mount(config, &trace.environment, &trace.document)
        .context("Failed to mount motion engine")?;
    let tree = Arc::new(RwLock::new(trace.document.clone()));
    let mut handle = FrameDriver::spawn(engine, tree, sink);

    let start = tokio::time::Instant::now();
    let events = trace.sorted_events();
    let mut delivered = 0;

    for timed in &events {
        let at = start + Duration::from_secs_f64(timed.at_ms.max(0.0) / 1000.0);
        tokio::time::sleep_until(at).await;
        if handle.send(timed.event.clone()).await {
            delivered += 1;
        }
    }
    tokio::time::sleep_until(start + Duration::from_secs_f64(trace.duration_ms() / 1000.0)).await;

    let outcome = handle
        .shutdown()
        .await
        .context("Frame driver stopped unexpectedly")?;

    Ok(ReplayReport {
        events_delivered: delivered,
        events_ignored: events.len() - delivered,
        summary: outcome.summary,
        teardown: outcome.teardown,
    })
}
