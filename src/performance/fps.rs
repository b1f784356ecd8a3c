//! Frame rate meter
//!
//! Rolling window of frame timestamps. The reported rate is the number of
//! frame intervals inside the window divided by the time they span, so a
//! single long frame moves the estimate only a little.

use std::collections::VecDeque;
use tracing::trace;

/// Default window length (ms)
pub const DEFAULT_WINDOW_MS: f64 = 1000.0;

/// Minimum span before the meter reports a rate (ms)
const WARMUP_MS: f64 = 250.0;

/// Rolling frames-per-second meter
#[derive(Debug, Clone)]
pub struct FrameRateMeter {
    window_ms: f64,

    /// Frame timestamps, oldest first
    frames: VecDeque<f64>,

    /// Frames recorded since creation
    total_frames: u64,
}

impl Default for FrameRateMeter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

impl FrameRateMeter {
    /// Create a meter with the given window
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms: window_ms.max(WARMUP_MS),
            frames: VecDeque::with_capacity(128),
            total_frames: 0,
        }
    }

    /// Record a frame presented at `now_ms`
    ///
    /// Timestamps that go backwards are dropped.
    pub fn record_frame(&mut self, now_ms: f64) {
        if !now_ms.is_finite() {
            return;
        }
        if let Some(&last) = self.frames.back() {
            if now_ms < last {
                trace!("Frame timestamp went backwards: {} < {}", now_ms, last);
                return;
            }
        }

        self.frames.push_back(now_ms);
        self.total_frames += 1;

        let horizon = now_ms - self.window_ms;
        while self.frames.front().is_some_and(|&t| t < horizon) {
            self.frames.pop_front();
        }
    }

    /// Frames per second over the window, once warmed up
    pub fn fps(&self) -> Option<f32> {
        let (first, last) = (self.frames.front()?, self.frames.back()?);
        let span = last - first;
        if span < WARMUP_MS {
            return None;
        }
        let intervals = (self.frames.len() - 1) as f64;
        Some((intervals * 1000.0 / span) as f32)
    }

    /// Frames recorded since creation
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Forget the window (after a pause)
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}
