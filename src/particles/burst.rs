//! Scroll burst tracker
//!
//! Turns scroll velocity into an emission multiplier in `[0, 1]`. Fast
//! scrolling raises the level immediately; once scrolling slows or stops the
//! level tapers linearly to zero over the cooldown window instead of
//! dropping at once.

use tracing::trace;

/// Scroll activity level with cooldown
#[derive(Debug, Clone)]
pub struct ScrollBurst {
    /// Scroll speed that maps to full activity (px/s)
    reference_velocity: f32,

    /// Taper duration after the last peak (ms)
    cooldown_ms: f64,

    /// Level at `peak_ms`
    level: f32,

    /// When `level` was last raised (ms)
    peak_ms: f64,
}

impl ScrollBurst {
    /// Create a tracker
    pub fn new(reference_velocity: f32, cooldown_ms: f64) -> Self {
        Self {
            reference_velocity: reference_velocity.max(1.0),
            cooldown_ms: cooldown_ms.max(1.0),
            level: 0.0,
            peak_ms: 0.0,
        }
    }

    /// Feed a scroll velocity sample (px/s)
    pub fn observe(&mut self, velocity: f32, now_ms: f64) {
        if !velocity.is_finite() {
            return;
        }
        let sample = (velocity.abs() / self.reference_velocity).clamp(0.0, 1.0);
        if sample >= self.activity(now_ms) {
            trace!("Scroll burst level {:.2} at {:.1}ms", sample, now_ms);
            self.level = sample;
            self.peak_ms = now_ms;
        }
    }

    /// Activity level at `now_ms`
    pub fn activity(&self, now_ms: f64) -> f32 {
        let elapsed = (now_ms - self.peak_ms).max(0.0);
        let remaining = (1.0 - elapsed / self.cooldown_ms).max(0.0) as f32;
        self.level * remaining
    }

    /// Drop any pending activity
    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
