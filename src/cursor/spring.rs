//! Spring Follower
//!
//! Per-point critically damped filter. Each follower lags its target with
//! an exponential-decay update:
//!
//! ```text
//! filtered += (target - filtered) * rate
//! rate      = 1 - exp(-λ · dt)
//! ```
//!
//! λ is the slow pole of the second-order system described by the
//! follower's mass, stiffness and damping. Damping ratios below 1 are
//! clamped to 1 so the follower never overshoots:
//!
//! ```text
//! ωn = sqrt(k / m)
//! ζ  = max(c / (2·sqrt(k·m)), 1)
//! λ  = ωn · (ζ - sqrt(ζ² - 1))
//! ```

use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Distance below which a follower counts as settled (px)
pub const SETTLE_EPSILON: f32 = 0.01;

/// Mass/stiffness/damping parameters of one follower
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringProfile {
    /// Damping coefficient c
    pub damping: f32,
    /// Stiffness k
    pub stiffness: f32,
    /// Mass m
    pub mass: f32,
}

impl Default for SpringProfile {
    fn default() -> Self {
        Self::critically_damped(150.0, 1.0)
    }
}

impl SpringProfile {
    /// Profile with damping ratio exactly 1
    pub fn critically_damped(stiffness: f32, mass: f32) -> Self {
        Self {
            damping: 2.0 * (stiffness * mass).sqrt(),
            stiffness,
            mass,
        }
    }

    /// Check that all parameters are finite and positive
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("damping", self.damping),
            ("stiffness", self.stiffness),
            ("mass", self.mass),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be a positive number, got {}", name, value));
            }
        }
        Ok(())
    }

    /// Damping ratio ζ
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Decay rate λ (1/s)
    pub fn decay_rate(&self) -> f32 {
        let natural = (self.stiffness / self.mass).sqrt();
        // Ratios within rounding of 1 are treated as exactly critical
        let zeta = self.damping_ratio();
        let zeta = if zeta < 1.0 + 1e-4 { 1.0 } else { zeta };
        natural * (zeta - (zeta * zeta - 1.0).sqrt())
    }

    /// Fraction of the remaining distance covered in `dt_ms`
    ///
    /// Lies in (0, 1] for any positive interval; 0 for a non-positive one.
    pub fn convergence_rate(&self, dt_ms: f32) -> f32 {
        if dt_ms <= 0.0 || !dt_ms.is_finite() {
            return 0.0;
        }
        let rate = 1.0 - (-self.decay_rate() * dt_ms / 1000.0).exp();
        rate.clamp(f32::MIN_POSITIVE, 1.0)
    }

    /// Softer copy with the same damping ratio
    ///
    /// Stiffness scales by `factor`, damping by `sqrt(factor)`, so the decay
    /// rate scales by `sqrt(factor)`.
    pub fn softened(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.01, 1.0);
        Self {
            damping: self.damping * factor.sqrt(),
            stiffness: self.stiffness * factor,
            mass: self.mass,
        }
    }
}

/// Target and filtered position of one visual follower
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedPoint {
    /// Position the follower is chasing (written by input)
    pub target: Position,
    /// Smoothed position (written each tick)
    pub filtered: Position,
}

impl TrackedPoint {
    /// Point resting at `position`
    pub fn at(position: Position) -> Self {
        Self {
            target: position,
            filtered: position,
        }
    }

    /// Remaining distance to the target
    pub fn distance_to_target(&self) -> f32 {
        self.filtered.distance_to(self.target)
    }
}

/// Spring follower
#[derive(Debug, Clone)]
pub struct SpringFollower {
    profile: SpringProfile,
    point: TrackedPoint,
}

impl SpringFollower {
    /// Create a follower resting at `initial`
    pub fn new(profile: SpringProfile, initial: Position) -> Self {
        Self {
            profile,
            point: TrackedPoint::at(initial),
        }
    }

    /// Set the target position
    pub fn set_target(&mut self, target: Position) {
        if target.is_finite() {
            self.point.target = target;
        }
    }

    /// Advance by `dt_ms`; returns whether the filtered position moved
    pub fn step(&mut self, dt_ms: f32) -> bool {
        let distance = self.point.distance_to_target();
        if distance < SETTLE_EPSILON {
            return false;
        }

        let rate = self.profile.convergence_rate(dt_ms);
        if rate <= 0.0 {
            return false;
        }

        self.point.filtered = self.point.filtered.lerp(self.point.target, rate);

        trace!(
            "Follower step: dt={:.2}ms rate={:.3} distance {:.2} -> {:.2}",
            dt_ms,
            rate,
            distance,
            self.point.distance_to_target()
        );
        true
    }

    /// Jump straight to the target
    pub fn snap(&mut self) {
        self.point.filtered = self.point.target;
    }

    /// Place the follower at `position` with no lag
    pub fn reset(&mut self, position: Position) {
        self.point = TrackedPoint::at(position);
    }

    /// Filtered position
    pub fn position(&self) -> Position {
        self.point.filtered
    }

    /// Current target
    pub fn target(&self) -> Position {
        self.point.target
    }

    /// Tracked point state
    pub fn point(&self) -> TrackedPoint {
        self.point
    }

    /// Profile in use
    pub fn profile(&self) -> SpringProfile {
        self.profile
    }

    /// Within [`SETTLE_EPSILON`] of the target
    pub fn is_settled(&self) -> bool {
        self.point.distance_to_target() < SETTLE_EPSILON
    }
}
