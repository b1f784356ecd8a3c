//! Custom cursor
//!
//! A ring and a dot follow the pointer through their own spring followers,
//! a trail of fading dots chases recent pointer positions, and the
//! interaction classifier picks the visual preset for the element under the
//! pointer.
//!
//! # Followers
//!
//! | Follower | Target | Default stiffness |
//! |----------|--------|-------------------|
//! | Ring | pointer, pulled toward magnetic elements | 150 |
//! | Dot | pointer | 800 |
//! | Trail dot `i` | `i`-th newest trail entry | 300 · falloff^i |
//!
//! All defaults are critically damped with unit mass.
//!
//! # Tick
//!
//! ```text
//! latest pointer sample
//!   └─> CursorLayer::track (ring/dot targets, pending trail push)
//!       └─> CursorLayer::step
//!           ├─> TrailBuffer (age, expire, push, capacity from tier)
//!           ├─> SpringFollower × (2 + trail capacity)
//!           └─> CursorLayer::render ─> RenderSink
//! ```

pub mod classifier;
pub mod preset;
pub mod spring;
pub mod trail;

pub use classifier::{
    classify_element, ClassRule, Classification, ClassifierConfig, InteractionClassifier,
    ModeTransition, ScanReport,
};
pub use preset::{CursorMode, CursorPreset, Rgba};
pub use spring::{SpringFollower, SpringProfile, TrackedPoint, SETTLE_EPSILON};
pub use trail::{TrailBuffer, TrailConfig, TrailEntry, TrailStats};

use crate::geometry::Position;
use crate::render::{RenderSink, RenderTarget, VisualStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Default trail capacity
pub const DEFAULT_TRAIL_CAPACITY: usize = 12;

/// Profile names understood in `follower_profiles`
pub const PROFILE_NAMES: [&str; 3] = ["ring", "dot", "trail"];

/// Cursor behaviour beyond the follower profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Scale multiplier while the primary button is held
    #[serde(default = "default_press_scale")]
    pub press_scale: f32,

    /// Fraction of the distance to a magnetic element's centre the ring is
    /// pulled by (0.0-1.0)
    #[serde(default = "default_magnetic_strength")]
    pub magnetic_strength: f32,
}

fn default_press_scale() -> f32 {
    0.8
}
fn default_magnetic_strength() -> f32 {
    0.3
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            press_scale: default_press_scale(),
            magnetic_strength: default_magnetic_strength(),
        }
    }
}

/// Resolved spring profiles for every follower kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerProfiles {
    /// Cursor ring
    pub ring: SpringProfile,
    /// Cursor dot
    pub dot: SpringProfile,
    /// Freshest trail dot; older dots are softened from this
    pub trail: SpringProfile,
}

impl Default for FollowerProfiles {
    fn default() -> Self {
        Self {
            ring: SpringProfile::critically_damped(150.0, 1.0),
            dot: SpringProfile::critically_damped(800.0, 1.0),
            trail: SpringProfile::critically_damped(300.0, 1.0),
        }
    }
}

impl FollowerProfiles {
    /// Default profiles keyed by name
    pub fn default_map() -> BTreeMap<String, SpringProfile> {
        let defaults = Self::default();
        BTreeMap::from([
            ("ring".to_string(), defaults.ring),
            ("dot".to_string(), defaults.dot),
            ("trail".to_string(), defaults.trail),
        ])
    }

    /// Resolve from a name → profile map, falling back per missing name
    pub fn from_map(map: &BTreeMap<String, SpringProfile>) -> Self {
        for name in map.keys() {
            if !PROFILE_NAMES.contains(&name.as_str()) {
                warn!("Ignoring unknown follower profile '{}'", name);
            }
        }

        let defaults = Self::default();
        Self {
            ring: map.get("ring").copied().unwrap_or(defaults.ring),
            dot: map.get("dot").copied().unwrap_or(defaults.dot),
            trail: map.get("trail").copied().unwrap_or(defaults.trail),
        }
    }
}

/// Cursor ring, dot and trail
pub struct CursorLayer {
    config: CursorConfig,
    ring: SpringFollower,
    dot: SpringFollower,

    /// One follower per configured trail slot, freshest first
    trail_dots: Vec<SpringFollower>,

    trail: TrailBuffer,

    /// Latest pointer position
    pointer: Option<Position>,

    /// A new sample arrived since the last step
    pending_sample: bool,
}

impl CursorLayer {
    /// Create the layer with every follower resting at `initial`
    pub fn new(
        config: CursorConfig,
        profiles: FollowerProfiles,
        trail_capacity: usize,
        trail_config: &TrailConfig,
        initial: Position,
    ) -> Self {
        let falloff = trail_config.falloff.clamp(0.01, 1.0);
        let trail_dots = (0..trail_capacity)
            .map(|i| SpringFollower::new(profiles.trail.softened(falloff.powi(i as i32)), initial))
            .collect();

        debug!(
            "Cursor layer created: {} trail dots, falloff {}",
            trail_capacity, falloff
        );

        Self {
            config,
            ring: SpringFollower::new(profiles.ring, initial),
            dot: SpringFollower::new(profiles.dot, initial),
            trail_dots,
            trail: TrailBuffer::new(
                trail_capacity,
                trail_config.min_distance_px,
                trail_config.max_age_ticks,
            ),
            pointer: None,
            pending_sample: false,
        }
    }

    /// Point the followers at a new pointer position
    ///
    /// `magnet` is the centre of the hovered magnetic element, if any.
    pub fn track(&mut self, pointer: Position, magnet: Option<Position>) {
        if !pointer.is_finite() {
            return;
        }

        let ring_target = match magnet {
            Some(centre) if centre.is_finite() => {
                pointer.lerp(centre, self.config.magnetic_strength.clamp(0.0, 1.0))
            }
            _ => pointer,
        };

        self.ring.set_target(ring_target);
        self.dot.set_target(pointer);
        self.pending_sample = self.pointer != Some(pointer) || self.pending_sample;
        self.pointer = Some(pointer);
    }

    /// Advance the trail and every follower
    ///
    /// With `animate == false` followers jump straight to their targets.
    /// Returns the number of followers that moved.
    pub fn step(&mut self, dt_ms: f32, animate: bool, trail_capacity: usize) -> usize {
        self.trail.set_capacity(trail_capacity);
        self.trail.tick();
        if std::mem::take(&mut self.pending_sample) {
            if let Some(pointer) = self.pointer {
                self.trail.push(pointer);
            }
        }

        let fallback = self.dot.target();
        let mut entries = self.trail.newest_first().map(|e| e.position);
        for follower in self.trail_dots.iter_mut() {
            follower.set_target(entries.next().unwrap_or(fallback));
        }

        let mut moved = 0;

        let active = self.trail.capacity();
        for (i, follower) in std::iter::once(&mut self.ring)
            .chain(std::iter::once(&mut self.dot))
            .chain(self.trail_dots.iter_mut())
            .enumerate()
        {
            // Slots beyond the tier's capacity are hidden; keep them parked
            let inactive_trail = i >= 2 && i - 2 >= active;
            if !animate || inactive_trail {
                if !follower.is_settled() {
                    follower.snap();
                    moved += 1;
                }
            } else if follower.step(dt_ms) {
                moved += 1;
            }
        }

        trace!(
            "Cursor step: {} followers moved, trail {}/{}",
            moved,
            self.trail.len(),
            self.trail.capacity()
        );
        moved
    }

    /// Write ring, dot and trail dots to the sink
    ///
    /// Returns the number of accepted writes.
    pub fn render(
        &self,
        sink: &mut dyn RenderSink,
        mode: CursorMode,
        visible: bool,
        pressed: bool,
        blur_enabled: bool,
    ) -> usize {
        let preset = mode.preset();
        let press = if pressed { self.config.press_scale } else { 1.0 };
        let shown = if visible { 1.0 } else { 0.0 };

        let ring = VisualStyle::at(self.ring.position())
            .scale(preset.ring_scale * press)
            .opacity(preset.ring_opacity * shown)
            .blur(if blur_enabled { preset.blur_px } else { 0.0 })
            .fill(preset.fill, preset.border_width);
        let dot = VisualStyle::at(self.dot.position())
            .scale(preset.dot_scale * press)
            .opacity(shown);

        let mut accepted = 0;
        accepted += sink.write(RenderTarget::CursorRing, &ring) as usize;
        accepted += sink.write(RenderTarget::CursorDot, &dot) as usize;

        let active = self.trail.capacity().max(1) as f32;
        let mut entries = self.trail.newest_first();
        for (i, follower) in self.trail_dots.iter().enumerate() {
            let opacity = match entries.next() {
                Some(entry) if visible => self.trail.opacity(entry),
                _ => 0.0,
            };
            let style = VisualStyle::at(follower.position())
                .scale(1.0 - 0.5 * (i as f32 / active).min(1.0))
                .opacity(opacity);
            accepted += sink.write(RenderTarget::TrailDot(i), &style) as usize;
        }

        accepted
    }

    /// Render targets owned by the layer
    pub fn targets(&self) -> Vec<RenderTarget> {
        let mut targets = vec![RenderTarget::CursorRing, RenderTarget::CursorDot];
        targets.extend((0..self.trail_dots.len()).map(RenderTarget::TrailDot));
        targets
    }

    /// Ring follower
    pub fn ring(&self) -> &SpringFollower {
        &self.ring
    }

    /// Dot follower
    pub fn dot(&self) -> &SpringFollower {
        &self.dot
    }

    /// Trail dot followers, freshest first
    pub fn trail_dots(&self) -> &[SpringFollower] {
        &self.trail_dots
    }

    /// Trail buffer
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Latest pointer position
    pub fn pointer(&self) -> Option<Position> {
        self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSink;

    fn layer(capacity: usize) -> CursorLayer {
        CursorLayer::new(
            CursorConfig::default(),
            FollowerProfiles::default(),
            capacity,
            &TrailConfig::default(),
            Position::ZERO,
        )
    }

    #[test]
    fn test_profile_map_fallback() {
        let mut map = BTreeMap::new();
        map.insert("dot".to_string(), SpringProfile::critically_damped(50.0, 1.0));
        map.insert("halo".to_string(), SpringProfile::default());
        let profiles = FollowerProfiles::from_map(&map);
        assert_eq!(profiles.dot.stiffness, 50.0);
        assert_eq!(profiles.ring, FollowerProfiles::default().ring);
    }

    #[test]
    fn test_trail_dots_progressively_softer() {
        let layer = layer(6);
        let rates: Vec<f32> = layer
            .trail_dots()
            .iter()
            .map(|f| f.profile().convergence_rate(16.0))
            .collect();
        assert!(rates.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_dot_leads_ring() {
        let mut layer = layer(4);
        layer.track(Position::new(200.0, 100.0), None);
        layer.step(16.0, true, 4);
        let target = Position::new(200.0, 100.0);
        assert!(layer.dot().position().distance_to(target) < layer.ring().position().distance_to(target));
    }

    #[test]
    fn test_magnetic_pull_shifts_ring_target() {
        let mut layer = layer(4);
        layer.track(Position::new(100.0, 100.0), Some(Position::new(200.0, 100.0)));
        assert!(layer.ring().target().distance_to(Position::new(130.0, 100.0)) < 1e-3);
        assert_eq!(layer.dot().target(), Position::new(100.0, 100.0));
    }

    #[test]
    fn test_stationary_pointer_pushes_once() {
        let mut layer = layer(8);
        layer.track(Position::new(50.0, 50.0), None);
        for _ in 0..5 {
            layer.track(Position::new(50.0, 50.0), None);
            layer.step(16.0, true, 8);
        }
        assert_eq!(layer.trail().len(), 1);
    }

    #[test]
    fn test_no_animation_snaps() {
        let mut layer = layer(4);
        layer.track(Position::new(300.0, 10.0), None);
        layer.step(16.0, false, 0);
        assert!(layer.ring().is_settled());
        assert!(layer.dot().is_settled());
        assert!(layer.trail().is_empty());
    }

    #[test]
    fn test_render_hides_when_pointer_outside() {
        let mut layer = layer(2);
        let mut sink = RecordingSink::new();
        layer.track(Position::new(10.0, 10.0), None);
        layer.step(16.0, true, 2);
        let writes = layer.render(&mut sink, CursorMode::Hover, false, false, true);
        assert_eq!(writes, 4);
        assert_eq!(sink.style(RenderTarget::CursorRing).unwrap().opacity, 0.0);
        assert_eq!(sink.style(RenderTarget::TrailDot(0)).unwrap().opacity, 0.0);
    }

    #[test]
    fn test_press_scales_ring() {
        let layer = layer(0);
        let mut sink = RecordingSink::new();
        layer.render(&mut sink, CursorMode::Default, true, true, false);
        let ring = sink.style(RenderTarget::CursorRing).unwrap();
        assert!((ring.scale - 0.8).abs() < 1e-6);
        assert_eq!(ring.blur_px, 0.0);
    }
}
