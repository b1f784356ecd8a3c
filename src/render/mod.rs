//! Render sink
//!
//! The motion core never touches the document directly. Every visual update
//! goes through a [`RenderSink`] as a `(target, style)` pair, where the style
//! is the complete transform/opacity state of one render target.
//!
//! Targets can be detached by the page at any moment. A sink reports that
//! with `false` and the core carries on; nothing here is an error.
//!
//! # Targets
//!
//! | Target | Owner | Lifetime |
//! |--------|-------|----------|
//! | `CursorRing`, `CursorDot` | cursor layer | mount → teardown |
//! | `TrailDot(i)` | cursor layer | mount → teardown |
//! | `Particle(id)` | particle pool | emission → expiry |
//! | `Frame { section, index }` | scroll sequencer | mount → teardown |

use crate::cursor::Rgba;
use crate::geometry::Position;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Render target handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RenderTarget {
    /// Outer cursor ring
    CursorRing,
    /// Inner cursor dot
    CursorDot,
    /// Trail dot, 0 is the freshest
    TrailDot(usize),
    /// Decorative particle
    Particle(u64),
    /// Content frame of a pinned scroll section
    Frame {
        /// Section index
        section: usize,
        /// Frame index within the section
        index: usize,
    },
}

impl std::fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CursorRing => write!(f, "cursor-ring"),
            Self::CursorDot => write!(f, "cursor-dot"),
            Self::TrailDot(i) => write!(f, "trail-dot-{}", i),
            Self::Particle(id) => write!(f, "particle-{}", id),
            Self::Frame { section, index } => write!(f, "frame-{}-{}", section, index),
        }
    }
}

/// Complete visual state of one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualStyle {
    /// Translation (px)
    pub translate: Position,
    /// Uniform scale
    pub scale: f32,
    /// Opacity (0.0-1.0)
    pub opacity: f32,
    /// Backdrop blur (px)
    pub blur_px: f32,
    /// Fill colour
    pub fill: Rgba,
    /// Border width (px)
    pub border_width: f32,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self::at(Position::ZERO)
    }
}

impl VisualStyle {
    /// Fully opaque, unscaled style at `translate`
    pub fn at(translate: Position) -> Self {
        Self {
            translate,
            scale: 1.0,
            opacity: 1.0,
            blur_px: 0.0,
            fill: Rgba::TRANSPARENT,
            border_width: 0.0,
        }
    }

    /// Builder: set scale
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: set opacity (clamped)
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Builder: set blur
    pub fn blur(mut self, blur_px: f32) -> Self {
        self.blur_px = blur_px;
        self
    }

    /// Builder: set fill and border
    pub fn fill(mut self, fill: Rgba, border_width: f32) -> Self {
        self.fill = fill;
        self.border_width = border_width;
        self
    }

    /// Target is invisible
    pub fn is_hidden(&self) -> bool {
        self.opacity <= 0.0 || self.scale <= 0.0
    }
}

/// Surface the motion core writes visual state to
pub trait RenderSink {
    /// Apply a style; `false` if the target is detached
    fn write(&mut self, target: RenderTarget, style: &VisualStyle) -> bool;

    /// Drop a target; `false` if it was never written or is already gone
    fn release(&mut self, target: RenderTarget) -> bool;

    /// Update the cursor caption
    fn set_caption(&mut self, _text: Option<&str>) {}

    /// Reveal the first `count` highlights of a frame
    fn set_highlights(&mut self, _section: usize, _index: usize, _count: usize) {}
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn write(&mut self, _target: RenderTarget, _style: &VisualStyle) -> bool {
        true
    }

    fn release(&mut self, _target: RenderTarget) -> bool {
        true
    }
}

/// Sink that keeps the last style per target
///
/// Used by tests and by the replay binary to inspect what the core drew.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    styles: HashMap<RenderTarget, VisualStyle>,
    detached: HashSet<RenderTarget>,
    caption: Option<String>,
    highlights: HashMap<(usize, usize), usize>,
    writes: u64,
    rejected: u64,
    releases: u64,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the page removing a target
    pub fn detach(&mut self, target: RenderTarget) {
        self.styles.remove(&target);
        self.detached.insert(target);
    }

    /// Last style written to a live target
    pub fn style(&self, target: RenderTarget) -> Option<&VisualStyle> {
        self.styles.get(&target)
    }

    /// Live targets
    pub fn targets(&self) -> impl Iterator<Item = &RenderTarget> {
        self.styles.keys()
    }

    /// Number of live targets
    pub fn live_targets(&self) -> usize {
        self.styles.len()
    }

    /// Live particle targets
    pub fn live_particles(&self) -> usize {
        self.styles
            .keys()
            .filter(|t| matches!(t, RenderTarget::Particle(_)))
            .count()
    }

    /// Current caption
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Revealed highlight count for a frame
    pub fn highlights(&self, section: usize, index: usize) -> usize {
        self.highlights.get(&(section, index)).copied().unwrap_or(0)
    }

    /// Accepted writes
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Writes refused because the target was detached
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Successful releases
    pub fn releases(&self) -> u64 {
        self.releases
    }
}

impl RenderSink for RecordingSink {
    fn write(&mut self, target: RenderTarget, style: &VisualStyle) -> bool {
        if self.detached.contains(&target) {
            self.rejected += 1;
            return false;
        }
        self.styles.insert(target, *style);
        self.writes += 1;
        true
    }

    fn release(&mut self, target: RenderTarget) -> bool {
        if self.styles.remove(&target).is_some() {
            self.releases += 1;
            true
        } else {
            false
        }
    }

    fn set_caption(&mut self, text: Option<&str>) {
        self.caption = text.map(str::to_string);
    }

    fn set_highlights(&mut self, section: usize, index: usize, count: usize) {
        self.highlights.insert((section, index), count);
    }
}
