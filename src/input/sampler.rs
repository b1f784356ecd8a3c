//! Input Sampler
//!
//! Normalizes pointer and scroll events into a position/velocity stream.
//! Each stream has a single "latest" slot that the frame loop reads once per
//! tick; a newer sample simply overwrites an unread one.

use crate::geometry::Position;
use crate::input::coordinates::{CoordinateNormalizer, CoordinateSpace, Viewport};
use crate::input::error::{InputError, Result};
use tracing::{debug, trace};

/// Normalized pointer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Viewport position
    pub position: Position,
    /// Instantaneous velocity (pixels/second)
    pub velocity: Position,
    /// Monotonic timestamp (ms)
    pub timestamp_ms: f64,
}

impl PointerSample {
    /// Magnitude of the velocity
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Scroll position sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Document scroll offset (pixels)
    pub offset: f32,
    /// Instantaneous scroll velocity (pixels/second, signed)
    pub velocity: f32,
    /// Monotonic timestamp (ms)
    pub timestamp_ms: f64,
}

/// Sampler statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplerStats {
    /// Samples written into a latest slot
    pub accepted: u64,
    /// Samples dropped because they were malformed
    pub rejected: u64,
}

/// Input sampler
pub struct InputSampler {
    /// Pointer subsystem enabled (fine pointer present)
    pointer_enabled: bool,

    normalizer: CoordinateNormalizer,

    /// Last-write-wins pointer slot
    latest_pointer: Option<PointerSample>,

    /// Last-write-wins scroll slot
    latest_scroll: Option<ScrollSample>,

    /// Pointer currently inside the viewport
    pointer_visible: bool,

    /// Primary button held
    pressed: bool,

    stats: SamplerStats,
}

impl InputSampler {
    /// Create a sampler for the given viewport
    ///
    /// When `pointer_supported` is false (touch-only device) pointer samples
    /// are refused; scroll sampling keeps working.
    pub fn new(viewport: Viewport, pointer_supported: bool) -> Result<Self> {
        let normalizer = CoordinateNormalizer::new(viewport)?;
        if !pointer_supported {
            debug!("No fine pointer detected, pointer sampling disabled");
        }

        Ok(Self {
            pointer_enabled: pointer_supported,
            normalizer,
            latest_pointer: None,
            latest_scroll: None,
            pointer_visible: false,
            pressed: false,
            stats: SamplerStats::default(),
        })
    }

    /// Record a pointer move
    pub fn record_pointer(
        &mut self,
        x: f32,
        y: f32,
        space: CoordinateSpace,
        timestamp_ms: f64,
    ) -> Result<PointerSample> {
        if !self.pointer_enabled {
            return Err(InputError::PointerDisabled);
        }

        let sample = self
            .build_pointer_sample(x, y, space, timestamp_ms)
            .inspect_err(|_| self.stats.rejected += 1)?;

        trace!(
            "Pointer sample: pos=({:.1}, {:.1}), vel=({:.1}, {:.1})",
            sample.position.x,
            sample.position.y,
            sample.velocity.x,
            sample.velocity.y
        );

        self.latest_pointer = Some(sample);
        self.pointer_visible = true;
        self.stats.accepted += 1;
        Ok(sample)
    }

    fn build_pointer_sample(
        &self,
        x: f32,
        y: f32,
        space: CoordinateSpace,
        timestamp_ms: f64,
    ) -> Result<PointerSample> {
        if !timestamp_ms.is_finite() {
            return Err(InputError::InvalidTimestamp(timestamp_ms));
        }
        let position = self.normalizer.normalize(x, y, space)?;

        let velocity = match self.latest_pointer {
            Some(prev) => {
                let dt_ms = timestamp_ms - prev.timestamp_ms;
                if dt_ms < 0.0 {
                    return Err(InputError::TimestampRegression {
                        previous: prev.timestamp_ms,
                        current: timestamp_ms,
                    });
                }
                if dt_ms == 0.0 {
                    prev.velocity
                } else {
                    (position - prev.position) * (1000.0 / dt_ms as f32)
                }
            }
            None => Position::ZERO,
        };

        Ok(PointerSample {
            position,
            velocity,
            timestamp_ms,
        })
    }

    /// Record a scroll offset
    pub fn record_scroll(&mut self, offset: f32, timestamp_ms: f64) -> Result<ScrollSample> {
        if !offset.is_finite() {
            self.stats.rejected += 1;
            return Err(InputError::InvalidCoordinate(0.0, offset));
        }
        if !timestamp_ms.is_finite() {
            self.stats.rejected += 1;
            return Err(InputError::InvalidTimestamp(timestamp_ms));
        }

        let velocity = match self.latest_scroll {
            Some(prev) => {
                let dt_ms = timestamp_ms - prev.timestamp_ms;
                if dt_ms < 0.0 {
                    self.stats.rejected += 1;
                    return Err(InputError::TimestampRegression {
                        previous: prev.timestamp_ms,
                        current: timestamp_ms,
                    });
                }
                if dt_ms == 0.0 {
                    prev.velocity
                } else {
                    (offset - prev.offset) * (1000.0 / dt_ms as f32)
                }
            }
            None => 0.0,
        };

        let sample = ScrollSample {
            offset,
            velocity,
            timestamp_ms,
        };
        self.latest_scroll = Some(sample);
        self.stats.accepted += 1;
        Ok(sample)
    }

    /// Pointer crossed the viewport boundary (over/out with no related target)
    pub fn set_pointer_in_viewport(&mut self, inside: bool) {
        if self.pointer_visible != inside {
            debug!("Pointer {} viewport", if inside { "entered" } else { "left" });
        }
        self.pointer_visible = inside;
    }

    /// Primary button state change
    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Apply a viewport resize
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        self.normalizer.resize(viewport)
    }

    /// Latest pointer sample
    pub fn latest_pointer(&self) -> Option<PointerSample> {
        self.latest_pointer
    }

    /// Latest scroll sample
    pub fn latest_scroll(&self) -> Option<ScrollSample> {
        self.latest_scroll
    }

    /// Is the pointer inside the viewport
    pub fn is_pointer_visible(&self) -> bool {
        self.pointer_enabled && self.pointer_visible
    }

    /// Is the primary button held
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Is pointer sampling enabled
    pub fn is_pointer_enabled(&self) -> bool {
        self.pointer_enabled
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.normalizer.viewport()
    }

    /// Sampler statistics
    pub fn stats(&self) -> SamplerStats {
        self.stats
    }
}
