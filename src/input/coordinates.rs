//! Coordinate Normalization
//!
//! Converts raw event coordinates into viewport pixel coordinates. Sources
//! that report device pixels are divided by the device pixel ratio; every
//! accepted point is clamped to the viewport bounds.

use crate::geometry::Position;
use crate::input::error::{InputError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Viewport description used for normalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Viewport width in CSS pixels
    pub width: f32,
    /// Viewport height in CSS pixels
    pub height: f32,
    /// Device pixels per CSS pixel
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Validate viewport dimensions
    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(InputError::InvalidViewport(self.width, self.height));
        }
        if !(self.device_pixel_ratio > 0.0 && self.device_pixel_ratio.is_finite()) {
            return Err(InputError::InvalidPixelRatio(self.device_pixel_ratio));
        }
        Ok(())
    }
}

/// Coordinate space of an incoming event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSpace {
    /// CSS pixels relative to the viewport (clientX/clientY)
    #[default]
    Client,
    /// Physical device pixels
    Device,
}

/// Normalizes event coordinates into viewport positions
#[derive(Debug, Clone)]
pub struct CoordinateNormalizer {
    viewport: Viewport,
}

impl CoordinateNormalizer {
    /// Create a normalizer for the given viewport
    pub fn new(viewport: Viewport) -> Result<Self> {
        viewport.validate()?;
        Ok(Self { viewport })
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Apply a resize; invalid sizes are rejected and the old viewport kept
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        viewport.validate()?;
        debug!(
            "Viewport resized: {}x{} @{} -> {}x{} @{}",
            self.viewport.width,
            self.viewport.height,
            self.viewport.device_pixel_ratio,
            viewport.width,
            viewport.height,
            viewport.device_pixel_ratio
        );
        self.viewport = viewport;
        Ok(())
    }

    /// Normalize a raw point into a clamped viewport position
    pub fn normalize(&self, x: f32, y: f32, space: CoordinateSpace) -> Result<Position> {
        if !x.is_finite() || !y.is_finite() {
            return Err(InputError::InvalidCoordinate(x, y));
        }

        let (x, y) = match space {
            CoordinateSpace::Client => (x, y),
            CoordinateSpace::Device => (
                x / self.viewport.device_pixel_ratio,
                y / self.viewport.device_pixel_ratio,
            ),
        };

        Ok(Position::new(
            x.clamp(0.0, self.viewport.width),
            y.clamp(0.0, self.viewport.height),
        ))
    }
}
