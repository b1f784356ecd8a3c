//! Configuration management
//!
//! Handles loading and validation of the motion configuration from:
//! - TOML files
//! - CLI overrides
//!
//! Every field has a default, so an empty file is a valid configuration.
//! The numeric defaults are tuned by eye for a 60 Hz display rather than
//! derived from a frame budget.
//!
//! ```toml
//! trail_capacity = 16
//! reduced_motion = false
//!
//! [follower_profiles.ring]
//! stiffness = 150.0
//! damping = 24.5
//! mass = 1.0
//!
//! [tier_thresholds]
//! fps_low = 30.0
//! fps_high = 50.0
//! sustain_ms = 1000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub mod types;

pub use types::{RuntimeConfig, ScrollConfig};

use crate::cursor::{
    ClassifierConfig, CursorConfig, FollowerProfiles, SpringProfile, TrailConfig,
    DEFAULT_TRAIL_CAPACITY,
};
use crate::engine::MotionError;
use crate::particles::ParticleConfig;
use crate::performance::{GovernorConfig, TierThresholds};

/// Largest accepted trail capacity
pub const MAX_TRAIL_CAPACITY: usize = 64;

/// Motion engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Maximum trail length
    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,

    /// Spring profile per follower (`ring`, `dot`, `trail`)
    #[serde(default = "FollowerProfiles::default_map")]
    pub follower_profiles: BTreeMap<String, SpringProfile>,

    /// Quality tier thresholds
    #[serde(default)]
    pub tier_thresholds: TierThresholds,

    /// Force the reduced tier regardless of the host preference
    #[serde(default)]
    pub reduced_motion: bool,

    /// Trail behaviour
    #[serde(default)]
    pub trail: TrailConfig,

    /// Cursor behaviour
    #[serde(default)]
    pub cursor: CursorConfig,

    /// Particle pool
    #[serde(default)]
    pub particles: ParticleConfig,

    /// Interaction classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Scroll sections
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Performance governor
    #[serde(default)]
    pub governor: GovernorConfig,

    /// Async frame driver
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

fn default_trail_capacity() -> usize {
    DEFAULT_TRAIL_CAPACITY
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            trail_capacity: default_trail_capacity(),
            follower_profiles: FollowerProfiles::default_map(),
            tier_thresholds: TierThresholds::default(),
            reduced_motion: false,
            trail: TrailConfig::default(),
            cursor: CursorConfig::default(),
            particles: ParticleConfig::default(),
            classifier: ClassifierConfig::default(),
            scroll: ScrollConfig::default(),
            governor: GovernorConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl MotionConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MotionConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), MotionError> {
        if self.trail_capacity == 0 || self.trail_capacity > MAX_TRAIL_CAPACITY {
            return Err(MotionError::config(format!(
                "trail_capacity must be between 1 and {}, got {}",
                MAX_TRAIL_CAPACITY, self.trail_capacity
            )));
        }

        for (name, profile) in &self.follower_profiles {
            profile
                .validate()
                .map_err(|e| MotionError::config(format!("follower profile '{}': {}", name, e)))?;
        }

        self.tier_thresholds
            .validate()
            .map_err(|e| MotionError::config(format!("tier_thresholds: {}", e)))?;

        self.particles
            .validate()
            .map_err(|e| MotionError::config(format!("particles: {}", e)))?;

        if !(self.trail.falloff > 0.0 && self.trail.falloff <= 1.0) {
            return Err(MotionError::config(format!(
                "trail.falloff must be within (0, 1], got {}",
                self.trail.falloff
            )));
        }

        if !(self.cursor.press_scale.is_finite() && self.cursor.press_scale > 0.0) {
            return Err(MotionError::config(format!(
                "cursor.press_scale must be positive, got {}",
                self.cursor.press_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.cursor.magnetic_strength) {
            return Err(MotionError::config(format!(
                "cursor.magnetic_strength must be within 0..1, got {}",
                self.cursor.magnetic_strength
            )));
        }

        if self.classifier.max_depth == 0 || self.classifier.rescan_interval_ms == 0 {
            return Err(MotionError::config(
                "classifier.max_depth and classifier.rescan_interval_ms must be greater than 0",
            ));
        }

        let sequencer = &self.scroll.sequencer;
        if !(sequencer.transition_ms.is_finite() && sequencer.transition_ms >= 0.0) {
            return Err(MotionError::config(format!(
                "scroll.transition_ms must be non-negative, got {}",
                sequencer.transition_ms
            )));
        }
        if !(0.0..=1.0).contains(&sequencer.inactive_scale) {
            return Err(MotionError::config(format!(
                "scroll.inactive_scale must be within 0..1, got {}",
                sequencer.inactive_scale
            )));
        }

        if !(self.governor.memory_high_ratio > 0.0 && self.governor.memory_high_ratio <= 1.0) {
            return Err(MotionError::config(format!(
                "governor.memory_high_ratio must be within (0, 1], got {}",
                self.governor.memory_high_ratio
            )));
        }

        if !(self.runtime.frame_interval_ms.is_finite() && self.runtime.frame_interval_ms > 0.0) {
            return Err(MotionError::config(format!(
                "runtime.frame_interval_ms must be positive, got {}",
                self.runtime.frame_interval_ms
            )));
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, reduced_motion: bool, seed: Option<u64>) -> Self {
        if reduced_motion {
            self.reduced_motion = true;
        }
        if seed.is_some() {
            self.particles.seed = seed;
        }
        self
    }

    /// Resolved follower profiles
    pub fn follower_profiles(&self) -> FollowerProfiles {
        FollowerProfiles::from_map(&self.follower_profiles)
    }
}
