//! Performance governance
//!
//! This module contains the feedback loop that keeps the motion effects
//! inside the frame budget:
//! - **Frame rate meter**: rolling one-second FPS estimate from frame timestamps
//! - **Performance governor**: quality tiers with hysteresis, forced `Reduced`
//!   tier for reduced-motion users and constrained networks
//!
//! # Architecture
//!
//! ```text
//! Frame tick
//!   └─> FrameRateMeter (record frame)
//!       └─> PerformanceGovernor (fps + memory → tier)
//!           └─> QualityFactors
//!               ├─> time scale      → followers, transitions, particles
//!               ├─> trail scale     → trail capacity
//!               ├─> emission factor → particle pool
//!               └─> blur flag       → cursor presets
//! ```
//!
//! The tier is the only state shared across components. It is written by
//! the governor once per tick, before anything reads it.

mod fps;
mod governor;

pub use fps::{FrameRateMeter, DEFAULT_WINDOW_MS};
pub use governor::{
    GovernorConfig, GovernorStats, NetworkQuality, PerformanceGovernor, QualityFactors,
    QualityTier, TierChange, TierChangeReason, TierThresholds,
};

/// Time scale multiplier while the document is hidden
pub const HIDDEN_TIME_SCALE: f32 = 1e-3;
