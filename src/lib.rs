//! # campus-motion
//!
//! Real-time motion core for a campus marketing site: a spring-smoothed
//! custom cursor with a fading trail, decorative scroll particles, and
//! scroll-driven content sequencing inside pinned sections, all throttled
//! by a frame-rate driven quality governor.
//!
//! # Architecture
//!
//! ```text
//! campus-motion
//!   ├─> Input Sampler (pointer / scroll, latest-value slots)
//!   ├─> Cursor (spring followers, trail buffer, interaction classifier)
//!   ├─> Particle Pool (scroll bursts, click bursts)
//!   ├─> Scroll Sequencer (pinned sections, crossfades, highlights)
//!   ├─> Performance Governor (quality tiers with hysteresis)
//!   └─> Render Sink (host surface, not owned by the core)
//! ```
//!
//! # Data Flow
//!
//! **Cursor Path:** Input Sampler → Spring Followers + Trail → Render Sink
//!
//! **Scroll Path:** Input Sampler → Scroll Sequencer → Render Sink
//!
//! **Feedback Path:** Frame timing → Governor → factors → every component
//!
//! The [`engine::MotionEngine`] owns all of it and is advanced by one
//! explicit tick, so the whole core runs without a browser in tests and in
//! the replay binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Motion configuration
pub mod config;

/// Custom cursor: presets, spring followers, trail, interaction classifier
pub mod cursor;

/// Element tree consumed by the interaction classifier
pub mod dom;

/// Mount, tick and teardown of the motion core
pub mod engine;

/// Viewport geometry
pub mod geometry;

/// Pointer and scroll sampling
pub mod input;

/// Decorative particle pool
///
/// Bounded pool of short-lived sparkles. Emission is probabilistic and
/// dropped, never queued, once the pool nears its cap.
pub mod particles;

/// Frame-rate measurement and quality tiers
///
/// The governor moves one tier at a time, only after a threshold breach
/// has been held for the sustain window. Reduced motion and constrained
/// networks pin the reduced tier.
pub mod performance;

/// Render sink abstraction
pub mod render;

/// Trace replay, offline and on the wall clock
pub mod replay;

/// Async frame driver on tokio
pub mod runtime;

/// Pinned scroll sections and frame sequencing
pub mod scroll;

/// Metrics and user-facing error formatting
pub mod utils;
