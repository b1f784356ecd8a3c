//! Performance Governor
//!
//! Moves between quality tiers based on measured frame rate and memory
//! pressure, and derives the multiplicative factors every other component
//! consumes.
//!
//! # Tiers
//!
//! | Tier | Time scale | Trail | Emission | Blur | Animation |
//! |------|-----------|-------|----------|------|-----------|
//! | High | 1.0 | 100% | 1.0 | yes | yes |
//! | Medium | 0.85 | 70% | 0.5 | yes | yes |
//! | Low | 0.7 | 50% | 0.25 | no | yes |
//! | Reduced | 1.0 | 0% | 0.0 | no | no (instant) |
//!
//! The time scale stretches every animation clock (springs, particle
//! physics, crossfades) so a struggling frame loop has fewer large jumps to
//! draw. `Reduced` keeps 1.0 since nothing animates there.
//!
//! # Hysteresis
//!
//! A downgrade needs the frame rate below `fps_low` (or memory above
//! `memory_high_ratio`) continuously for `sustain_ms`; an upgrade needs it
//! above `fps_high` for the same duration. After every step the timer
//! restarts, so each further step needs another full window. Samples
//! between the two thresholds reset both timers.
//!
//! The automatic path never goes below `min_auto_tier`. `Reduced` is only
//! entered through the reduced-motion preference or a constrained network,
//! and is held for as long as either signal is present.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Quality tier, ordered from best to most degraded
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Full effects
    #[default]
    High,
    /// Shorter trail, fewer particles
    Medium,
    /// Minimal trail and particles, no blur
    Low,
    /// No motion at all
    Reduced,
}

impl QualityTier {
    /// One step more degraded (saturating)
    pub fn degraded(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low | Self::Reduced => Self::Reduced,
        }
    }

    /// One step better (saturating)
    pub fn upgraded(self) -> Self {
        match self {
            Self::High | Self::Medium => Self::High,
            Self::Low => Self::Medium,
            Self::Reduced => Self::Low,
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "Full trail, particles and blur",
            Self::Medium => "Shorter trail, half the particles",
            Self::Low => "Minimal trail and particles, no blur",
            Self::Reduced => "Static presentation, no motion",
        }
    }

    /// Factors for this tier
    pub fn factors(&self) -> QualityFactors {
        match self {
            Self::High => QualityFactors {
                time_scale: 1.0,
                trail_scale: 1.0,
                emission_probability: 1.0,
                blur_enabled: true,
                animations_enabled: true,
            },
            Self::Medium => QualityFactors {
                time_scale: 0.85,
                trail_scale: 0.7,
                emission_probability: 0.5,
                blur_enabled: true,
                animations_enabled: true,
            },
            Self::Low => QualityFactors {
                time_scale: 0.7,
                trail_scale: 0.5,
                emission_probability: 0.25,
                blur_enabled: false,
                animations_enabled: true,
            },
            Self::Reduced => QualityFactors {
                time_scale: 1.0,
                trail_scale: 0.0,
                emission_probability: 0.0,
                blur_enabled: false,
                animations_enabled: false,
            },
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
            Self::Reduced => write!(f, "Reduced"),
        }
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "full" => Ok(Self::High),
            "medium" | "balanced" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "reduced" | "off" | "none" => Ok(Self::Reduced),
            _ => Err(format!("Unknown quality tier: {}", s)),
        }
    }
}

/// Multiplicative factors derived from the active tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityFactors {
    /// Global animation time scale
    pub time_scale: f32,
    /// Fraction of the configured trail capacity in use
    pub trail_scale: f32,
    /// Particle emission probability multiplier
    pub emission_probability: f32,
    /// Blur and other expensive filters
    pub blur_enabled: bool,
    /// Followers animate (false = snap, transitions instant)
    pub animations_enabled: bool,
}

impl Default for QualityFactors {
    fn default() -> Self {
        QualityTier::High.factors()
    }
}

impl QualityFactors {
    /// Effective trail capacity for a configured maximum
    pub fn trail_capacity(&self, max: usize) -> usize {
        ((max as f32 * self.trail_scale).ceil() as usize).min(max)
    }

    /// Copy with the time scale multiplied by `factor`
    pub fn scaled_time(mut self, factor: f32) -> Self {
        self.time_scale *= factor;
        self
    }
}

/// Network quality signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkQuality {
    /// No signal available
    #[default]
    Unknown,
    /// Normal connection
    Normal,
    /// Slow link or data saver
    Constrained,
}

impl NetworkQuality {
    /// Forces the reduced tier
    pub fn is_constrained(&self) -> bool {
        matches!(self, Self::Constrained)
    }
}

impl std::str::FromStr for NetworkQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "unknown" => Ok(Self::Unknown),
            "4g" | "3g" | "normal" | "fast" => Ok(Self::Normal),
            "2g" | "slow-2g" | "save-data" | "slow" | "constrained" => Ok(Self::Constrained),
            _ => Err(format!("Unknown network quality: {}", s)),
        }
    }
}

/// FPS thresholds and sustain window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Downgrade below this rate
    #[serde(default = "default_fps_low")]
    pub fps_low: f32,

    /// Upgrade above this rate
    #[serde(default = "default_fps_high")]
    pub fps_high: f32,

    /// How long a breach must last (ms)
    #[serde(default = "default_sustain_ms")]
    pub sustain_ms: u64,
}

fn default_fps_low() -> f32 {
    30.0
}
fn default_fps_high() -> f32 {
    50.0
}
fn default_sustain_ms() -> u64 {
    1000
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            fps_low: default_fps_low(),
            fps_high: default_fps_high(),
            sustain_ms: default_sustain_ms(),
        }
    }
}

impl TierThresholds {
    /// Check ordering and ranges
    pub fn validate(&self) -> Result<(), String> {
        if !self.fps_low.is_finite() || self.fps_low <= 0.0 {
            return Err(format!("fps_low must be positive, got {}", self.fps_low));
        }
        if !self.fps_high.is_finite() || self.fps_low >= self.fps_high {
            return Err(format!(
                "fps_low ({}) must be below fps_high ({})",
                self.fps_low, self.fps_high
            ));
        }
        if self.sustain_ms == 0 {
            return Err("sustain_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Governor tuning beyond the thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Heap usage ratio treated like a low frame rate
    #[serde(default = "default_memory_high_ratio")]
    pub memory_high_ratio: f32,

    /// Most degraded tier the automatic path may reach
    #[serde(default = "default_min_auto_tier")]
    pub min_auto_tier: QualityTier,

    /// Tier at mount
    #[serde(default)]
    pub initial_tier: QualityTier,

    /// FPS window (ms)
    #[serde(default = "default_window_ms")]
    pub window_ms: f64,
}

fn default_memory_high_ratio() -> f32 {
    0.9
}
fn default_min_auto_tier() -> QualityTier {
    QualityTier::Low
}
fn default_window_ms() -> f64 {
    super::fps::DEFAULT_WINDOW_MS
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            memory_high_ratio: default_memory_high_ratio(),
            min_auto_tier: default_min_auto_tier(),
            initial_tier: QualityTier::default(),
            window_ms: default_window_ms(),
        }
    }
}

/// Why the tier changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierChangeReason {
    /// Sustained low frame rate or memory pressure
    Degraded,
    /// Sustained high frame rate
    Recovered,
    /// Reduced-motion preference or constrained network
    Forced,
    /// Forcing signal lifted
    Released,
}

/// Effective tier transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierChange {
    /// Previous tier
    pub from: QualityTier,
    /// New tier
    pub to: QualityTier,
    /// Cause
    pub reason: TierChangeReason,
}

/// Governor statistics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GovernorStats {
    /// FPS samples observed
    pub samples: u64,
    /// Automatic downgrades
    pub downgrades: u64,
    /// Automatic upgrades
    pub upgrades: u64,
}

/// Performance governor
pub struct PerformanceGovernor {
    thresholds: TierThresholds,
    config: GovernorConfig,

    /// Tier chosen by measurement alone
    measured: QualityTier,

    reduced_motion: bool,
    network: NetworkQuality,
    memory_ratio: Option<f32>,

    /// Start of the current low-rate breach (ms)
    below_since: Option<f64>,
    /// Start of the current high-rate streak (ms)
    above_since: Option<f64>,

    stats: GovernorStats,
}

impl PerformanceGovernor {
    /// Create a governor
    pub fn new(thresholds: TierThresholds, config: GovernorConfig, reduced_motion: bool) -> Self {
        // The automatic path never starts below its own floor
        let measured = config.initial_tier.min(config.min_auto_tier);
        let governor = Self {
            thresholds,
            config,
            measured,
            reduced_motion,
            network: NetworkQuality::Unknown,
            memory_ratio: None,
            below_since: None,
            above_since: None,
            stats: GovernorStats::default(),
        };
        info!(
            "Performance governor started at {} (fps {}..{}, sustain {}ms)",
            governor.tier(),
            thresholds.fps_low,
            thresholds.fps_high,
            thresholds.sustain_ms
        );
        governor
    }

    /// Effective tier
    pub fn tier(&self) -> QualityTier {
        if self.is_forced() {
            QualityTier::Reduced
        } else {
            self.measured
        }
    }

    /// Factors for the effective tier
    pub fn factors(&self) -> QualityFactors {
        self.tier().factors()
    }

    /// Tier chosen by measurement, ignoring forcing signals
    pub fn measured_tier(&self) -> QualityTier {
        self.measured
    }

    /// Reduced tier is being forced
    pub fn is_forced(&self) -> bool {
        self.reduced_motion || self.network.is_constrained()
    }

    /// Statistics
    pub fn stats(&self) -> GovernorStats {
        self.stats
    }

    /// Record the latest heap usage ratio, `None` when unavailable
    pub fn observe_memory(&mut self, ratio: Option<f32>) {
        self.memory_ratio = ratio.filter(|r| r.is_finite());
    }

    fn memory_pressure(&self) -> bool {
        self.memory_ratio
            .is_some_and(|r| r > self.config.memory_high_ratio)
    }

    /// Feed one frame rate sample
    pub fn observe_fps(&mut self, fps: f32, now_ms: f64) -> Option<TierChange> {
        if !fps.is_finite() || fps < 0.0 {
            return None;
        }
        self.stats.samples += 1;

        let sustain = self.thresholds.sustain_ms as f64;
        let before = self.tier();

        if fps < self.thresholds.fps_low || self.memory_pressure() {
            self.above_since = None;
            let since = *self.below_since.get_or_insert(now_ms);
            if now_ms - since >= sustain && self.measured < self.config.min_auto_tier {
                self.measured = self.measured.degraded();
                self.below_since = Some(now_ms);
                self.stats.downgrades += 1;
                debug!(
                    "Measured tier degraded to {} (fps={:.1}, memory={:?})",
                    self.measured, fps, self.memory_ratio
                );
            }
        } else if fps > self.thresholds.fps_high {
            self.below_since = None;
            let since = *self.above_since.get_or_insert(now_ms);
            if now_ms - since >= sustain && self.measured > QualityTier::High {
                self.measured = self.measured.upgraded();
                self.above_since = Some(now_ms);
                self.stats.upgrades += 1;
                debug!("Measured tier recovered to {} (fps={:.1})", self.measured, fps);
            }
        } else {
            self.below_since = None;
            self.above_since = None;
        }

        let after = self.tier();
        (after != before).then(|| {
            let reason = if after > before {
                TierChangeReason::Degraded
            } else {
                TierChangeReason::Recovered
            };
            self.log_change(before, after, reason)
        })
    }

    /// Drop any running breach or recovery streak
    ///
    /// Called when sampling stops (document hidden) so that wall time spent
    /// without frames never counts towards `sustain_ms`.
    pub fn pause(&mut self) {
        if self.below_since.is_some() || self.above_since.is_some() {
            debug!("Governor timers cleared");
        }
        self.below_since = None;
        self.above_since = None;
    }

    /// Apply the reduced-motion preference
    pub fn set_reduced_motion(&mut self, reduced: bool) -> Option<TierChange> {
        let before = self.tier();
        self.reduced_motion = reduced;
        self.forcing_change(before)
    }

    /// Apply a network quality signal
    pub fn set_network(&mut self, network: NetworkQuality) -> Option<TierChange> {
        let before = self.tier();
        self.network = network;
        self.forcing_change(before)
    }

    fn forcing_change(&mut self, before: QualityTier) -> Option<TierChange> {
        let after = self.tier();
        if after == before {
            return None;
        }
        // Measurement restarts from scratch after a forced period
        self.below_since = None;
        self.above_since = None;
        let reason = if self.is_forced() {
            TierChangeReason::Forced
        } else {
            TierChangeReason::Released
        };
        Some(self.log_change(before, after, reason))
    }

    fn log_change(&self, from: QualityTier, to: QualityTier, reason: TierChangeReason) -> TierChange {
        debug!("Quality tier changed: {:?} -> {:?} ({:?})", from, to, reason);
        TierChange { from, to, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor() -> PerformanceGovernor {
        PerformanceGovernor::new(TierThresholds::default(), GovernorConfig::default(), false)
    }

    /// Feed `fps` every 16ms over `[start, start + duration)`
    fn feed(
        governor: &mut PerformanceGovernor,
        fps: f32,
        start: f64,
        duration: f64,
    ) -> (Vec<TierChange>, f64) {
        let mut changes = Vec::new();
        let mut t = start;
        while t < start + duration {
            changes.extend(governor.observe_fps(fps, t));
            t += 16.0;
        }
        (changes, t)
    }

    #[test]
    fn test_tier_ordering() {
        assert!(QualityTier::High < QualityTier::Medium);
        assert!(QualityTier::Low < QualityTier::Reduced);
        assert_eq!(QualityTier::Reduced.degraded(), QualityTier::Reduced);
        assert_eq!(QualityTier::High.upgraded(), QualityTier::High);
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("medium".parse::<QualityTier>().unwrap(), QualityTier::Medium);
        assert_eq!("OFF".parse::<QualityTier>().unwrap(), QualityTier::Reduced);
        assert!("ultra".parse::<QualityTier>().is_err());
    }

    #[test]
    fn test_short_dip_does_not_change_tier() {
        let mut governor = governor();
        let (down, t) = feed(&mut governor, 25.0, 0.0, 200.0);
        let (up, _) = feed(&mut governor, 55.0, t, 200.0);
        assert!(down.is_empty() && up.is_empty());
        assert_eq!(governor.tier(), QualityTier::High);
    }

    #[test]
    fn test_sustained_dip_downgrades_once() {
        let mut governor = governor();
        let (changes, _) = feed(&mut governor, 25.0, 0.0, 1200.0);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, QualityTier::Medium);
        assert_eq!(changes[0].reason, TierChangeReason::Degraded);
    }

    #[test]
    fn test_auto_floor_is_low() {
        let mut governor = governor();
        feed(&mut governor, 10.0, 0.0, 10_000.0);
        assert_eq!(governor.tier(), QualityTier::Low);
        assert_eq!(governor.stats().downgrades, 2);
    }

    #[test]
    fn test_sustained_recovery_upgrades() {
        let mut governor = governor();
        let (_, t) = feed(&mut governor, 25.0, 0.0, 1200.0);
        let (changes, _) = feed(&mut governor, 58.0, t, 1100.0);
        assert_eq!(changes.len(), 1);
        assert_eq!(governor.tier(), QualityTier::High);
    }

    #[test]
    fn test_mid_band_resets_timers() {
        let mut governor = governor();
        let (_, t) = feed(&mut governor, 25.0, 0.0, 900.0);
        let (_, t) = feed(&mut governor, 40.0, t, 100.0);
        let (changes, _) = feed(&mut governor, 25.0, t, 900.0);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_pause_discards_breach() {
        let mut governor = governor();
        let (_, t) = feed(&mut governor, 25.0, 0.0, 600.0);
        governor.pause();
        // Resume 3s later; the earlier 600ms must not count
        let (changes, _) = feed(&mut governor, 25.0, t + 3000.0, 600.0);
        assert!(changes.is_empty());
        assert_eq!(governor.tier(), QualityTier::High);
    }

    #[test]
    fn test_memory_pressure_degrades() {
        let mut governor = governor();
        governor.observe_memory(Some(0.95));
        let (changes, _) = feed(&mut governor, 60.0, 0.0, 1100.0);
        assert_eq!(changes.len(), 1);
        assert_eq!(governor.tier(), QualityTier::Medium);
    }

    #[test]
    fn test_reduced_motion_holds_reduced() {
        let mut governor =
            PerformanceGovernor::new(TierThresholds::default(), GovernorConfig::default(), true);
        assert_eq!(governor.tier(), QualityTier::Reduced);
        let (changes, _) = feed(&mut governor, 60.0, 0.0, 5000.0);
        assert!(changes.is_empty());
        assert_eq!(governor.tier(), QualityTier::Reduced);
        assert!(!governor.factors().animations_enabled);

        let change = governor.set_reduced_motion(false).unwrap();
        assert_eq!(change.reason, TierChangeReason::Released);
        assert_eq!(governor.tier(), QualityTier::High);
    }

    #[test]
    fn test_constrained_network_forces_reduced() {
        let mut governor = governor();
        let change = governor.set_network(NetworkQuality::Constrained).unwrap();
        assert_eq!(change.to, QualityTier::Reduced);
        assert_eq!(change.reason, TierChangeReason::Forced);
        assert!(governor.set_network(NetworkQuality::Constrained).is_none());
    }

    #[test]
    fn test_time_scale_shrinks_with_tier() {
        let scales: Vec<f32> = [QualityTier::High, QualityTier::Medium, QualityTier::Low]
            .iter()
            .map(|t| t.factors().time_scale)
            .collect();
        assert_eq!(scales[0], 1.0);
        assert!(scales.windows(2).all(|w| w[1] < w[0]));
        assert!(scales.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_trail_capacity_factor() {
        assert_eq!(QualityTier::High.factors().trail_capacity(12), 12);
        assert_eq!(QualityTier::Medium.factors().trail_capacity(12), 9);
        assert_eq!(QualityTier::Low.factors().trail_capacity(12), 6);
        assert_eq!(QualityTier::Reduced.factors().trail_capacity(12), 0);
    }

    #[test]
    fn test_thresholds_validate() {
        assert!(TierThresholds::default().validate().is_ok());
        let inverted = TierThresholds {
            fps_low: 60.0,
            fps_high: 50.0,
            sustain_ms: 1000,
        };
        assert!(inverted.validate().is_err());
    }
}
