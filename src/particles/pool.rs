//! Particle Pool
//!
//! Bounded set of short-lived sparkle particles. Emission never blocks and
//! never queues: at capacity a new particle is dropped, and close to
//! capacity the emission probability ramps down so the pool rarely gets
//! there in the first place.

use crate::geometry::Position;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tracing::{debug, trace};

/// Particle tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Maximum live particles
    #[serde(default = "default_max_particles")]
    pub max_particles: usize,

    /// Shortest lifetime (ms)
    #[serde(default = "default_lifetime_min_ms")]
    pub lifetime_min_ms: f32,

    /// Longest lifetime (ms)
    #[serde(default = "default_lifetime_max_ms")]
    pub lifetime_max_ms: f32,

    /// Slowest initial speed (px/s)
    #[serde(default = "default_speed_min")]
    pub speed_min: f32,

    /// Fastest initial speed (px/s)
    #[serde(default = "default_speed_max")]
    pub speed_max: f32,

    /// Downward acceleration (px/s²)
    #[serde(default = "default_gravity")]
    pub gravity: f32,

    /// Per-tick emission probability at full activity
    #[serde(default = "default_emission_probability")]
    pub emission_probability: f32,

    /// Fill ratio above which emission probability ramps down to zero
    #[serde(default = "default_near_capacity_ratio")]
    pub near_capacity_ratio: f32,

    /// Particles emitted by a click
    #[serde(default = "default_click_burst")]
    pub click_burst: usize,

    /// Scroll speed that counts as a full burst (px/s)
    #[serde(default = "default_burst_reference_velocity")]
    pub burst_reference_velocity: f32,

    /// Emission taper after scrolling stops (ms)
    #[serde(default = "default_burst_cooldown_ms")]
    pub burst_cooldown_ms: f64,

    /// Fixed RNG seed (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_particles() -> usize {
    64
}
fn default_lifetime_min_ms() -> f32 {
    400.0
}
fn default_lifetime_max_ms() -> f32 {
    900.0
}
fn default_speed_min() -> f32 {
    40.0
}
fn default_speed_max() -> f32 {
    160.0
}
fn default_gravity() -> f32 {
    60.0
}
fn default_emission_probability() -> f32 {
    0.35
}
fn default_near_capacity_ratio() -> f32 {
    0.8
}
fn default_click_burst() -> usize {
    8
}
fn default_burst_reference_velocity() -> f32 {
    1500.0
}
fn default_burst_cooldown_ms() -> f64 {
    400.0
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particles: default_max_particles(),
            lifetime_min_ms: default_lifetime_min_ms(),
            lifetime_max_ms: default_lifetime_max_ms(),
            speed_min: default_speed_min(),
            speed_max: default_speed_max(),
            gravity: default_gravity(),
            emission_probability: default_emission_probability(),
            near_capacity_ratio: default_near_capacity_ratio(),
            click_burst: default_click_burst(),
            burst_reference_velocity: default_burst_reference_velocity(),
            burst_cooldown_ms: default_burst_cooldown_ms(),
            seed: None,
        }
    }
}

impl ParticleConfig {
    /// Check ranges
    pub fn validate(&self) -> Result<(), String> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.lifetime_min_ms) || !positive(self.lifetime_max_ms) {
            return Err("particle lifetimes must be positive".to_string());
        }
        if self.lifetime_min_ms > self.lifetime_max_ms {
            return Err(format!(
                "lifetime_min_ms ({}) exceeds lifetime_max_ms ({})",
                self.lifetime_min_ms, self.lifetime_max_ms
            ));
        }
        if !self.speed_min.is_finite()
            || !self.speed_max.is_finite()
            || self.speed_min < 0.0
            || self.speed_min > self.speed_max
        {
            return Err(format!(
                "invalid speed range {}..{}",
                self.speed_min, self.speed_max
            ));
        }
        if !self.gravity.is_finite() {
            return Err(format!("gravity must be finite, got {}", self.gravity));
        }
        if !positive(self.burst_reference_velocity) {
            return Err(format!(
                "burst_reference_velocity must be positive, got {}",
                self.burst_reference_velocity
            ));
        }
        if !(self.burst_cooldown_ms.is_finite() && self.burst_cooldown_ms > 0.0) {
            return Err(format!(
                "burst_cooldown_ms must be positive, got {}",
                self.burst_cooldown_ms
            ));
        }
        if !(0.0..=1.0).contains(&self.emission_probability) {
            return Err(format!(
                "emission_probability must be within 0..1, got {}",
                self.emission_probability
            ));
        }
        if !(0.0..1.0).contains(&self.near_capacity_ratio) {
            return Err(format!(
                "near_capacity_ratio must be within 0..1, got {}",
                self.near_capacity_ratio
            ));
        }
        Ok(())
    }
}

/// One live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Pool-unique id, also the render handle
    pub id: u64,
    /// Current position (px)
    pub position: Position,
    /// Current velocity (px/s)
    pub velocity: Position,
    /// Lifetime left (ms)
    pub remaining_lifetime_ms: f32,
    /// Lifetime at emission (ms)
    pub max_lifetime_ms: f32,
    /// Per-particle value for size/colour variation
    pub visual_seed: u32,
}

impl Particle {
    /// Opacity, fading linearly with remaining lifetime
    pub fn opacity(&self) -> f32 {
        if self.max_lifetime_ms <= 0.0 {
            return 0.0;
        }
        (self.remaining_lifetime_ms / self.max_lifetime_ms).clamp(0.0, 1.0)
    }

    /// Lifetime exhausted or fully faded
    pub fn is_expired(&self) -> bool {
        self.remaining_lifetime_ms <= 0.0 || self.opacity() <= 0.0
    }
}

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ParticleStats {
    /// Particles emitted
    pub emitted: u64,
    /// Emissions dropped at capacity
    pub dropped: u64,
    /// Probabilistic emissions that did not fire
    pub skipped: u64,
    /// Particles removed on expiry
    pub expired: u64,
}

/// Particle pool
pub struct ParticlePool {
    config: ParticleConfig,
    rng: StdRng,
    particles: Vec<Particle>,
    next_id: u64,
    stats: ParticleStats,
}

impl ParticlePool {
    /// Create an empty pool
    pub fn new(config: ParticleConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        debug!(
            "Particle pool created: cap {}, lifetime {}..{}ms",
            config.max_particles, config.lifetime_min_ms, config.lifetime_max_ms
        );
        Self {
            particles: Vec::with_capacity(config.max_particles),
            config,
            rng,
            next_id: 0,
            stats: ParticleStats::default(),
        }
    }

    /// Emit one particle at `origin`
    ///
    /// Returns `None` when the pool is full (the emission is dropped).
    pub fn emit(&mut self, origin: Position) -> Option<u64> {
        if !origin.is_finite() {
            return None;
        }
        if self.particles.len() >= self.config.max_particles {
            self.stats.dropped += 1;
            return None;
        }

        let angle = self.rng.random_range(0.0..TAU);
        let speed = self
            .rng
            .random_range(self.config.speed_min..=self.config.speed_max);
        let lifetime = self
            .rng
            .random_range(self.config.lifetime_min_ms..=self.config.lifetime_max_ms);

        let id = self.next_id;
        self.next_id += 1;
        self.particles.push(Particle {
            id,
            position: origin,
            velocity: Position::new(angle.cos(), angle.sin()) * speed,
            remaining_lifetime_ms: lifetime,
            max_lifetime_ms: lifetime,
            visual_seed: self.rng.random(),
        });
        self.stats.emitted += 1;
        Some(id)
    }

    /// Probability that [`maybe_emit`](Self::maybe_emit) fires
    ///
    /// `activity` combines the tier's emission factor and scroll activity.
    pub fn emission_chance(&self, activity: f32) -> f32 {
        let max = self.config.max_particles;
        if max == 0 {
            return 0.0;
        }
        let fill = self.particles.len() as f32 / max as f32;
        let near = self.config.near_capacity_ratio;
        let headroom = if fill <= near {
            1.0
        } else {
            ((1.0 - fill) / (1.0 - near)).max(0.0)
        };
        (self.config.emission_probability * activity.clamp(0.0, 1.0) * headroom).clamp(0.0, 1.0)
    }

    /// Emit with probability [`emission_chance`](Self::emission_chance)
    pub fn maybe_emit(&mut self, origin: Position, activity: f32) -> Option<u64> {
        let chance = self.emission_chance(activity);
        if chance <= 0.0 {
            return None;
        }
        if self.rng.random::<f32>() < chance {
            self.emit(origin)
        } else {
            self.stats.skipped += 1;
            None
        }
    }

    /// Emit a click burst, scaled by the tier's emission factor
    pub fn burst(&mut self, origin: Position, factor: f32) -> Vec<u64> {
        let count = (self.config.click_burst as f32 * factor.clamp(0.0, 1.0)).round() as usize;
        (0..count).filter_map(|_| self.emit(origin)).collect()
    }

    /// Advance every particle by `dt_ms`
    ///
    /// Returns the ids removed this tick. Each id is returned exactly once.
    pub fn tick(&mut self, dt_ms: f32) -> Vec<u64> {
        if dt_ms > 0.0 && dt_ms.is_finite() {
            let dt = dt_ms / 1000.0;
            let gravity = self.config.gravity;
            for particle in self.particles.iter_mut() {
                particle.position = particle.position + particle.velocity * dt;
                particle.velocity.y += gravity * dt;
                particle.remaining_lifetime_ms -= dt_ms;
            }
        }

        let mut removed = Vec::new();
        self.particles.retain(|p| {
            if p.is_expired() {
                removed.push(p.id);
                false
            } else {
                true
            }
        });
        self.stats.expired += removed.len() as u64;

        if !removed.is_empty() {
            trace!(
                "Particles expired: {} ({} live)",
                removed.len(),
                self.particles.len()
            );
        }
        removed
    }

    /// Remove every particle, returning their ids
    pub fn clear(&mut self) -> Vec<u64> {
        self.particles.drain(..).map(|p| p.id).collect()
    }

    /// Live particles
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// No live particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Configured cap
    pub fn capacity(&self) -> usize {
        self.config.max_particles
    }

    /// Particles emitted per click at full quality
    pub fn click_burst(&self) -> usize {
        self.config.click_burst
    }

    /// Longest possible lifetime (ms)
    pub fn max_lifetime_ms(&self) -> f32 {
        self.config.lifetime_max_ms
    }

    /// Statistics
    pub fn stats(&self) -> ParticleStats {
        self.stats
    }
}
