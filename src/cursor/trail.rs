//! Trail Buffer
//!
//! Fixed-capacity FIFO of recent pointer positions. Entries age by one on
//! every tick and fade out linearly; the oldest entry is evicted first when
//! a push would exceed capacity or when an entry outlives `max_age_ticks`.
//!
//! The buffer knows nothing about springs. The cursor layer points one
//! trail-dot follower at each entry.

use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

/// Trail tuning beyond its capacity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailConfig {
    /// Minimum pointer travel before a new entry is recorded (px)
    #[serde(default = "default_min_distance_px")]
    pub min_distance_px: f32,

    /// Entries older than this many ticks expire
    #[serde(default = "default_max_age_ticks")]
    pub max_age_ticks: u32,

    /// Stiffness multiplier applied per trail dot (older dots are softer)
    #[serde(default = "default_falloff")]
    pub falloff: f32,
}

fn default_min_distance_px() -> f32 {
    2.0
}
fn default_max_age_ticks() -> u32 {
    30
}
fn default_falloff() -> f32 {
    0.85
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            min_distance_px: default_min_distance_px(),
            max_age_ticks: default_max_age_ticks(),
            falloff: default_falloff(),
        }
    }
}

/// One remembered pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailEntry {
    /// Recorded position
    pub position: Position,
    /// Ticks since the entry was recorded
    pub age_ticks: u32,
    /// Monotonic entry id
    pub id: u64,
}

/// Trail buffer statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailStats {
    /// Entries pushed
    pub pushed: u64,
    /// Entries evicted by capacity
    pub evicted: u64,
    /// Entries expired by age
    pub expired: u64,
    /// Samples skipped as too close to the newest entry
    pub skipped: u64,
}

/// Trail buffer
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    /// Configured (maximum) capacity
    max_capacity: usize,

    /// Effective capacity, reduced by the quality tier
    capacity: usize,

    /// Minimum travel before a sample qualifies
    min_distance: f32,

    /// Entries older than this are dropped
    max_age_ticks: u32,

    /// Oldest at the front, newest at the back
    entries: VecDeque<TrailEntry>,

    next_id: u64,

    stats: TrailStats,
}

impl TrailBuffer {
    /// Create a trail buffer
    pub fn new(capacity: usize, min_distance: f32, max_age_ticks: u32) -> Self {
        Self {
            max_capacity: capacity,
            capacity,
            min_distance: min_distance.max(0.0),
            max_age_ticks: max_age_ticks.max(1),
            entries: VecDeque::with_capacity(capacity),
            next_id: 0,
            stats: TrailStats::default(),
        }
    }

    /// Record a position; returns the new entry id if it qualified
    pub fn push(&mut self, position: Position) -> Option<u64> {
        if self.capacity == 0 || !position.is_finite() {
            return None;
        }

        if let Some(newest) = self.entries.back() {
            if newest.position.distance_to(position) < self.min_distance {
                self.stats.skipped += 1;
                return None;
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(TrailEntry {
            position,
            age_ticks: 0,
            id,
        });
        self.stats.pushed += 1;

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                trace!("Trail evicted entry {}", evicted.id);
                self.stats.evicted += 1;
            }
        }

        Some(id)
    }

    /// Age every entry by one tick and drop expired ones
    ///
    /// Returns the number of expired entries.
    pub fn tick(&mut self) -> usize {
        for entry in self.entries.iter_mut() {
            entry.age_ticks = entry.age_ticks.saturating_add(1);
        }

        let mut expired = 0;
        while self
            .entries
            .front()
            .is_some_and(|e| e.age_ticks > self.max_age_ticks)
        {
            self.entries.pop_front();
            expired += 1;
        }
        self.stats.expired += expired as u64;
        expired
    }

    /// Change the effective capacity (clamped to the configured maximum)
    ///
    /// Shrinking evicts the oldest entries immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.min(self.max_capacity);
        if capacity == self.capacity {
            return;
        }
        self.capacity = capacity;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.stats.evicted += 1;
        }
    }

    /// Opacity of an entry (1.0 when fresh, approaching 0 at max age)
    pub fn opacity(&self, entry: &TrailEntry) -> f32 {
        let age = entry.age_ticks.min(self.max_age_ticks) as f32;
        1.0 - age / (self.max_age_ticks as f32 + 1.0)
    }

    /// Entries from newest to oldest
    pub fn newest_first(&self) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter().rev()
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &TrailEntry> {
        self.entries.iter()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Configured capacity
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Statistics
    pub fn stats(&self) -> TrailStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: u32) -> Position {
        Position::new(i as f32 * 10.0, 0.0)
    }

    #[test]
    fn test_capacity_bound_and_fifo() {
        let mut trail = TrailBuffer::new(4, 0.0, 100);
        for i in 0..10 {
            trail.push(point(i));
            assert!(trail.len() <= 4);
        }
        let ids: Vec<u64> = trail.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![6, 7, 8, 9]);
        assert_eq!(trail.stats().evicted, 6);
    }

    #[test]
    fn test_min_distance_skips_samples() {
        let mut trail = TrailBuffer::new(8, 5.0, 100);
        assert!(trail.push(Position::new(0.0, 0.0)).is_some());
        assert!(trail.push(Position::new(2.0, 2.0)).is_none());
        assert!(trail.push(Position::new(10.0, 0.0)).is_some());
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.stats().skipped, 1);
    }

    #[test]
    fn test_age_increases_until_expiry() {
        let mut trail = TrailBuffer::new(8, 0.0, 3);
        trail.push(point(0));
        for expected_age in 1..=3 {
            trail.tick();
            assert_eq!(trail.iter().next().unwrap().age_ticks, expected_age);
        }
        assert_eq!(trail.tick(), 1);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_shrinking_capacity_evicts_oldest() {
        let mut trail = TrailBuffer::new(6, 0.0, 100);
        for i in 0..6 {
            trail.push(point(i));
        }
        trail.set_capacity(2);
        let ids: Vec<u64> = trail.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 5]);

        // Cannot grow past the configured maximum
        trail.set_capacity(50);
        assert_eq!(trail.capacity(), 6);
    }

    #[test]
    fn test_zero_capacity_refuses_pushes() {
        let mut trail = TrailBuffer::new(6, 0.0, 100);
        trail.set_capacity(0);
        assert!(trail.push(point(1)).is_none());
        assert!(trail.is_empty());
    }

    #[test]
    fn test_opacity_fades_with_age() {
        let mut trail = TrailBuffer::new(4, 0.0, 4);
        trail.push(point(0));
        let fresh = trail.opacity(trail.iter().next().unwrap());
        trail.tick();
        trail.tick();
        let older = trail.opacity(trail.iter().next().unwrap());
        assert_eq!(fresh, 1.0);
        assert!(older < fresh && older > 0.0);
    }
}
