//! Motion engine
//!
//! [`MotionEngine`] is the context object a page mounts once. It owns every
//! subsystem, receives forwarded input events, and advances everything from
//! one explicit [`tick`](MotionEngine::tick). Nothing in here is global;
//! mounting twice gives two independent engines.
//!
//! # Architecture
//!
//! ```text
//! MotionEngine
//!   ├─> InputSampler          (latest pointer / scroll slot)
//!   ├─> InteractionClassifier (cursor mode, caption, rescan timer)
//!   ├─> CursorLayer           (ring, dot, trail followers; fine pointer only)
//!   ├─> ParticlePool + ScrollBurst
//!   ├─> ScrollSequencer × sections
//!   ├─> PerformanceGovernor + FrameRateMeter
//!   └─> SubscriptionRegistry  (released together at teardown)
//! ```
//!
//! # Tick Order
//!
//! 1. Snapshot the sampler's latest pointer and scroll values
//! 2. Feed the frame meter and let the governor settle the tier
//! 3. Derive the quality factors (time scale shrinks while hidden)
//! 4. Cursor: track the snapshot, step the followers
//! 5. Particles: age and free, then emit with this tick's tier
//! 6. Scroll sequencers: progress from the snapshot, advance crossfades
//! 7. Write everything to the [`RenderSink`]
//!
//! The governor always runs before the particle emission decision, so a
//! tick never mixes two tiers.
//!
//! # Failure Model
//!
//! Only [`mount`](MotionEngine::mount) returns errors, for configuration
//! that cannot be honoured. After that the engine degrades instead of
//! failing: a missing fine pointer disables the cursor, malformed samples
//! are dropped, detached render targets are skipped.

pub mod error;
pub mod probe;
pub mod subscriptions;

pub use error::{MotionError, Result};
pub use probe::{EnvironmentProbe, StaticProbe};
pub use subscriptions::{Subscription, SubscriptionKind, SubscriptionRegistry};

use crate::config::MotionConfig;
use crate::cursor::{CursorLayer, CursorMode, InteractionClassifier, ModeTransition, ScanReport};
use crate::dom::ElementTree;
use crate::geometry::Position;
use crate::input::{CoordinateSpace, InputError, InputEvent, InputSampler, Viewport};
use crate::particles::{Particle, ParticlePool, ParticleStats, ScrollBurst};
use crate::performance::{
    FrameRateMeter, GovernorStats, NetworkQuality, PerformanceGovernor, QualityTier, TierChange,
    HIDDEN_TIME_SCALE,
};
use crate::render::{RenderSink, RenderTarget, VisualStyle};
use crate::scroll::ScrollSequencer;
use crate::utils::{metric_names, MetricsCollector, MetricsSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// Frame number (1-based)
    pub frame: u64,
    /// Effective tier during the tick
    pub tier: QualityTier,
    /// Time scale applied to the tick
    pub time_scale: f32,
    /// Followers that moved
    pub followers_moved: usize,
    /// Trail entries after the tick
    pub trail_len: usize,
    /// Particles live after the tick
    pub particles_live: usize,
    /// Particles emitted this tick
    pub particles_emitted: usize,
    /// Particles freed this tick
    pub particles_removed: usize,
    /// Sections whose active frame changed
    pub index_changes: usize,
    /// Sink writes accepted
    pub writes: usize,
    /// Sink writes refused (detached targets)
    pub rejected: usize,
}

/// Result of a teardown call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// Subscriptions released
    pub subscriptions_released: usize,
    /// Render targets released
    pub targets_released: usize,
}

/// State of one scroll section
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionSummary {
    /// Active frame index
    pub active_index: usize,
    /// Section progress
    pub progress: f32,
    /// Frames in the section
    pub frame_count: usize,
    /// Active frame changes so far
    pub index_changes: u64,
}

/// End-of-run engine summary
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    /// Frames ticked
    pub frames: u64,
    /// Engine clock (ms)
    pub clock_ms: f64,
    /// Effective tier
    pub tier: QualityTier,
    /// Active cursor mode
    pub mode: CursorMode,
    /// Cursor subsystem running
    pub cursor_enabled: bool,
    /// Trail entries
    pub trail_len: usize,
    /// Live particles
    pub particles_live: usize,
    /// Particle pool counters
    pub particles: ParticleStats,
    /// Governor counters
    pub governor: GovernorStats,
    /// Per-section state
    pub sections: Vec<SectionSummary>,
    /// Cursor mode transitions
    pub mode_transitions: u64,
    /// Classifier scans
    pub classifier_scans: u64,
    /// Live subscriptions
    pub active_subscriptions: usize,
    /// Engine still mounted
    pub mounted: bool,
    /// Metrics snapshot
    pub metrics: MetricsSnapshot,
}

/// Mounted motion engine
pub struct MotionEngine {
    config: MotionConfig,
    sampler: InputSampler,

    /// `None` on devices without a fine pointer
    cursor: Option<CursorLayer>,

    classifier: InteractionClassifier,
    particles: ParticlePool,
    burst: ScrollBurst,
    sequencers: Vec<ScrollSequencer>,
    governor: PerformanceGovernor,
    meter: FrameRateMeter,
    subscriptions: SubscriptionRegistry,
    metrics: Arc<MetricsCollector>,

    frame_timing: bool,
    hidden: bool,
    mounted: bool,

    /// Centre of the hovered magnetic element
    magnet: Option<Position>,

    /// Caption must be pushed on the next tick
    caption_dirty: bool,

    /// Pointer-down events since the last tick
    pending_clicks: u32,

    /// Accumulated frame deltas (ms)
    clock_ms: f64,
    frames: u64,
}

impl MotionEngine {
    /// Mount the engine
    ///
    /// Probes the environment once, builds every subsystem and registers
    /// the host subscriptions. Pointer listeners are only registered when a
    /// fine pointer is present.
    pub fn mount(
        config: MotionConfig,
        probe: &dyn EnvironmentProbe,
        tree: &dyn ElementTree,
    ) -> Result<Self> {
        config.validate()?;

        let viewport = probe.viewport();
        let fine_pointer = probe.supports_fine_pointer();
        let sampler = InputSampler::new(viewport, fine_pointer)?;

        let sequencers = config
            .scroll
            .sections
            .iter()
            .enumerate()
            .map(|(section, descriptor)| {
                descriptor
                    .build(&config.scroll.sequencer)
                    .map_err(|source| MotionError::Section { section, source })
            })
            .collect::<Result<Vec<_>>>()?;

        let reduced_motion = config.reduced_motion || probe.prefers_reduced_motion();
        let mut governor = PerformanceGovernor::new(
            config.tier_thresholds,
            config.governor.clone(),
            reduced_motion,
        );
        governor.set_network(probe.network_quality());
        governor.observe_memory(probe.memory_ratio());

        let frame_timing = probe.supports_frame_timing();
        if !frame_timing {
            warn!("Frame timing unavailable, quality tier will not adapt to frame rate");
        }

        let cursor = if fine_pointer {
            Some(CursorLayer::new(
                config.cursor.clone(),
                config.follower_profiles(),
                config.trail_capacity,
                &config.trail,
                viewport_centre(viewport),
            ))
        } else {
            warn!("No fine pointer available, cursor effects disabled");
            None
        };

        let mut classifier = InteractionClassifier::new(config.classifier.clone());
        if cursor.is_some() {
            classifier.scan(tree, 0.0);
        }

        let mut subscriptions = SubscriptionRegistry::new();
        if cursor.is_some() {
            for kind in [
                SubscriptionKind::PointerMove,
                SubscriptionKind::PointerOver,
                SubscriptionKind::PointerOut,
                SubscriptionKind::PointerDown,
                SubscriptionKind::PointerUp,
                SubscriptionKind::RescanTimer,
            ] {
                subscriptions.subscribe(kind);
            }
        }
        for kind in [
            SubscriptionKind::Scroll,
            SubscriptionKind::Resize,
            SubscriptionKind::VisibilityChange,
            SubscriptionKind::AnimationFrame,
        ] {
            subscriptions.subscribe(kind);
        }

        let particles = ParticlePool::new(config.particles.clone());
        let burst = ScrollBurst::new(
            config.particles.burst_reference_velocity,
            config.particles.burst_cooldown_ms,
        );
        let meter = FrameRateMeter::new(config.governor.window_ms);

        info!(
            "Motion engine mounted: cursor={}, sections={}, tier={}, subscriptions={}",
            cursor.is_some(),
            sequencers.len(),
            governor.tier(),
            subscriptions.len()
        );

        Ok(Self {
            config,
            sampler,
            cursor,
            classifier,
            particles,
            burst,
            sequencers,
            governor,
            meter,
            subscriptions,
            metrics: Arc::new(MetricsCollector::new()),
            frame_timing,
            hidden: false,
            mounted: true,
            magnet: None,
            caption_dirty: false,
            pending_clicks: 0,
            clock_ms: 0.0,
            frames: 0,
        })
    }

    /// Forward one host event
    ///
    /// Returns `false` when the event was ignored (engine torn down,
    /// subsystem disabled, or a malformed sample).
    pub fn handle_event(&mut self, event: InputEvent, tree: &dyn ElementTree) -> bool {
        if !self.mounted {
            return false;
        }

        let handled = match event {
            InputEvent::PointerMove { x, y, timestamp_ms } => {
                match self
                    .sampler
                    .record_pointer(x, y, CoordinateSpace::Client, timestamp_ms)
                {
                    Ok(_) => true,
                    Err(InputError::PointerDisabled) => false,
                    Err(e) => {
                        trace!("Pointer sample dropped: {}", e);
                        self.metrics
                            .increment_counter(metric_names::EVENTS_REJECTED, 1);
                        false
                    }
                }
            }
            InputEvent::PointerOver { target } => {
                if self.cursor.is_none() {
                    false
                } else {
                    self.sampler.set_pointer_in_viewport(true);
                    if let Some(transition) = self.classifier.pointer_over(target, tree) {
                        self.apply_transition(transition, tree);
                    }
                    true
                }
            }
            InputEvent::PointerLeaveViewport => {
                if self.cursor.is_none() {
                    false
                } else {
                    self.sampler.set_pointer_in_viewport(false);
                    if let Some(transition) = self.classifier.pointer_left_viewport() {
                        self.apply_transition(transition, tree);
                    }
                    true
                }
            }
            InputEvent::PointerEnterViewport => {
                self.sampler.set_pointer_in_viewport(true);
                self.cursor.is_some()
            }
            InputEvent::PointerDown { .. } => {
                if self.cursor.is_none() {
                    false
                } else {
                    self.sampler.set_pressed(true);
                    self.pending_clicks = self.pending_clicks.saturating_add(1);
                    true
                }
            }
            InputEvent::PointerUp { .. } => {
                self.sampler.set_pressed(false);
                self.cursor.is_some()
            }
            InputEvent::Scroll {
                offset,
                timestamp_ms,
            } => match self.sampler.record_scroll(offset, timestamp_ms) {
                Ok(sample) => {
                    self.burst.observe(sample.velocity, self.clock_ms);
                    true
                }
                Err(e) => {
                    trace!("Scroll sample dropped: {}", e);
                    self.metrics
                        .increment_counter(metric_names::EVENTS_REJECTED, 1);
                    false
                }
            },
            InputEvent::Resize { width, height } => {
                let viewport = Viewport {
                    width,
                    height,
                    device_pixel_ratio: self.sampler.viewport().device_pixel_ratio,
                };
                match self.sampler.resize(viewport) {
                    Ok(()) => {
                        debug!("Viewport resized to {}x{}", width, height);
                        true
                    }
                    Err(e) => {
                        warn!("Ignoring resize: {}", e);
                        false
                    }
                }
            }
            InputEvent::VisibilityChange { hidden } => {
                if self.hidden != hidden {
                    debug!("Document visibility changed: hidden={}", hidden);
                    // The hidden stretch says nothing about rendering cost
                    self.governor.pause();
                    if !hidden {
                        self.meter.reset();
                    }
                }
                self.hidden = hidden;
                true
            }
        };

        if handled {
            self.metrics
                .increment_counter(metric_names::EVENTS_HANDLED, 1);
        }
        handled
    }

    /// Advance every subsystem by `dt_ms` and write the result to `sink`
    pub fn tick(&mut self, dt_ms: f32, sink: &mut dyn RenderSink) -> TickReport {
        if !self.mounted {
            return TickReport::default();
        }
        let started = Instant::now();

        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.frames += 1;
        self.clock_ms += dt_ms as f64;

        let pointer = self.sampler.latest_pointer();
        let scroll = self.sampler.latest_scroll();
        let pointer_visible = self.sampler.is_pointer_visible();
        let pressed = self.sampler.is_pressed();

        self.meter.record_frame(self.clock_ms);
        if self.frame_timing && !self.hidden {
            if let Some(fps) = self.meter.fps() {
                self.metrics.set_gauge(metric_names::FPS, fps as f64);
                if let Some(change) = self.governor.observe_fps(fps, self.clock_ms) {
                    self.record_tier_change(change);
                }
            }
        }

        let mut factors = self.governor.factors();
        if self.hidden {
            factors = factors.scaled_time(HIDDEN_TIME_SCALE);
        }
        let scaled_dt = dt_ms * factors.time_scale;
        let animate = factors.animations_enabled;

        let mut report = TickReport {
            frame: self.frames,
            tier: self.governor.tier(),
            time_scale: factors.time_scale,
            ..Default::default()
        };

        if let Some(cursor) = self.cursor.as_mut() {
            if let Some(sample) = pointer {
                cursor.track(sample.position, self.magnet);
            }
            let capacity = factors.trail_capacity(self.config.trail_capacity);
            report.followers_moved = cursor.step(scaled_dt, animate, capacity);
            report.trail_len = cursor.trail().len();
        }

        let mut removed = self.particles.tick(scaled_dt);
        if !animate {
            removed.extend(self.particles.clear());
        }
        if animate && !self.hidden {
            let origin = pointer
                .map(|p| p.position)
                .unwrap_or_else(|| viewport_centre(self.sampler.viewport()));
            let activity = self.burst.activity(self.clock_ms) * factors.emission_probability;
            if activity > 0.0 && self.particles.maybe_emit(origin, activity).is_some() {
                report.particles_emitted += 1;
            }
            if let Some(sample) = pointer {
                for _ in 0..self.pending_clicks {
                    report.particles_emitted += self
                        .particles
                        .burst(sample.position, factors.emission_probability)
                        .len();
                }
            }
        }
        self.pending_clicks = 0;

        for id in &removed {
            sink.release(RenderTarget::Particle(*id));
        }
        report.particles_removed = removed.len();
        report.particles_live = self.particles.len();

        for sequencer in self.sequencers.iter_mut() {
            if let Some(sample) = scroll {
                if sequencer.update_scroll(sample.offset).is_some() {
                    report.index_changes += 1;
                }
            }
            sequencer.tick(scaled_dt, animate);
        }

        let mut attempted = 0;
        if std::mem::take(&mut self.caption_dirty) {
            let mode = self.classifier.mode();
            let caption = self.classifier.caption().filter(|_| mode.shows_caption());
            sink.set_caption(caption);
        }
        if let Some(cursor) = &self.cursor {
            attempted += 2 + cursor.trail_dots().len();
            report.writes += cursor.render(
                sink,
                self.classifier.mode(),
                pointer_visible,
                pressed,
                factors.blur_enabled,
            );
        }
        for particle in self.particles.iter() {
            attempted += 1;
            report.writes +=
                sink.write(RenderTarget::Particle(particle.id), &particle_style(particle)) as usize;
        }
        for (section, sequencer) in self.sequencers.iter().enumerate() {
            attempted += sequencer.frame_count();
            report.writes += sequencer.render(section, sink);
        }
        report.rejected = attempted - report.writes;

        self.record_tick(&report, dt_ms, started);
        report
    }

    /// Rescan the document if the classifier's interval elapsed
    pub fn poll_rescan(&mut self, tree: &dyn ElementTree) -> Option<ScanReport> {
        if !self.mounted || self.cursor.is_none() {
            return None;
        }
        let (report, transition) = self.classifier.poll_rescan(tree, self.clock_ms)?;
        self.after_scan(transition, tree);
        Some(report)
    }

    /// Rescan the document now
    ///
    /// Used by the frame driver, which owns the rescan timer itself.
    pub fn rescan(&mut self, tree: &dyn ElementTree) -> Option<ScanReport> {
        if !self.mounted || self.cursor.is_none() {
            return None;
        }
        let (report, transition) = self.classifier.scan(tree, self.clock_ms);
        self.after_scan(transition, tree);
        Some(report)
    }

    /// Release every subscription and render target
    ///
    /// Safe to call repeatedly; later calls release nothing.
    pub fn teardown(&mut self, sink: &mut dyn RenderSink) -> TeardownReport {
        if !self.mounted {
            debug!("Teardown requested on an unmounted engine, nothing to release");
            return TeardownReport::default();
        }
        self.mounted = false;

        let mut targets_released = 0;
        if let Some(cursor) = &self.cursor {
            for target in cursor.targets() {
                targets_released += sink.release(target) as usize;
            }
            sink.set_caption(None);
        }
        for id in self.particles.clear() {
            targets_released += sink.release(RenderTarget::Particle(id)) as usize;
        }
        for (section, sequencer) in self.sequencers.iter().enumerate() {
            for target in sequencer.targets(section) {
                targets_released += sink.release(target) as usize;
            }
        }

        self.pending_clicks = 0;
        self.burst.reset();
        let subscriptions_released = self.subscriptions.release_all();

        info!(
            "Motion engine torn down: {} subscriptions, {} render targets released",
            subscriptions_released, targets_released
        );

        TeardownReport {
            subscriptions_released,
            targets_released,
        }
    }

    /// Host reported a new reduced-motion preference
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        let reduced = reduced || self.config.reduced_motion;
        if let Some(change) = self.governor.set_reduced_motion(reduced) {
            self.record_tier_change(change);
        }
    }

    /// Host reported a new network quality
    pub fn set_network(&mut self, network: NetworkQuality) {
        if let Some(change) = self.governor.set_network(network) {
            self.record_tier_change(change);
        }
    }

    /// Host reported the heap usage ratio
    pub fn observe_memory(&mut self, ratio: Option<f32>) {
        self.governor.observe_memory(ratio);
    }

    /// Summary of the engine state
    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            frames: self.frames,
            clock_ms: self.clock_ms,
            tier: self.governor.tier(),
            mode: self.classifier.mode(),
            cursor_enabled: self.cursor.is_some(),
            trail_len: self.cursor.as_ref().map_or(0, |c| c.trail().len()),
            particles_live: self.particles.len(),
            particles: self.particles.stats(),
            governor: self.governor.stats(),
            sections: self
                .sequencers
                .iter()
                .map(|s| SectionSummary {
                    active_index: s.active_index(),
                    progress: s.progress(),
                    frame_count: s.frame_count(),
                    index_changes: s.index_changes(),
                })
                .collect(),
            mode_transitions: self.classifier.transitions(),
            classifier_scans: self.classifier.scans(),
            active_subscriptions: self.subscriptions.len(),
            mounted: self.mounted,
            metrics: self.metrics.snapshot(),
        }
    }

    /// Shared metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(&self.metrics)
    }

    /// Configuration the engine was mounted with
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Input sampler
    pub fn sampler(&self) -> &InputSampler {
        &self.sampler
    }

    /// Cursor layer, `None` without a fine pointer
    pub fn cursor(&self) -> Option<&CursorLayer> {
        self.cursor.as_ref()
    }

    /// Interaction classifier
    pub fn classifier(&self) -> &InteractionClassifier {
        &self.classifier
    }

    /// Particle pool
    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    /// Scroll sequencers, one per section
    pub fn sequencers(&self) -> &[ScrollSequencer] {
        &self.sequencers
    }

    /// Performance governor
    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    /// Subscription registry
    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// Live subscriptions
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Effective quality tier
    pub fn tier(&self) -> QualityTier {
        self.governor.tier()
    }

    /// Active cursor mode
    pub fn mode(&self) -> CursorMode {
        self.classifier.mode()
    }

    /// Engine clock (ms)
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Frames ticked
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Document hidden
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Engine still mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn apply_transition(&mut self, transition: ModeTransition, tree: &dyn ElementTree) {
        self.magnet = if transition.to.is_magnetic() {
            transition
                .element
                .and_then(|id| tree.element(id))
                .and_then(|element| element.bounds)
                .map(|bounds| bounds.center())
        } else {
            None
        };
        self.caption_dirty = true;
        self.metrics
            .increment_counter(metric_names::MODE_TRANSITIONS, 1);
    }

    fn after_scan(&mut self, transition: Option<ModeTransition>, tree: &dyn ElementTree) {
        self.metrics
            .increment_counter(metric_names::CLASSIFIER_SCANS, 1);
        if let Some(transition) = transition {
            self.apply_transition(transition, tree);
        }
    }

    fn record_tier_change(&mut self, change: TierChange) {
        debug!(
            "Quality tier changed: {:?} -> {:?} ({:?})",
            change.from, change.to, change.reason
        );
        self.metrics
            .increment_counter(metric_names::TIER_CHANGES, 1);
    }

    fn record_tick(&self, report: &TickReport, dt_ms: f32, started: Instant) {
        let metrics = &self.metrics;
        metrics.increment_counter(metric_names::FRAMES_TICKED, 1);
        metrics.record_histogram(metric_names::FRAME_DT_MS, dt_ms as f64);
        metrics.record_histogram(
            metric_names::TICK_TIME_US,
            started.elapsed().as_secs_f64() * 1_000_000.0,
        );
        metrics.increment_counter(
            metric_names::PARTICLES_EMITTED,
            report.particles_emitted as u64,
        );
        metrics.increment_counter(
            metric_names::PARTICLES_RELEASED,
            report.particles_removed as u64,
        );
        metrics.set_gauge(metric_names::PARTICLES_LIVE, report.particles_live as f64);
        metrics.increment_counter(
            metric_names::FRAME_INDEX_CHANGES,
            report.index_changes as u64,
        );
        metrics.set_gauge(metric_names::QUALITY_TIER, tier_level(report.tier));
        metrics.increment_counter(metric_names::SINK_WRITES, report.writes as u64);
        metrics.increment_counter(metric_names::SINK_REJECTED, report.rejected as u64);

        trace!(
            "Tick {}: dt={:.2}ms scale={} moved={} particles={} writes={}",
            report.frame,
            dt_ms,
            report.time_scale,
            report.followers_moved,
            report.particles_live,
            report.writes
        );
    }
}

fn viewport_centre(viewport: Viewport) -> Position {
    Position::new(viewport.width / 2.0, viewport.height / 2.0)
}

fn particle_style(particle: &Particle) -> VisualStyle {
    let size = 0.6 + (particle.visual_seed % 5) as f32 * 0.1;
    VisualStyle::at(particle.position)
        .scale(size)
        .opacity(particle.opacity())
}

fn tier_level(tier: QualityTier) -> f64 {
    match tier {
        QualityTier::High => 0.0,
        QualityTier::Medium => 1.0,
        QualityTier::Low => 2.0,
        QualityTier::Reduced => 3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DocumentTree, ElementDescriptor, ElementId, ElementTag};
    use crate::geometry::Rect;
    use crate::render::RecordingSink;
    use crate::scroll::{PinnedSection, ScrollFrame, SectionDescriptor};

    const FRAME_MS: f32 = 1000.0 / 60.0;

    fn document() -> DocumentTree {
        let mut tree = DocumentTree::new();
        tree.insert(ElementId(1), ElementDescriptor::default());
        tree.insert(
            ElementId(2),
            ElementDescriptor::with_tag(ElementTag::Button).parent(ElementId(1)),
        );
        tree.insert(
            ElementId(3),
            ElementDescriptor::default()
                .cursor("view")
                .cursor_text("Open")
                .parent(ElementId(1)),
        );
        tree.insert(
            ElementId(4),
            ElementDescriptor::default()
                .cursor("magnetic")
                .bounds(Rect::new(100.0, 100.0, 200.0, 100.0))
                .parent(ElementId(1)),
        );
        tree
    }

    fn config_with_section() -> MotionConfig {
        let mut config = MotionConfig::default();
        config.particles.seed = Some(7);
        config.scroll.sections.push(SectionDescriptor {
            range: PinnedSection::new(0.0, 900.0),
            frames: (0..4).map(|i| ScrollFrame::text(i, "frame")).collect(),
        });
        config
    }

    fn mount(config: MotionConfig, probe: StaticProbe) -> (MotionEngine, DocumentTree) {
        let tree = document();
        let engine = MotionEngine::mount(config, &probe, &tree).unwrap();
        (engine, tree)
    }

    #[test]
    fn test_mount_registers_subscriptions() {
        let (engine, _) = mount(MotionConfig::default(), StaticProbe::desktop());
        assert!(engine.cursor().is_some());
        assert!(engine.subscriptions().is_subscribed(SubscriptionKind::PointerMove));
        assert!(engine.subscriptions().is_subscribed(SubscriptionKind::RescanTimer));
        assert_eq!(engine.active_subscriptions(), 10);
        assert_eq!(engine.classifier().scans(), 1);
    }

    #[test]
    fn test_touch_only_disables_cursor() {
        let (mut engine, tree) = mount(config_with_section(), StaticProbe::touch());
        assert!(engine.cursor().is_none());
        assert!(!engine.subscriptions().is_subscribed(SubscriptionKind::PointerMove));
        assert!(engine.subscriptions().is_subscribed(SubscriptionKind::Scroll));

        let ignored = InputEvent::PointerMove {
            x: 10.0,
            y: 10.0,
            timestamp_ms: 0.0,
        };
        assert!(!engine.handle_event(ignored, &tree));

        let mut sink = RecordingSink::new();
        engine.tick(FRAME_MS, &mut sink);
        assert!(sink.style(RenderTarget::CursorRing).is_none());
        assert!(sink
            .style(RenderTarget::Frame {
                section: 0,
                index: 0
            })
            .is_some());
    }

    #[test]
    fn test_environment_probed_once_at_mount() {
        let mut probe = probe::MockEnvironmentProbe::new();
        probe.expect_viewport().times(1).return_const(Viewport::default());
        probe
            .expect_supports_fine_pointer()
            .times(1)
            .return_const(false);
        probe
            .expect_prefers_reduced_motion()
            .times(1)
            .return_const(false);
        probe
            .expect_network_quality()
            .times(1)
            .return_const(NetworkQuality::Constrained);
        probe.expect_memory_ratio().times(1).return_const(None::<f32>);
        probe
            .expect_supports_frame_timing()
            .times(1)
            .return_const(false);

        let tree = document();
        let mut engine = MotionEngine::mount(MotionConfig::default(), &probe, &tree).unwrap();
        assert!(engine.cursor().is_none());
        assert_eq!(engine.tier(), QualityTier::Reduced);

        // Ticking never goes back to the probe
        let mut sink = RecordingSink::new();
        engine.tick(FRAME_MS, &mut sink);
    }

    #[test]
    fn test_invalid_section_is_mount_error() {
        let mut config = MotionConfig::default();
        config.scroll.sections.push(SectionDescriptor {
            range: PinnedSection::new(0.0, 100.0),
            frames: Vec::new(),
        });
        let tree = document();
        let err = MotionEngine::mount(config, &StaticProbe::desktop(), &tree)
            .err()
            .unwrap();
        assert!(matches!(err, MotionError::Section { section: 0, .. }));
    }

    #[test]
    fn test_invalid_viewport_is_mount_error() {
        let mut probe = StaticProbe::desktop();
        probe.viewport.width = 0.0;
        let tree = document();
        let err = MotionEngine::mount(MotionConfig::default(), &probe, &tree)
            .err()
            .unwrap();
        assert!(matches!(err, MotionError::Input(_)));
    }

    #[test]
    fn test_pointer_drives_cursor() {
        let (mut engine, tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        engine.handle_event(
            InputEvent::PointerMove {
                x: 100.0,
                y: 100.0,
                timestamp_ms: 0.0,
            },
            &tree,
        );
        let report = engine.tick(FRAME_MS, &mut sink);
        assert_eq!(report.trail_len, 1);
        assert!(report.followers_moved > 0);

        for _ in 0..120 {
            engine.tick(FRAME_MS, &mut sink);
        }

        let dot = sink.style(RenderTarget::CursorDot).unwrap();
        assert!(dot.translate.distance_to(Position::new(100.0, 100.0)) < 1.0);
        // A still pointer adds nothing and the single entry ages out
        assert!(engine.cursor().unwrap().trail().is_empty());
    }

    #[test]
    fn test_hover_sets_caption() {
        let (mut engine, tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        engine.handle_event(InputEvent::PointerOver { target: ElementId(3) }, &tree);
        engine.tick(FRAME_MS, &mut sink);
        assert_eq!(engine.mode(), CursorMode::View);
        assert_eq!(sink.caption(), Some("Open"));

        engine.handle_event(InputEvent::PointerLeaveViewport, &tree);
        engine.tick(FRAME_MS, &mut sink);
        assert_eq!(engine.mode(), CursorMode::Default);
        assert_eq!(sink.caption(), None);
    }

    #[test]
    fn test_repeated_hover_counts_one_transition() {
        let (mut engine, tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        engine.handle_event(InputEvent::PointerOver { target: ElementId(2) }, &tree);
        engine.handle_event(InputEvent::PointerOver { target: ElementId(2) }, &tree);
        assert_eq!(engine.mode(), CursorMode::Button);
        assert_eq!(engine.classifier().transitions(), 1);
    }

    #[test]
    fn test_magnetic_hover_pulls_ring() {
        let (mut engine, tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        engine.handle_event(
            InputEvent::PointerMove {
                x: 120.0,
                y: 120.0,
                timestamp_ms: 0.0,
            },
            &tree,
        );
        engine.handle_event(InputEvent::PointerOver { target: ElementId(4) }, &tree);
        for _ in 0..240 {
            engine.tick(FRAME_MS, &mut sink);
        }

        // Centre is (200, 150); 30% of the way from the pointer
        let ring = sink.style(RenderTarget::CursorRing).unwrap();
        assert!(ring.translate.distance_to(Position::new(144.0, 129.0)) < 1.0);
        let dot = sink.style(RenderTarget::CursorDot).unwrap();
        assert!(dot.translate.distance_to(Position::new(120.0, 120.0)) < 1.0);
    }

    #[test]
    fn test_scroll_advances_sequencer() {
        let (mut engine, tree) = mount(config_with_section(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        engine.handle_event(
            InputEvent::Scroll {
                offset: 900.0,
                timestamp_ms: 0.0,
            },
            &tree,
        );
        let report = engine.tick(FRAME_MS, &mut sink);
        assert_eq!(report.index_changes, 1);
        assert_eq!(engine.sequencers()[0].active_index(), 3);

        for _ in 0..60 {
            engine.tick(FRAME_MS, &mut sink);
        }
        let active = sink
            .style(RenderTarget::Frame {
                section: 0,
                index: 3,
            })
            .unwrap();
        assert!((active.opacity - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_reduced_motion_forces_reduced_tier() {
        let (mut engine, tree) = mount(
            config_with_section(),
            StaticProbe::desktop().with_reduced_motion(true),
        );
        assert_eq!(engine.tier(), QualityTier::Reduced);

        let mut sink = RecordingSink::new();
        engine.handle_event(
            InputEvent::PointerMove {
                x: 300.0,
                y: 300.0,
                timestamp_ms: 0.0,
            },
            &tree,
        );
        engine.handle_event(InputEvent::PointerDown { timestamp_ms: 1.0 }, &tree);
        let report = engine.tick(FRAME_MS, &mut sink);

        // No animation: followers jump, nothing is emitted
        assert_eq!(report.particles_emitted, 0);
        let dot = sink.style(RenderTarget::CursorDot).unwrap();
        assert_eq!(dot.translate, Position::new(300.0, 300.0));
    }

    #[test]
    fn test_click_bursts_particles() {
        let (mut engine, tree) = mount(config_with_section(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        engine.handle_event(
            InputEvent::PointerMove {
                x: 300.0,
                y: 300.0,
                timestamp_ms: 0.0,
            },
            &tree,
        );
        engine.handle_event(InputEvent::PointerDown { timestamp_ms: 1.0 }, &tree);
        let report = engine.tick(FRAME_MS, &mut sink);
        assert_eq!(report.particles_emitted, 8);
        assert_eq!(sink.live_particles(), 8);

        // Every particle is freed and released within its maximum lifetime
        for _ in 0..60 {
            engine.tick(FRAME_MS, &mut sink);
        }
        assert!(engine.particles().is_empty());
        assert_eq!(sink.live_particles(), 0);
    }

    #[test]
    fn test_hidden_document_slows_time() {
        let (mut engine, tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        engine.handle_event(InputEvent::VisibilityChange { hidden: true }, &tree);
        let report = engine.tick(FRAME_MS, &mut sink);
        assert!((report.time_scale - HIDDEN_TIME_SCALE).abs() < 1e-9);
        assert_eq!(engine.active_subscriptions(), 10);

        engine.handle_event(InputEvent::VisibilityChange { hidden: false }, &tree);
        let report = engine.tick(FRAME_MS, &mut sink);
        assert_eq!(report.time_scale, 1.0);
    }

    #[test]
    fn test_hidden_stretch_splits_slow_frames() {
        let (mut engine, tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();

        // 25 fps for 400ms, hidden for 3s, then 25 fps for another 320ms
        for _ in 0..10 {
            engine.tick(40.0, &mut sink);
        }
        engine.handle_event(InputEvent::VisibilityChange { hidden: true }, &tree);
        for _ in 0..75 {
            engine.tick(40.0, &mut sink);
        }
        engine.handle_event(InputEvent::VisibilityChange { hidden: false }, &tree);
        for _ in 0..8 {
            engine.tick(40.0, &mut sink);
        }

        assert_eq!(engine.tier(), QualityTier::High);
        assert_eq!(engine.summary().governor.downgrades, 0);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let (mut engine, tree) = mount(config_with_section(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();
        engine.handle_event(
            InputEvent::PointerMove {
                x: 50.0,
                y: 50.0,
                timestamp_ms: 0.0,
            },
            &tree,
        );
        engine.tick(FRAME_MS, &mut sink);

        let first = engine.teardown(&mut sink);
        assert_eq!(first.subscriptions_released, 10);
        assert!(first.targets_released > 0);
        assert_eq!(sink.live_targets(), 0);

        let second = engine.teardown(&mut sink);
        assert_eq!(second, TeardownReport::default());
        assert_eq!(engine.active_subscriptions(), 0);

        // Torn-down engines ignore input and ticks
        assert!(!engine.handle_event(InputEvent::PointerDown { timestamp_ms: 2.0 }, &tree));
        assert_eq!(engine.tick(FRAME_MS, &mut sink), TickReport::default());
    }

    #[test]
    fn test_detached_targets_are_skipped() {
        let (mut engine, _) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();
        sink.detach(RenderTarget::CursorRing);

        let report = engine.tick(FRAME_MS, &mut sink);
        assert_eq!(report.rejected, 1);
        assert!(sink.style(RenderTarget::CursorRing).is_none());
        assert!(sink.style(RenderTarget::CursorDot).is_some());
    }

    #[test]
    fn test_rescan_picks_up_new_element() {
        let (mut engine, mut tree) = mount(MotionConfig::default(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();
        let registered = engine.classifier().registered();

        tree.insert(
            ElementId(9),
            ElementDescriptor::with_tag(ElementTag::Anchor).parent(ElementId(1)),
        );
        assert!(engine.poll_rescan(&tree).is_none());

        // 3 s of frames at 60 Hz
        for _ in 0..181 {
            engine.tick(FRAME_MS, &mut sink);
        }
        let report = engine.poll_rescan(&tree).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(engine.classifier().registered(), registered + 1);
    }

    #[test]
    fn test_summary_serializes() {
        let (mut engine, _) = mount(config_with_section(), StaticProbe::desktop());
        let mut sink = RecordingSink::new();
        engine.tick(FRAME_MS, &mut sink);

        let summary = engine.summary();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.sections.len(), 1);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"tier\":\"high\""));
    }
}
