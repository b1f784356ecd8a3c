//! Scroll Sequencer
//!
//! Maps a pinned section's scroll progress onto one active content frame
//! and crossfades between frames.
//!
//! The active index is a pure function of progress: scrubbing forward and
//! back yields mirrored index sequences. The crossfade is not. It runs on
//! its own clock for `transition_ms` after every index change, so fast
//! scrolling cannot make frames snap. A change during a running crossfade
//! restarts it from whatever every frame currently shows.

use super::easing::Easing;
use super::pinned::{frame_index, local_progress, PinnedSection};
use crate::geometry::Position;
use crate::render::{RenderSink, RenderTarget, VisualStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// Sequencer construction errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SequencerError {
    /// A section needs at least one frame
    #[error("scroll section has no frames")]
    NoFrames,

    /// Frame list is not ordered by index
    #[error("frame at position {position} has index {found}")]
    FrameOrder {
        /// Position in the list
        position: usize,
        /// Index carried by the frame
        found: usize,
    },

    /// Section range is not finite or ends before it starts
    #[error("invalid section range {start}..{end}")]
    InvalidSection {
        /// Range start
        start: f32,
        /// Range end
        end: f32,
    },
}

/// Result type for sequencer construction
pub type Result<T> = std::result::Result<T, SequencerError>;

/// Content shown by a frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameContent {
    /// Text block
    #[serde(default)]
    pub text: String,
    /// Image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// One content frame of a pinned section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollFrame {
    /// Position in the sequence
    pub index: usize,
    /// Frame content
    #[serde(default)]
    pub content: FrameContent,
    /// Highlights revealed progressively while the frame is active
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl ScrollFrame {
    /// Text-only frame
    pub fn text(index: usize, text: &str) -> Self {
        Self {
            index,
            content: FrameContent {
                text: text.to_string(),
                image: None,
            },
            highlights: Vec::new(),
        }
    }
}

/// Crossfade tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Crossfade duration (ms)
    #[serde(default = "default_transition_ms")]
    pub transition_ms: f32,

    /// Crossfade curve
    #[serde(default)]
    pub easing: Easing,

    /// Scale inactive frames settle at; anything above 0 keeps a shrunken
    /// ghost of the outgoing frame
    #[serde(default = "default_inactive_scale")]
    pub inactive_scale: f32,
}

fn default_transition_ms() -> f32 {
    600.0
}
fn default_inactive_scale() -> f32 {
    0.0
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            transition_ms: default_transition_ms(),
            easing: Easing::default(),
            inactive_scale: default_inactive_scale(),
        }
    }
}

/// Opacity and scale of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameVisual {
    /// Opacity
    pub opacity: f32,
    /// Scale
    pub scale: f32,
}

impl FrameVisual {
    fn lerp(self, to: FrameVisual, t: f32) -> FrameVisual {
        FrameVisual {
            opacity: self.opacity + (to.opacity - self.opacity) * t,
            scale: self.scale + (to.scale - self.scale) * t,
        }
    }
}

/// Active index change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexChange {
    /// Previous active index
    pub from: usize,
    /// New active index
    pub to: usize,
}

#[derive(Debug, Clone)]
struct Crossfade {
    /// Every frame's visual when the crossfade started
    start: Vec<FrameVisual>,
    elapsed_ms: f32,
}

/// Scroll sequencer for one pinned section
pub struct ScrollSequencer {
    section: PinnedSection,
    frames: Vec<ScrollFrame>,
    config: SequencerConfig,

    active: usize,
    progress: f32,

    visuals: Vec<FrameVisual>,
    crossfade: Option<Crossfade>,

    index_changes: u64,
}

impl ScrollSequencer {
    /// Create a sequencer showing frame 0
    pub fn new(
        section: PinnedSection,
        frames: Vec<ScrollFrame>,
        config: SequencerConfig,
    ) -> Result<Self> {
        if frames.is_empty() {
            return Err(SequencerError::NoFrames);
        }
        if let Some((position, frame)) = frames.iter().enumerate().find(|(i, f)| f.index != *i) {
            return Err(SequencerError::FrameOrder {
                position,
                found: frame.index,
            });
        }
        if !section.is_valid() {
            return Err(SequencerError::InvalidSection {
                start: section.start,
                end: section.end,
            });
        }

        let mut sequencer = Self {
            section,
            visuals: Vec::with_capacity(frames.len()),
            frames,
            config,
            active: 0,
            progress: 0.0,
            crossfade: None,
            index_changes: 0,
        };
        sequencer.visuals = (0..sequencer.frames.len())
            .map(|i| sequencer.goal(i))
            .collect();
        Ok(sequencer)
    }

    fn goal(&self, index: usize) -> FrameVisual {
        if index == self.active {
            FrameVisual {
                opacity: 1.0,
                scale: 1.0,
            }
        } else {
            FrameVisual {
                opacity: 0.0,
                scale: self.config.inactive_scale,
            }
        }
    }

    /// Feed a document scroll offset
    pub fn update_scroll(&mut self, scroll: f32) -> Option<IndexChange> {
        self.set_progress(self.section.progress(scroll))
    }

    /// Set section progress directly
    pub fn set_progress(&mut self, progress: f32) -> Option<IndexChange> {
        if !progress.is_finite() {
            return None;
        }
        self.progress = progress.clamp(0.0, 1.0);

        let index = frame_index(self.progress, self.frames.len());
        if index == self.active {
            return None;
        }

        let change = IndexChange {
            from: self.active,
            to: index,
        };
        self.active = index;
        self.index_changes += 1;
        self.crossfade = Some(Crossfade {
            start: self.visuals.clone(),
            elapsed_ms: 0.0,
        });
        debug!(
            "Active frame changed: {} -> {} (progress={:.3})",
            change.from, change.to, self.progress
        );
        Some(change)
    }

    /// Advance the crossfade by `dt_ms`
    ///
    /// With `animate == false` frames jump to their final visuals. Returns
    /// whether any visual changed.
    pub fn tick(&mut self, dt_ms: f32, animate: bool) -> bool {
        let Some(crossfade) = self.crossfade.as_mut() else {
            return false;
        };

        let t = if animate && self.config.transition_ms > 0.0 {
            crossfade.elapsed_ms += dt_ms.max(0.0);
            (crossfade.elapsed_ms / self.config.transition_ms).min(1.0)
        } else {
            1.0
        };
        let eased = self.config.easing.apply(t);

        let start = crossfade.start.clone();
        for (i, from) in start.into_iter().enumerate() {
            self.visuals[i] = from.lerp(self.goal(i), eased);
        }

        if t >= 1.0 {
            trace!("Crossfade to frame {} finished", self.active);
            self.crossfade = None;
        }
        true
    }

    /// Write every frame's visual and the highlight reveal to the sink
    pub fn render(&self, section: usize, sink: &mut dyn RenderSink) -> usize {
        let mut accepted = 0;
        for (index, visual) in self.visuals.iter().enumerate() {
            let style = VisualStyle::at(Position::ZERO)
                .scale(visual.scale)
                .opacity(visual.opacity);
            accepted += sink.write(RenderTarget::Frame { section, index }, &style) as usize;
        }
        sink.set_highlights(section, self.active, self.revealed_highlights());
        accepted
    }

    /// Render targets owned by this sequencer
    pub fn targets(&self, section: usize) -> Vec<RenderTarget> {
        (0..self.frames.len())
            .map(|index| RenderTarget::Frame { section, index })
            .collect()
    }

    /// Highlights of the active frame revealed at the current progress
    pub fn revealed_highlights(&self) -> usize {
        let total = self.frames[self.active].highlights.len();
        let local = self.local_progress();
        ((local * (total + 1) as f32).floor() as usize).min(total)
    }

    /// Active frame index
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Active frame
    pub fn active_frame(&self) -> &ScrollFrame {
        &self.frames[self.active]
    }

    /// Section progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Progress within the active segment
    pub fn local_progress(&self) -> f32 {
        local_progress(self.progress, self.frames.len())
    }

    /// Current visual of a frame
    pub fn visual(&self, index: usize) -> Option<FrameVisual> {
        self.visuals.get(index).copied()
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Crossfade running
    pub fn is_transitioning(&self) -> bool {
        self.crossfade.is_some()
    }

    /// Index changes so far
    pub fn index_changes(&self) -> u64 {
        self.index_changes
    }

    /// Section range
    pub fn section(&self) -> PinnedSection {
        self.section
    }
}
