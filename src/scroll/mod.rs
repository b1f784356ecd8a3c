//! Scroll-driven content sequencing
//!
//! Each pinned section owns a [`ScrollSequencer`]. Scroll samples move the
//! active frame; frame ticks advance the crossfade.
//!
//! # Data Flow
//!
//! ```text
//! scroll offset
//!   └─> PinnedSection::progress (clamped, 0 for empty sections)
//!       └─> frame_index ─> active index (reversible, no hysteresis)
//!           └─> crossfade (time-driven, eased) ─> RenderSink
//! ```

pub mod easing;
pub mod pinned;
pub mod sequencer;

pub use easing::Easing;
pub use pinned::{frame_index, local_progress, PinnedSection};
pub use sequencer::{
    FrameContent, FrameVisual, IndexChange, Result, ScrollFrame, ScrollSequencer,
    SequencerConfig, SequencerError,
};

use serde::{Deserialize, Serialize};

/// Static description of one pinned section and its frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Scroll range
    #[serde(flatten)]
    pub range: PinnedSection,
    /// Frames in display order
    pub frames: Vec<ScrollFrame>,
}

impl SectionDescriptor {
    /// Build the sequencer for this section
    pub fn build(&self, config: &SequencerConfig) -> Result<ScrollSequencer> {
        ScrollSequencer::new(self.range, self.frames.clone(), config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "start": 800.0,
            "end": 2800.0,
            "frames": [
                {"index": 0, "content": {"text": "Campus"}},
                {"index": 1, "content": {"text": "Labs", "image": "labs.jpg"}, "highlights": ["AI", "Robotics"]}
            ]
        }"#;
        let section: SectionDescriptor = serde_json::from_str(json).unwrap();
        let sequencer = section.build(&SequencerConfig::default()).unwrap();
        assert_eq!(sequencer.frame_count(), 2);
        assert_eq!(sequencer.section().start, 800.0);
    }
}
