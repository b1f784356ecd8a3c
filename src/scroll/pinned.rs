//! Pinned section geometry and progress mapping
//!
//! A pinned section spans a range of document scroll offsets. While the
//! page scrolls through that range the section stays fixed in the viewport
//! and the scroll offset becomes a progress value in `[0, 1]`.
//!
//! ```text
//! progress = clamp((scroll - start) / (end - start), 0, 1)
//! index    = min(floor(progress · (N - 1)), N - 1)
//! ```

use serde::{Deserialize, Serialize};

/// Scroll range of a pinned section (document offsets, px)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PinnedSection {
    /// Offset at which pinning starts
    pub start: f32,
    /// Offset at which pinning ends
    pub end: f32,
}

impl PinnedSection {
    /// Create a section from its scroll range
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Section from container geometry
    ///
    /// The pinned range is the container height minus one viewport.
    pub fn from_container(top: f32, height: f32, viewport_height: f32) -> Self {
        let travel = (height - viewport_height).max(0.0);
        Self {
            start: top,
            end: top + travel,
        }
    }

    /// Scroll distance covered by the section
    pub fn length(&self) -> f32 {
        self.end - self.start
    }

    /// Both ends finite and ordered
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end >= self.start
    }

    /// Progress in `[0, 1]`; a zero-length section is always at 0
    pub fn progress(&self, scroll: f32) -> f32 {
        let length = self.length();
        if !length.is_finite() || length <= 0.0 || !scroll.is_finite() {
            return 0.0;
        }
        ((scroll - self.start) / length).clamp(0.0, 1.0)
    }
}

/// Active frame index for `progress` across `frame_count` frames
///
/// A position exactly on a segment boundary maps to the frame starting
/// there, so `progress == 1.0` lands on the last frame.
pub fn frame_index(progress: f32, frame_count: usize) -> usize {
    if frame_count <= 1 || !progress.is_finite() {
        return 0;
    }
    let last = frame_count - 1;
    let position = progress.clamp(0.0, 1.0) * last as f32;
    (position.floor() as usize).min(last)
}

/// Progress within the active frame's segment
///
/// The last frame owns only the end point and reports 1.0; a single frame
/// follows the section progress directly.
pub fn local_progress(progress: f32, frame_count: usize) -> f32 {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if frame_count <= 1 {
        return progress;
    }
    let index = frame_index(progress, frame_count);
    if index == frame_count - 1 {
        return 1.0;
    }
    progress * (frame_count - 1) as f32 - index as f32
}
