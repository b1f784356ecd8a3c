//! Input sampling
//!
//! Pointer and scroll events enter the motion core here. The browser side
//! subscribes with passive listeners and forwards each event as an
//! [`InputEvent`]; the [`InputSampler`] normalizes coordinates, derives
//! velocity and keeps a single latest sample per stream for the frame loop.
//!
//! # Data Flow
//!
//! ```text
//! pointermove / scroll (passive)
//!   └─> InputEvent
//!       └─> InputSampler
//!           ├─> CoordinateNormalizer (clamp, device pixel ratio)
//!           └─> latest slot (last write wins)
//!               └─> frame tick reads one snapshot
//! ```

pub mod coordinates;
pub mod error;
pub mod sampler;

pub use coordinates::{CoordinateNormalizer, CoordinateSpace, Viewport};
pub use error::{InputError, Result};
pub use sampler::{InputSampler, PointerSample, SamplerStats, ScrollSample};

use crate::dom::ElementId;
use serde::{Deserialize, Serialize};

/// Event forwarded from the document-level listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer moved (clientX/clientY)
    PointerMove {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
        /// Event timestamp (ms)
        timestamp_ms: f64,
    },

    /// Pointer entered an element (mouseover)
    PointerOver {
        /// Element under the pointer
        target: ElementId,
    },

    /// Pointer left the viewport (mouseout with no related target)
    PointerLeaveViewport,

    /// Pointer re-entered the viewport (mouseover with no related target)
    PointerEnterViewport,

    /// Primary button pressed
    PointerDown {
        /// Event timestamp (ms)
        timestamp_ms: f64,
    },

    /// Primary button released
    PointerUp {
        /// Event timestamp (ms)
        timestamp_ms: f64,
    },

    /// Document scrolled
    Scroll {
        /// Scroll offset (pixels)
        offset: f32,
        /// Event timestamp (ms)
        timestamp_ms: f64,
    },

    /// Viewport resized
    Resize {
        /// New width
        width: f32,
        /// New height
        height: f32,
    },

    /// Document visibility changed
    VisibilityChange {
        /// Document is hidden
        hidden: bool,
    },
}
