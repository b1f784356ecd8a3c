//! Configuration type definitions

use crate::scroll::{SectionDescriptor, SequencerConfig};
use serde::{Deserialize, Serialize};

/// Scroll sequencing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Crossfade tuning shared by every section
    #[serde(flatten)]
    pub sequencer: SequencerConfig,

    /// Pinned sections mounted with the engine
    #[serde(default)]
    pub sections: Vec<SectionDescriptor>,
}

/// Async frame driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Frame interval (ms)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,

    /// Input channel capacity
    #[serde(default = "default_input_buffer")]
    pub input_buffer: usize,
}

fn default_frame_interval_ms() -> f64 {
    1000.0 / 60.0
}
fn default_input_buffer() -> usize {
    256
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            input_buffer: default_input_buffer(),
        }
    }
}
