//! Environment probe
//!
//! Feature detection the engine runs once at mount. Capabilities are
//! probed directly (pointer precision, media preferences); nothing is
//! inferred from a user agent.

use crate::input::Viewport;
use crate::performance::NetworkQuality;
use serde::{Deserialize, Serialize};

/// Capability and preference queries answered by the host
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentProbe {
    /// A fine pointer (mouse, trackpad) is available
    fn supports_fine_pointer(&self) -> bool;

    /// User asked for reduced motion
    fn prefers_reduced_motion(&self) -> bool;

    /// Current network quality
    fn network_quality(&self) -> NetworkQuality {
        NetworkQuality::Unknown
    }

    /// Heap usage ratio, when the host exposes it
    fn memory_ratio(&self) -> Option<f32> {
        None
    }

    /// Frame timing is observable
    fn supports_frame_timing(&self) -> bool {
        true
    }

    /// Viewport at mount
    fn viewport(&self) -> Viewport {
        Viewport::default()
    }
}

/// Probe answering from fixed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticProbe {
    /// Fine pointer available
    #[serde(default = "default_true")]
    pub fine_pointer: bool,

    /// Reduced motion preferred
    #[serde(default)]
    pub reduced_motion: bool,

    /// Network quality
    #[serde(default)]
    pub network: NetworkQuality,

    /// Heap usage ratio
    #[serde(default)]
    pub memory_ratio: Option<f32>,

    /// Frame timing observable
    #[serde(default = "default_true")]
    pub frame_timing: bool,

    /// Viewport
    #[serde(default)]
    pub viewport: Viewport,
}

fn default_true() -> bool {
    true
}

impl Default for StaticProbe {
    fn default() -> Self {
        Self {
            fine_pointer: true,
            reduced_motion: false,
            network: NetworkQuality::Unknown,
            memory_ratio: None,
            frame_timing: true,
            viewport: Viewport::default(),
        }
    }
}

impl StaticProbe {
    /// Desktop with a mouse and no preferences
    pub fn desktop() -> Self {
        Self::default()
    }

    /// Touch-only device
    pub fn touch() -> Self {
        Self {
            fine_pointer: false,
            ..Self::default()
        }
    }

    /// Builder: set the reduced-motion preference
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Builder: set the network quality
    pub fn with_network(mut self, network: NetworkQuality) -> Self {
        self.network = network;
        self
    }
}

impl EnvironmentProbe for StaticProbe {
    fn supports_fine_pointer(&self) -> bool {
        self.fine_pointer
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn network_quality(&self) -> NetworkQuality {
        self.network
    }

    fn memory_ratio(&self) -> Option<f32> {
        self.memory_ratio
    }

    fn supports_frame_timing(&self) -> bool {
        self.frame_timing
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_defaults_from_empty_json() {
        let probe: StaticProbe = serde_json::from_str("{}").unwrap();
        assert!(probe.supports_fine_pointer());
        assert!(!probe.prefers_reduced_motion());
        assert_eq!(probe.viewport(), Viewport::default());
    }

    #[test]
    fn test_touch_probe() {
        assert!(!StaticProbe::touch().supports_fine_pointer());
    }
}
