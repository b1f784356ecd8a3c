//! Cursor modes and their visual presets
//!
//! Every mode is bound to a static preset. Presets are plain data; the
//! engine applies quality flags (blur) and press state on top of them.

use serde::{Deserialize, Serialize};

/// Cursor interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CursorMode {
    /// Nothing interactive under the pointer
    #[default]
    Default,

    /// Generic interactive element (links, cards)
    Hover,

    /// Text entry field
    Text,

    /// Button or call to action
    Button,

    /// Draggable surface (carousels, sliders)
    Drag,

    /// Media that opens a detail view
    View,

    /// Element that pulls the cursor ring toward its centre
    Magnetic,
}

impl CursorMode {
    /// All modes in declaration order
    pub const ALL: [CursorMode; 7] = [
        Self::Default,
        Self::Hover,
        Self::Text,
        Self::Button,
        Self::Drag,
        Self::View,
        Self::Magnetic,
    ];

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Default => "Plain ring and dot",
            Self::Hover => "Enlarged ring over interactive elements",
            Self::Text => "Thin caret for text entry",
            Self::Button => "Filled ring over buttons",
            Self::Drag => "Wide ring with drag caption",
            Self::View => "Large filled disc with view caption",
            Self::Magnetic => "Ring pulled toward the element centre",
        }
    }

    /// Visual preset for this mode
    pub fn preset(&self) -> CursorPreset {
        match self {
            Self::Default => CursorPreset {
                ring_scale: 1.0,
                dot_scale: 1.0,
                fill: Rgba::TRANSPARENT,
                border_width: 1.5,
                blur_px: 0.0,
                ring_opacity: 0.6,
            },
            Self::Hover => CursorPreset {
                ring_scale: 1.6,
                dot_scale: 0.5,
                fill: Rgba::new(255, 255, 255, 0.08),
                border_width: 1.0,
                blur_px: 2.0,
                ring_opacity: 0.8,
            },
            Self::Text => CursorPreset {
                ring_scale: 0.4,
                dot_scale: 0.0,
                fill: Rgba::TRANSPARENT,
                border_width: 2.0,
                blur_px: 0.0,
                ring_opacity: 1.0,
            },
            Self::Button => CursorPreset {
                ring_scale: 1.8,
                dot_scale: 0.0,
                fill: Rgba::new(255, 196, 0, 0.25),
                border_width: 0.0,
                blur_px: 4.0,
                ring_opacity: 1.0,
            },
            Self::Drag => CursorPreset {
                ring_scale: 2.4,
                dot_scale: 0.0,
                fill: Rgba::new(20, 20, 20, 0.6),
                border_width: 0.0,
                blur_px: 6.0,
                ring_opacity: 1.0,
            },
            Self::View => CursorPreset {
                ring_scale: 3.0,
                dot_scale: 0.0,
                fill: Rgba::new(255, 255, 255, 0.9),
                border_width: 0.0,
                blur_px: 8.0,
                ring_opacity: 1.0,
            },
            Self::Magnetic => CursorPreset {
                ring_scale: 2.0,
                dot_scale: 0.6,
                fill: Rgba::new(255, 255, 255, 0.12),
                border_width: 1.0,
                blur_px: 3.0,
                ring_opacity: 0.9,
            },
        }
    }

    /// Modes that render a caption inside the ring
    pub fn shows_caption(&self) -> bool {
        matches!(self, Self::Drag | Self::View | Self::Button)
    }

    /// Modes that pull the ring toward the hovered element
    pub fn is_magnetic(&self) -> bool {
        matches!(self, Self::Magnetic)
    }
}

impl std::fmt::Display for CursorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Hover => write!(f, "Hover"),
            Self::Text => write!(f, "Text"),
            Self::Button => write!(f, "Button"),
            Self::Drag => write!(f, "Drag"),
            Self::View => write!(f, "View"),
            Self::Magnetic => write!(f, "Magnetic"),
        }
    }
}

impl std::str::FromStr for CursorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "none" | "auto" => Ok(Self::Default),
            "hover" | "link" | "pointer" => Ok(Self::Hover),
            "text" | "input" | "caret" => Ok(Self::Text),
            "button" | "cta" => Ok(Self::Button),
            "drag" | "grab" | "slide" => Ok(Self::Drag),
            "view" | "zoom" | "play" => Ok(Self::View),
            "magnetic" | "magnet" => Ok(Self::Magnetic),
            _ => Err(format!("Unknown cursor mode: {}", s)),
        }
    }
}

/// RGBA colour with fractional alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (0.0-1.0)
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    /// Create a colour
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Static visual preset for a cursor mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPreset {
    /// Ring scale factor
    pub ring_scale: f32,
    /// Dot scale factor (0 hides the dot)
    pub dot_scale: f32,
    /// Ring fill
    pub fill: Rgba,
    /// Ring border width (px)
    pub border_width: f32,
    /// Backdrop blur (px)
    pub blur_px: f32,
    /// Ring opacity
    pub ring_opacity: f32,
}
