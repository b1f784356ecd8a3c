//! Easing curves for frame crossfades

use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized transition time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Slow start
    EaseIn,
    /// Slow finish
    EaseOut,
    /// Slow start and finish
    #[default]
    EaseInOut,
}

impl Easing {
    /// Map `t` in `[0, 1]` onto the curve (input is clamped)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t * t,
            Self::EaseOut => {
                let t1 = t - 1.0;
                t1 * t1 * t1 + 1.0
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0 * t - 2.0;
                    0.5 * t1 * t1 * t1 + 1.0
                }
            }
        }
    }
}

impl std::str::FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(Self::Linear),
            "ease_in" | "in" => Ok(Self::EaseIn),
            "ease_out" | "out" => Ok(Self::EaseOut),
            "ease_in_out" | "ease" | "in_out" => Ok(Self::EaseInOut),
            _ => Err(format!("Unknown easing: {}", s)),
        }
    }
}
