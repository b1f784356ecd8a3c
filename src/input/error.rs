//! Input Sampling Error Types

use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Input module error types
///
/// None of these reach the user: the sampler drops the offending sample
/// and keeps the previous one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Non-finite coordinate from the event source
    #[error("Invalid coordinate: ({0}, {1})")]
    InvalidCoordinate(f32, f32),

    /// Viewport with a zero or negative dimension
    #[error("Invalid viewport: {0}x{1}")]
    InvalidViewport(f32, f32),

    /// Device pixel ratio that cannot scale coordinates
    #[error("Invalid device pixel ratio: {0}")]
    InvalidPixelRatio(f32),

    /// NaN or infinite sample timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    /// Sample timestamp went backwards
    #[error("Timestamp went backwards: {current}ms < {previous}ms")]
    TimestampRegression {
        /// Timestamp of the previous accepted sample
        previous: f64,
        /// Timestamp of the rejected sample
        current: f64,
    },

    /// Pointer subsystem is disabled on this device
    #[error("Pointer input is disabled (no fine pointer available)")]
    PointerDisabled,
}

impl InputError {
    /// Transient errors only affect a single sample
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinate(_, _)
                | Self::InvalidTimestamp(_)
                | Self::TimestampRegression { .. }
        )
    }
}
