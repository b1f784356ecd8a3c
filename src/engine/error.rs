//! Engine Error Types

use crate::input::InputError;
use crate::scroll::SequencerError;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors raised while mounting the engine
///
/// Everything after a successful mount degrades silently instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scroll section could not be built
    #[error("Scroll section {section}: {source}")]
    Section {
        /// Section index
        section: usize,
        /// Underlying sequencer error
        #[source]
        source: SequencerError,
    },

    /// Environment reported an unusable viewport
    #[error("Input setup failed: {0}")]
    Input(#[from] InputError),
}

impl MotionError {
    /// Build an [`MotionError::InvalidConfig`] from any message
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_error_display() {
        let err = MotionError::Section {
            section: 2,
            source: SequencerError::NoFrames,
        };
        assert_eq!(err.to_string(), "Scroll section 2: scroll section has no frames");
    }

    #[test]
    fn test_from_input_error() {
        let err: MotionError = InputError::InvalidPixelRatio(0.0).into();
        assert!(matches!(err, MotionError::Input(_)));
    }
}
