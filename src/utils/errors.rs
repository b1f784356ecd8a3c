//! User-facing error formatting
//!
//! Turns an error chain from the replay tool into a message with a short
//! troubleshooting section. The category is picked from the typed errors
//! found in the chain, falling back to the message text.

use crate::engine::MotionError;
use std::fmt::Write;

/// Broad error category used to pick the troubleshooting hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration file unreadable, unparsable or invalid
    Config,
    /// Scroll section rejected at mount
    Section,
    /// Replay trace unreadable or malformed
    Trace,
    /// Anything else
    Generic,
}

/// Categorize an error chain
pub fn categorize(error: &anyhow::Error) -> ErrorCategory {
    for cause in error.chain() {
        if let Some(motion) = cause.downcast_ref::<MotionError>() {
            return match motion {
                MotionError::Section { .. } => ErrorCategory::Section,
                MotionError::InvalidConfig(_) => ErrorCategory::Config,
                MotionError::Input(_) => ErrorCategory::Trace,
            };
        }
        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return ErrorCategory::Config;
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return ErrorCategory::Trace;
        }
    }

    let message = error.to_string().to_lowercase();
    if message.contains("config") {
        ErrorCategory::Config
    } else if message.contains("trace") {
        ErrorCategory::Trace
    } else {
        ErrorCategory::Generic
    }
}

/// Format an error for the terminal
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(output).ok();
    writeln!(output, "ERROR").ok();
    writeln!(output).ok();

    match categorize(error) {
        ErrorCategory::Config => format_config_error(&mut output),
        ErrorCategory::Section => format_section_error(&mut output),
        ErrorCategory::Trace => format_trace_error(&mut output),
        ErrorCategory::Generic => {
            writeln!(output, "The replay failed.").ok();
        }
    }

    writeln!(output).ok();
    writeln!(output, "Technical Details:").ok();
    writeln!(output, "  {:#}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Run with -vv for debug logs.").ok();

    output
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output, "  1. File not found (pass it with --config <path>)").ok();
    writeln!(output, "  2. Invalid TOML syntax").ok();
    writeln!(output, "  3. A value outside its allowed range").ok();
    writeln!(output, "     → trail_capacity must be 1..=64").ok();
    writeln!(output, "     → tier_thresholds.fps_low must be below fps_high").ok();
    writeln!(output, "     → spring stiffness, damping and mass must be positive").ok();
}

fn format_section_error(output: &mut String) {
    writeln!(output, "Scroll Section Error").ok();
    writeln!(output).ok();
    writeln!(output, "A [[scroll.sections]] entry could not be mounted.").ok();
    writeln!(output, "  → every section needs at least one frame").ok();
    writeln!(output, "  → frame indices must be 0, 1, 2, ... in order").ok();
    writeln!(output, "  → start and end must be finite").ok();
}

fn format_trace_error(output: &mut String) {
    writeln!(output, "Trace Error").ok();
    writeln!(output).ok();
    writeln!(output, "The replay trace could not be used.").ok();
    writeln!(output, "  → the trace is JSON with `environment`, `document` and `events`").ok();
    writeln!(output, "  → each entry is {{\"at_ms\": .., \"event\": {{\"type\": ..}}}}").ok();
    writeln!(output, "  → the environment viewport must have a positive size").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::SequencerError;
    use anyhow::Context;

    #[test]
    fn test_config_error_category() {
        let err: anyhow::Result<()> =
            Err(MotionError::config("trail_capacity must be between 1 and 64"))
                .context("Invalid configuration");
        let err = err.unwrap_err();
        assert_eq!(categorize(&err), ErrorCategory::Config);
        let formatted = format_user_error(&err);
        assert!(formatted.contains("Configuration Error"));
        assert!(formatted.contains("trail_capacity"));
    }

    #[test]
    fn test_section_error_category() {
        let err = anyhow::Error::new(MotionError::Section {
            section: 0,
            source: SequencerError::NoFrames,
        });
        assert_eq!(categorize(&err), ErrorCategory::Section);
    }

    #[test]
    fn test_trace_parse_error_category() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = anyhow::Error::new(parse).context("Failed to parse trace");
        assert_eq!(categorize(&err), ErrorCategory::Trace);
        assert!(format_user_error(&err).contains("Trace Error"));
    }

    #[test]
    fn test_generic_fallback() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(categorize(&err), ErrorCategory::Generic);
    }
}
