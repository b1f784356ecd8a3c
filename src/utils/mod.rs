//! Utilities
//!
//! ## Metrics
//!
//! The [`metrics`] module tracks engine statistics:
//!
//! ```rust
//! use campus_motion::utils::{metric_names, MetricsCollector};
//!
//! let metrics = MetricsCollector::new();
//! metrics.increment_counter(metric_names::FRAMES_TICKED, 1);
//! metrics.record_histogram(metric_names::FRAME_DT_MS, 16.7);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.counters[metric_names::FRAMES_TICKED], 1);
//! ```
//!
//! ## Error Formatting
//!
//! The [`errors`] module turns an `anyhow` chain into a terminal message
//! with hints for configuration, scroll section and trace problems.

pub mod errors;
pub mod metrics;

pub use errors::{categorize, format_user_error, ErrorCategory};
pub use metrics::{metric_names, HistogramStats, MetricsCollector, MetricsSnapshot};
