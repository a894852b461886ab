//! Time label and scrubber view derivation
//!
//! Everything here is computed from a position and a duration on demand.
//! Nothing is cached, so the label, the range value and the progress fill
//! can never drift apart.

use serde::{Deserialize, Serialize};

/// Format seconds as `M:SS`
///
/// Seconds are floored and zero-padded; minutes are not wrapped into hours.
pub fn format_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Progress fill percentage: `floor(p) / max(floor(d), 1) * 100`
pub fn progress_percent(position_secs: f64, duration_secs: f64) -> f64 {
    let position = whole_seconds(position_secs) as f64;
    let duration = whole_seconds(duration_secs).max(1) as f64;
    position / duration * 100.0
}

/// Floor to whole seconds; NaN, infinite and negative values map to 0
fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

/// Snapshot of everything the scrubber UI renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubberView {
    /// Range input value (whole seconds)
    pub value: u64,

    /// Range input max, `floor(duration)`
    pub max: u64,

    /// Width of the progress fill
    pub progress_percent: f64,

    /// Current time label
    pub current_label: String,

    /// Duration label
    pub duration_label: String,
}

impl ScrubberView {
    /// Derive the view for a displayed position and a duration
    pub fn derive(position_secs: f64, duration_secs: f64) -> Self {
        Self {
            value: whole_seconds(position_secs),
            max: whole_seconds(duration_secs),
            progress_percent: progress_percent(position_secs, duration_secs),
            current_label: format_time(position_secs),
            duration_label: format_time(duration_secs),
        }
    }
}
