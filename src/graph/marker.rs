//! Time-axis labels.
//!
//! A label is placed on a sample when the sample's time, taken modulo the time
//! scale, is smaller than the previous sample's. The test looks only at the
//! consecutive pair: a gap spanning two whole periods produces a single label
//! (or none), and a backwards jump in time can produce a label where no
//! boundary was crossed.

use super::sample::Sample;

/// Text for the first sample of every capture, whatever its timestamp.
pub const FIRST_LABEL: &str = "00:00";

/// A time label anchored at an x pixel position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLabel {
    pub x: i32,
    pub text: String,
}

/// Returns true when a time-scale boundary lies between `prev` and `curr`.
pub fn crosses_boundary(prev_ms: u64, curr_ms: u64, time_scale_ms: u64) -> bool {
    let scale = time_scale_ms.max(1);
    prev_ms % scale > curr_ms % scale
}

/// Formats milliseconds as zero-padded `mm:ss`. Minutes are not wrapped.
pub fn format_time(time_ms: u64) -> String {
    let seconds = (time_ms / 1000) % 60;
    let minutes = time_ms / 60_000;
    format!("{minutes:02}:{seconds:02}")
}

/// Label text for the sample at `index`, if it gets one.
///
/// `prev` must be the sample at `index - 1` when `index > 0`.
pub fn label_for(index: usize, prev: Option<&Sample>, curr: &Sample, time_scale_ms: u64) -> Option<String> {
    if index == 0 {
        return Some(FIRST_LABEL.to_string());
    }
    let prev = prev?;
    crosses_boundary(prev.time_ms, curr.time_ms, time_scale_ms).then(|| format_time(curr.time_ms))
}
