//! Time parsing, formatting and sorted-timestamp lookups
//!
//! The lookup helpers (`nearest`, `previous`, `next`) expect an ascending,
//! deduplicated slice of finite values. [`sorted_set`] produces one from any
//! keyframe list, borrowing when the input already qualifies.

use std::borrow::Cow;

use crate::error::{AlignError, AlignResult};

/// Convert a frame count to seconds
pub fn frames_to_time(frames: i64, fps: f64) -> f64 {
    frames as f64 / fps
}

/// Convert seconds to the nearest whole frame
pub fn time_to_frames(seconds: f64, fps: f64) -> i64 {
    (seconds * fps).round() as i64
}

/// Normalize a timestamp list: drop non-finite values, sort ascending, dedup
pub fn sorted_set(values: &[f64]) -> Cow<'_, [f64]> {
    let normalized = values.iter().all(|v| v.is_finite())
        && values.windows(2).all(|w| w[0] < w[1]);
    if normalized {
        return Cow::Borrowed(values);
    }

    let mut owned: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    owned.sort_by(f64::total_cmp);
    owned.dedup();
    Cow::Owned(owned)
}

/// Sort timestamps ascending in place (NaN sorts last)
pub fn sort_times(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

/// Whether `value` is an element of the sorted set
pub fn contains(value: f64, sorted: &[f64]) -> bool {
    sorted
        .binary_search_by(|probe| probe.total_cmp(&value))
        .is_ok()
}

/// Element of `sorted` closest to `value`; ties go to the earlier element
///
/// Returns `value` itself when the set is empty.
pub fn nearest(value: f64, sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return value;
    }

    let idx = sorted.partition_point(|&k| k < value);
    if idx == 0 {
        return sorted[0];
    }
    if idx == sorted.len() {
        return sorted[sorted.len() - 1];
    }

    let before = sorted[idx - 1];
    let after = sorted[idx];
    if value - before <= after - value {
        before
    } else {
        after
    }
}

/// Largest element `< value`, or the first element when none exists
///
/// Returns `value` itself when the set is empty.
pub fn previous(value: f64, sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return value;
    }

    let idx = sorted.partition_point(|&k| k < value);
    if idx == 0 {
        sorted[0]
    } else {
        sorted[idx - 1]
    }
}

/// Smallest element `> value`, or the last element when none exists
///
/// Returns `value` itself when the set is empty.
pub fn next(value: f64, sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return value;
    }

    let idx = sorted.partition_point(|&k| k <= value);
    if idx == sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[idx]
    }
}

/// Time parser for the formats accepted on the command line
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Parse `SS.ms`, `MM:SS.ms` or `HH:MM:SS.ms` into seconds
    pub fn parse_time(&self, time_str: &str) -> AlignResult<f64> {
        let time_str = time_str.trim();
        let invalid = || {
            AlignError::validation(format!(
                "Invalid time '{}'. Expected seconds, MM:SS.ms or HH:MM:SS.ms",
                time_str
            ))
        };

        let parts: Vec<&str> = time_str.split(':').collect();
        let seconds = match parts.as_slice() {
            [secs] => secs.parse::<f64>().map_err(|_| invalid())?,
            [mins, secs] => {
                let minutes: u32 = mins.parse().map_err(|_| invalid())?;
                let seconds: f64 = secs.parse().map_err(|_| invalid())?;
                if !(0.0..60.0).contains(&seconds) {
                    return Err(invalid());
                }
                minutes as f64 * 60.0 + seconds
            }
            [hours, mins, secs] => {
                let hours: u32 = hours.parse().map_err(|_| invalid())?;
                let minutes: u32 = mins.parse().map_err(|_| invalid())?;
                let seconds: f64 = secs.parse().map_err(|_| invalid())?;
                if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
                    return Err(invalid());
                }
                hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds
            }
            _ => return Err(invalid()),
        };

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        Ok(seconds)
    }

    /// Parse a comma-separated list of times
    pub fn parse_list(&self, list: &str) -> AlignResult<Vec<f64>> {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| self.parse_time(item))
            .collect()
    }

    /// Format seconds as `HH:MM:SS.mmm` (or `MM:SS.mmm` under an hour)
    pub fn format_time(&self, seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let milliseconds = total_ms % 1000;
        let total_secs = total_ms / 1000;
        let secs = total_secs % 60;
        let minutes = (total_secs / 60) % 60;
        let hours = total_secs / 3600;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}
