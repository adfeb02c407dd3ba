//! Keyframe snapping for single timestamps and batches

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::planner::SnapPreference;
use crate::utils::time::{self, sorted_set, TimeParser};

/// Snap `value` to the nearest keyframe when it lies within `threshold`
///
/// Exact keyframe hits are returned unchanged; values farther than
/// `threshold` from every keyframe are also returned unchanged, which bounds
/// the drift introduced by snapping. Empty `keyframes` is a no-op.
pub fn align_to_keyframe(value: f64, keyframes: &[f64], threshold: f64) -> f64 {
    let keyframes = sorted_set(keyframes);
    snap_sorted(value, &keyframes, threshold)
}

/// Pick a keyframe for `target` according to `preference`
///
/// `Previous` yields the closest keyframe `<= target` (the first keyframe
/// when none lies below), `Next` the closest keyframe `>= target` (the last
/// keyframe when none lies above). Empty `keyframes` returns `target`.
pub fn find_optimal_keyframe(target: f64, keyframes: &[f64], preference: SnapPreference) -> f64 {
    let keyframes = sorted_set(keyframes);
    find_sorted(target, &keyframes, preference)
}

pub(crate) fn snap_sorted(value: f64, sorted: &[f64], threshold: f64) -> f64 {
    if sorted.is_empty() || time::contains(value, sorted) {
        return value;
    }

    let nearest = time::nearest(value, sorted);
    if (nearest - value).abs() <= threshold {
        trace!("Snapped {:.3}s to keyframe {:.3}s", value, nearest);
        nearest
    } else {
        value
    }
}

pub(crate) fn find_sorted(target: f64, sorted: &[f64], preference: SnapPreference) -> f64 {
    // a keyframe at `target` satisfies every preference
    if time::contains(target, sorted) {
        return target;
    }

    match preference {
        SnapPreference::Nearest => time::nearest(target, sorted),
        SnapPreference::Previous => time::previous(target, sorted),
        SnapPreference::Next => time::next(target, sorted),
    }
}

/// Statistics about a batch snapping run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapStats {
    /// Number of values processed
    pub count: usize,
    /// Values that were already on a keyframe
    pub already_aligned: usize,
    /// Values moved onto a keyframe
    pub moved: usize,
    /// Values left alone because the keyframe was beyond the threshold
    pub skipped: usize,
    /// Largest shift applied (seconds)
    pub max_shift: f64,
    /// Mean shift over moved values (seconds)
    pub avg_shift: f64,
}

/// Keyframe snapper bound to one keyframe index
#[derive(Debug, Clone)]
pub struct KeyframeSnapper {
    /// Normalized keyframe timestamps
    keyframes: Vec<f64>,
    /// Maximum snap distance (seconds)
    threshold: f64,
}

impl KeyframeSnapper {
    /// Create a snapper over `keyframes` (any order, duplicates allowed)
    pub fn new(keyframes: &[f64], threshold: f64) -> Self {
        Self {
            keyframes: sorted_set(keyframes).into_owned(),
            threshold: threshold.max(0.0),
        }
    }

    /// Set the maximum snap distance
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    pub fn keyframes(&self) -> &[f64] {
        &self.keyframes
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Snap one value under the configured threshold
    pub fn snap(&self, value: f64) -> f64 {
        snap_sorted(value, &self.keyframes, self.threshold)
    }

    /// Pick a keyframe for `target` regardless of distance
    pub fn find(&self, target: f64, preference: SnapPreference) -> f64 {
        find_sorted(target, &self.keyframes, preference)
    }

    /// Whether `value` lies within `tolerance` of some keyframe
    pub fn is_aligned(&self, value: f64, tolerance: f64) -> bool {
        !self.keyframes.is_empty() && (time::nearest(value, &self.keyframes) - value).abs() <= tolerance
    }

    /// Snap a batch of values using `preference`, enforcing the threshold per value
    pub fn snap_all(&self, values: &[f64], preference: SnapPreference) -> (Vec<f64>, SnapStats) {
        let mut stats = SnapStats {
            count: values.len(),
            ..Default::default()
        };

        if self.keyframes.is_empty() {
            warn!("No keyframes available for snapping");
            stats.skipped = values.len();
            return (values.to_vec(), stats);
        }

        let parser = TimeParser::new();
        let mut total_shift = 0.0;
        let snapped = values
            .iter()
            .map(|&value| {
                let candidate = self.find(value, preference);
                let shift = (candidate - value).abs();

                if shift == 0.0 {
                    stats.already_aligned += 1;
                    value
                } else if shift <= self.threshold {
                    trace!(
                        "{} -> {} ({:+.3}s)",
                        parser.format_time(value),
                        parser.format_time(candidate),
                        candidate - value
                    );
                    stats.moved += 1;
                    total_shift += shift;
                    stats.max_shift = stats.max_shift.max(shift);
                    candidate
                } else {
                    stats.skipped += 1;
                    value
                }
            })
            .collect();

        if stats.moved > 0 {
            stats.avg_shift = total_shift / stats.moved as f64;
        }

        debug!(
            "Snapped {} values ({:?}): {} aligned, {} moved, {} skipped",
            stats.count, preference, stats.already_aligned, stats.moved, stats.skipped
        );

        (snapped, stats)
    }
}
