// Domain errors - Per-track alignment failures

use serde::Serialize;
use thiserror::Error;

/// Reason a single track ended in the `Failed` state
///
/// These never abort a batch; the other tracks keep their results.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentFailure {
    /// Corrected duration still misses the reference by more than the threshold
    #[error(
        "resulting duration {actual:.3}s is {difference:.3}s away from the reference {expected:.3}s (threshold {threshold:.3}s)"
    )]
    DurationMismatch {
        expected: f64,
        actual: f64,
        difference: f64,
        threshold: f64,
    },

    /// A stretch ratio outside the configured bound made it into a result
    #[error("stretch ratio {ratio:.4} exceeds the allowed deviation of {max_deviation:.4}")]
    StretchOutOfBounds { ratio: f64, max_deviation: f64 },

    /// A playback-rate adjustment outside the configured bound made it into a result
    #[error("rate adjustment {rate:.4} exceeds the allowed deviation of {max_deviation:.4}")]
    RateOutOfBounds { rate: f64, max_deviation: f64 },

    /// Remapped subtitle cues are no longer ordered and disjoint
    #[error("subtitle cue '{cue_id}' at index {index} overlaps or precedes the previous cue")]
    SubtitleOrder { index: usize, cue_id: String },

    /// The correction produced a non-finite or non-positive duration
    #[error("correction produced an invalid duration ({duration})")]
    InvalidDuration { duration: f64 },
}
