// Domain rules - Validation policies for configs, batches and results

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::errors::AlignmentFailure;
use crate::domain::model::*;
use crate::error::{AlignError, AlignResult};

/// Slack for floating point comparisons against configured bounds
pub const EPSILON: f64 = 1e-9;

/// Business rules for alignment configuration
pub struct ConfigValidator;

impl ConfigValidator {
    /// Reject configurations that make the batch meaningless
    pub fn validate(config: &AlignmentConfig) -> AlignResult<()> {
        if !config.alignment_threshold.is_finite() || config.alignment_threshold < 0.0 {
            return Err(AlignError::config(format!(
                "alignment_threshold must be a non-negative number of seconds, got {}",
                config.alignment_threshold
            )));
        }

        if !(config.max_stretch_ratio > 0.0 && config.max_stretch_ratio < 1.0) {
            return Err(AlignError::config(format!(
                "max_stretch_ratio must lie in (0, 1), got {}",
                config.max_stretch_ratio
            )));
        }

        if !(config.max_rate_adjust > 0.0 && config.max_rate_adjust < 1.0) {
            return Err(AlignError::config(format!(
                "max_rate_adjust must lie in (0, 1), got {}",
                config.max_rate_adjust
            )));
        }

        if !config.max_time_shift.is_finite() || config.max_time_shift < 0.0 {
            return Err(AlignError::config(format!(
                "max_time_shift must be a non-negative number of seconds, got {}",
                config.max_time_shift
            )));
        }

        if !config.min_segment_duration.is_finite() || config.min_segment_duration < 0.0 {
            return Err(AlignError::config(format!(
                "min_segment_duration must be a non-negative number of seconds, got {}",
                config.min_segment_duration
            )));
        }

        if !config.snap_threshold.is_finite() || config.snap_threshold < 0.0 {
            return Err(AlignError::config(format!(
                "snap_threshold must be a non-negative number of seconds, got {}",
                config.snap_threshold
            )));
        }

        Ok(())
    }
}

/// Business rules for an input batch
pub struct BatchValidator;

impl BatchValidator {
    /// Validate every track and return the id of the single main track
    pub fn validate(tracks: &BTreeMap<TrackId, Track>) -> AlignResult<&TrackId> {
        let mut main_id: Option<&TrackId> = None;

        for (id, track) in tracks {
            if !track.duration.is_finite() || track.duration <= 0.0 {
                return Err(AlignError::validation(format!(
                    "Track '{}' has a non-positive duration ({})",
                    id, track.duration
                )));
            }

            if let Some(fps) = track.frame_rate {
                if !fps.is_finite() || fps <= 0.0 {
                    return Err(AlignError::validation(format!(
                        "Track '{}' has an invalid frame rate ({})",
                        id, fps
                    )));
                }
            }

            if track.sample_rate == Some(0) {
                return Err(AlignError::validation(format!(
                    "Track '{}' has a zero sample rate",
                    id
                )));
            }

            for scene in &track.scenes {
                Self::validate_span(id, "scene", scene.start_time, scene.end_time)?;
            }
            for cue in &track.subtitles {
                Self::validate_span(id, "subtitle cue", cue.start_time, cue.end_time)?;
            }

            if track.is_main {
                if let Some(existing) = main_id {
                    return Err(AlignError::validation(format!(
                        "Tracks '{}' and '{}' are both marked as main",
                        existing, id
                    )));
                }
                main_id = Some(id);
            }

            if let Some(ref carrier) = track.carrier {
                if !tracks.contains_key(carrier) {
                    warn!("Track '{}' names unknown carrier '{}'", id, carrier);
                }
            }
        }

        main_id.ok_or_else(|| AlignError::validation("No track is marked as main"))
    }

    /// Scenes and cues deserialized from track files skip their constructors
    fn validate_span(id: &TrackId, what: &str, start: f64, end: f64) -> AlignResult<()> {
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(AlignError::validation(format!(
                "Track '{}' has a {} with start {} not before end {}",
                id, what, start, end
            )));
        }
        Ok(())
    }
}

/// Business rules for a finished per-track result
pub struct ResultValidator;

impl ResultValidator {
    /// Check a result against the reference duration and configured bounds
    pub fn validate(
        result: &AlignmentResult,
        reference_duration: f64,
        config: &AlignmentConfig,
    ) -> Result<(), AlignmentFailure> {
        if !result.duration.is_finite() || result.duration <= 0.0 {
            return Err(AlignmentFailure::InvalidDuration {
                duration: result.duration,
            });
        }

        let difference = (result.duration - reference_duration).abs();
        if difference > config.alignment_threshold + EPSILON {
            return Err(AlignmentFailure::DurationMismatch {
                expected: reference_duration,
                actual: result.duration,
                difference,
                threshold: config.alignment_threshold,
            });
        }

        if let Some(ratio) = result.stretch_ratio {
            if (ratio - 1.0).abs() > config.max_stretch_ratio + EPSILON {
                return Err(AlignmentFailure::StretchOutOfBounds {
                    ratio,
                    max_deviation: config.max_stretch_ratio,
                });
            }
        }

        if let Some(rate) = result.rate_adjust {
            if (rate - 1.0).abs() > config.max_rate_adjust + EPSILON {
                return Err(AlignmentFailure::RateOutOfBounds {
                    rate,
                    max_deviation: config.max_rate_adjust,
                });
            }
        }

        if let Some(ref cues) = result.remapped_subtitles {
            Self::validate_cue_order(cues)?;
        }

        Ok(())
    }

    /// Cues must be ordered by start and must not overlap
    pub fn validate_cue_order(cues: &[SubtitleCue]) -> Result<(), AlignmentFailure> {
        for (index, pair) in cues.windows(2).enumerate() {
            let (prev, cue) = (&pair[0], &pair[1]);
            if cue.start_time < prev.start_time || cue.start_time < prev.end_time - EPSILON {
                return Err(AlignmentFailure::SubtitleOrder {
                    index: index + 1,
                    cue_id: cue.id.clone(),
                });
            }
        }
        Ok(())
    }
}
