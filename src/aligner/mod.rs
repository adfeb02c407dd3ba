//! Multi-track duration alignment
//!
//! Every non-main track is compared against the main track. Tracks within the
//! alignment threshold produce no result; the rest get one correction
//! (stretch, crop/pad or shift/rate) and have their timed data remapped.
//! Subtitle and effects tracks whose carrier was corrected adopt the
//! carrier's correction in a second pass.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::errors::AlignmentFailure;
use crate::domain::model::{AlignmentConfig, AlignmentResult, Correction, Track, TrackId, TrackKind};
use crate::domain::rules::{BatchValidator, ConfigValidator, ResultValidator};
use crate::error::{AlignError, AlignResult};
use crate::planner::CutPointOptimizer;

pub mod remap;
pub mod strategy;

pub use remap::{remap_track, RemappedData};
pub use strategy::select_correction;

/// Per-track outcome: `Ok` with the corrections, or the reason it failed
pub type TrackOutcome = Result<AlignmentResult, AlignmentFailure>;

/// Outcomes for every non-main track that needed correction
pub type AlignmentOutcomes = BTreeMap<TrackId, TrackOutcome>;

/// Align every non-main track of `tracks` to the main track
pub fn align_tracks(
    tracks: &BTreeMap<TrackId, Track>,
    config: &AlignmentConfig,
) -> AlignResult<AlignmentOutcomes> {
    TrackAligner::new(config.clone())?.align(tracks)
}

/// Align an audio/video pair and return the aligned `(audio, video)` tracks
///
/// The video is the reference unless the audio is flagged as main. The
/// reference comes back flagged as main and otherwise unchanged; the other
/// track carries its new duration and remapped timed data.
pub fn align_audio_video(
    audio: &Track,
    video: &Track,
    config: &AlignmentConfig,
) -> AlignResult<(Track, Track)> {
    TrackAligner::new(config.clone())?.align_pair(audio, video)
}

/// Track aligner bound to one validated configuration
#[derive(Debug, Clone)]
pub struct TrackAligner {
    config: AlignmentConfig,
}

impl TrackAligner {
    /// Create a new aligner, rejecting invalid configurations
    pub fn new(config: AlignmentConfig) -> AlignResult<Self> {
        ConfigValidator::validate(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Align a batch; see [`align_tracks`]
    pub fn align(&self, tracks: &BTreeMap<TrackId, Track>) -> AlignResult<AlignmentOutcomes> {
        let main_id = BatchValidator::validate(tracks)?;
        let main = &tracks[main_id];

        info!(
            "Aligning {} tracks against '{}' ({:.3}s)",
            tracks.len() - 1,
            main_id,
            main.duration
        );

        let follows_carrier = |id: &TrackId, track: &Track| -> bool {
            track.kind.follows_carrier()
                && track.carrier.as_ref().is_some_and(|carrier| {
                    carrier != main_id
                        && carrier != id
                        && tracks
                            .get(carrier)
                            .is_some_and(|c| matches!(c.kind, TrackKind::Video | TrackKind::Audio))
                })
        };

        // Phase 1: tracks that own their timeline
        let mut outcomes: AlignmentOutcomes = tracks
            .par_iter()
            .filter(|(id, track)| *id != main_id && !follows_carrier(*id, *track))
            .filter_map(|(id, track)| {
                self.align_track(id, track, main.duration)
                    .map(|outcome| (id.clone(), outcome))
            })
            .collect();

        // Phase 2: subtitle/effects tracks riding on a carrier
        let adopted: Vec<(TrackId, TrackOutcome)> = tracks
            .par_iter()
            .filter(|(id, track)| *id != main_id && follows_carrier(*id, *track))
            .filter_map(|(id, track)| {
                let carrier_id = track.carrier.as_ref()?;
                match outcomes.get(carrier_id) {
                    Some(Ok(carrier_result)) => Some((
                        id.clone(),
                        self.adopt_carrier(id, track, carrier_id, carrier_result, main.duration),
                    )),
                    Some(Err(_)) => {
                        warn!(
                            "Track '{}': carrier '{}' failed, aligning independently",
                            id, carrier_id
                        );
                        self.align_track(id, track, main.duration)
                            .map(|outcome| (id.clone(), outcome))
                    }
                    None => self
                        .align_track(id, track, main.duration)
                        .map(|outcome| (id.clone(), outcome)),
                }
            })
            .collect();
        outcomes.extend(adopted);

        let failed = outcomes.values().filter(|o| o.is_err()).count();
        info!(
            "Alignment complete: {} corrected, {} failed, {} already aligned",
            outcomes.len() - failed,
            failed,
            tracks.len() - 1 - outcomes.len()
        );

        Ok(outcomes)
    }

    /// Align an audio/video pair; see [`align_audio_video`]
    pub fn align_pair(&self, audio: &Track, video: &Track) -> AlignResult<(Track, Track)> {
        if audio.is_main && video.is_main {
            return Err(AlignError::validation(format!(
                "Tracks '{}' and '{}' are both marked as main",
                audio.id, video.id
            )));
        }
        if audio.id == video.id {
            return Err(AlignError::validation(format!(
                "Audio and video share the track id '{}'",
                audio.id
            )));
        }

        let audio_is_reference = audio.is_main;
        let mut audio_in = audio.clone();
        let mut video_in = video.clone();
        audio_in.is_main = audio_is_reference;
        video_in.is_main = !audio_is_reference;

        let tracks: BTreeMap<TrackId, Track> = [audio_in, video_in]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let mut outcomes = self.align(&tracks)?;

        let apply = |track: &Track, outcome: Option<TrackOutcome>| -> AlignResult<Track> {
            match outcome {
                None => Ok(track.clone()),
                Some(Ok(result)) => Ok(result.apply_to(track)),
                Some(Err(source)) => Err(AlignError::TrackFailed {
                    track_id: track.id.clone(),
                    source,
                }),
            }
        };

        let audio_out = apply(&tracks[&audio.id], outcomes.remove(&audio.id))?;
        let video_out = apply(&tracks[&video.id], outcomes.remove(&video.id))?;
        Ok((audio_out, video_out))
    }

    /// Classify, correct and validate one track; `None` when already aligned
    fn align_track(&self, id: &TrackId, track: &Track, reference_duration: f64) -> Option<TrackOutcome> {
        let delta = reference_duration - track.duration;
        if delta.abs() <= self.config.alignment_threshold {
            debug!(
                "Track '{}' already aligned (delta {:+.3}s)",
                id, delta
            );
            return None;
        }

        debug!(
            "Track '{}' ({}): {:.3}s vs {:.3}s, delta {:+.3}s",
            id, track.kind, track.duration, reference_duration, delta
        );

        let correction = select_correction(track, reference_duration, &self.config);
        let result = self.build_result(track, correction, correction.corrected_duration(track.duration));
        Some(self.validate(id, result, reference_duration))
    }

    /// Apply the carrier's correction to a subtitle/effects track
    fn adopt_carrier(
        &self,
        id: &TrackId,
        track: &Track,
        carrier_id: &TrackId,
        carrier_result: &AlignmentResult,
        reference_duration: f64,
    ) -> TrackOutcome {
        debug!(
            "Track '{}' adopts {} correction of carrier '{}'",
            id, carrier_result.strategy, carrier_id
        );

        let mut result = self.build_result(track, carrier_result.correction(), carrier_result.duration);
        result.carrier = Some(carrier_id.clone());
        self.validate(id, result, reference_duration)
    }

    /// Assemble a result with remapped timed data on a timeline of `new_duration`
    fn build_result(&self, track: &Track, correction: Correction, new_duration: f64) -> AlignmentResult {
        let mut result = AlignmentResult::from_correction(correction, track.duration);
        result.duration = new_duration;

        if let (Correction::Stretch { ratio }, Some(fps)) = (correction, track.frame_rate) {
            result.adjusted_frame_rate = Some(fps / ratio);
        }

        let remapped = remap_track(track, &correction, new_duration);

        if self.config.optimize_scene_cuts {
            if let (Some(scenes), Some(keyframes)) = (&remapped.scenes, &remapped.keyframes) {
                let cuts: Vec<f64> = scenes
                    .iter()
                    .map(|s| s.start_time)
                    .filter(|&t| t > 0.0)
                    .collect();
                let optimizer = CutPointOptimizer::new(keyframes, self.config.min_segment_duration);
                result.optimized_cut_points = Some(optimizer.optimize(&cuts));
            }
        }

        result.remapped_scenes = remapped.scenes;
        result.remapped_subtitles = remapped.subtitles;
        result.remapped_keyframes = remapped.keyframes;
        result
    }

    fn validate(&self, id: &TrackId, result: AlignmentResult, reference_duration: f64) -> TrackOutcome {
        match ResultValidator::validate(&result, reference_duration, &self.config) {
            Ok(()) => {
                info!(
                    "Track '{}': {} {:.3}s -> {:.3}s",
                    id, result.strategy, result.original_duration, result.duration
                );
                Ok(result)
            }
            Err(failure) => {
                warn!("Track '{}' failed validation: {}", id, failure);
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests;
