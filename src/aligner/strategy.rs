//! Correction selection per track kind

use tracing::{debug, warn};

use crate::domain::model::{AlignmentConfig, Correction, Scene, Track, TrackKind};
use crate::domain::rules::EPSILON;

/// Choose the correction that brings `track` to `reference_duration`
///
/// The caller has already established that the mismatch exceeds the
/// alignment threshold.
pub fn select_correction(
    track: &Track,
    reference_duration: f64,
    config: &AlignmentConfig,
) -> Correction {
    match track.kind {
        TrackKind::Video | TrackKind::Subtitle | TrackKind::Effects => {
            stretch_or_crop_pad(track, reference_duration, config)
        }
        TrackKind::Audio if config.prefer_audio_intact => {
            shift_rate_or_crop_pad(track, reference_duration, config)
        }
        TrackKind::Audio => stretch_or_crop_pad(track, reference_duration, config),
    }
}

/// Uniform time scaling, falling back to crop/pad past the stretch bound
fn stretch_or_crop_pad(track: &Track, reference_duration: f64, config: &AlignmentConfig) -> Correction {
    let ratio = reference_duration / track.duration;

    if (ratio - 1.0).abs() <= config.max_stretch_ratio {
        debug!("Track '{}': stretch ratio {:.6}", track.id, ratio);
        Correction::Stretch { ratio }
    } else {
        warn!(
            "Track '{}': stretch ratio {:.4} exceeds ±{:.2}, using crop/pad",
            track.id, ratio, config.max_stretch_ratio
        );
        crop_or_pad(track, reference_duration, config)
    }
}

/// Offset first, bounded playback-rate change for the remainder
fn shift_rate_or_crop_pad(
    track: &Track,
    reference_duration: f64,
    config: &AlignmentConfig,
) -> Correction {
    let delta = reference_duration - track.duration;

    if delta.abs() <= config.max_time_shift {
        debug!("Track '{}': pure time shift {:+.3}s", track.id, delta);
        return Correction::ShiftRate {
            shift: delta,
            rate: None,
        };
    }

    let shift = config.max_time_shift.copysign(delta);
    let residual = delta - shift;
    let rate = (track.duration + residual) / track.duration;

    if (rate - 1.0).abs() <= config.max_rate_adjust {
        debug!(
            "Track '{}': time shift {:+.3}s with rate {:.6}",
            track.id, shift, rate
        );
        Correction::ShiftRate {
            shift,
            rate: Some(rate),
        }
    } else {
        warn!(
            "Track '{}': rate {:.4} exceeds ±{:.2}, using crop/pad",
            track.id, rate, config.max_rate_adjust
        );
        crop_or_pad(track, reference_duration, config)
    }
}

/// Trim a long track or pad a short one
pub fn crop_or_pad(track: &Track, reference_duration: f64, config: &AlignmentConfig) -> Correction {
    let delta = reference_duration - track.duration;

    if delta < 0.0 {
        let excess = -delta;
        let start_trim = if config.maintain_sync_points && !track.scenes.is_empty() {
            biased_start_trim(&track.scenes, track.duration, excess)
        } else {
            excess / 2.0
        };
        let end_trim = excess - start_trim;

        debug!(
            "Track '{}': crop {:.3}s from start, {:.3}s from end",
            track.id, start_trim, end_trim
        );
        Correction::Crop {
            start_trim,
            end_trim,
        }
    } else {
        let half = delta / 2.0;
        debug!("Track '{}': pad {:.3}s at both ends", track.id, half);
        Correction::Pad {
            start_pad: half,
            end_pad: half,
        }
    }
}

/// Pick a start trim in `[0, excess]` whose trim edges split the fewest scenes
///
/// Candidates are the even split plus every split that puts one of the two
/// edges exactly on a scene boundary. Ties go to the candidate closest to the
/// even split.
pub fn biased_start_trim(scenes: &[Scene], duration: f64, excess: f64) -> f64 {
    let even = excess / 2.0;

    let mut candidates = vec![even];
    for scene in scenes {
        for boundary in [scene.start_time, scene.end_time] {
            // start edge on the boundary
            candidates.push(boundary);
            // end edge on the boundary
            candidates.push(excess - (duration - boundary));
        }
    }

    let cost = |start_trim: f64| -> usize {
        let end_edge = duration - (excess - start_trim);
        scenes
            .iter()
            .filter(|s| s.contains_interior(start_trim) || s.contains_interior(end_edge))
            .count()
    };

    let mut best = even;
    let mut best_cost = cost(even);

    for candidate in candidates {
        if !(-EPSILON..=excess + EPSILON).contains(&candidate) {
            continue;
        }
        let candidate = candidate.clamp(0.0, excess);
        let candidate_cost = cost(candidate);
        let closer = (candidate - even).abs() < (best - even).abs();
        if candidate_cost < best_cost || (candidate_cost == best_cost && closer) {
            best = candidate;
            best_cost = candidate_cost;
        }
    }

    if best != even {
        debug!(
            "Biased crop start from {:.3}s to {:.3}s ({} scenes split)",
            even, best, best_cost
        );
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AlignmentConfig {
        AlignmentConfig::default()
    }

    #[test]
    fn test_video_stretches_within_bound() {
        let track = Track::new("v2", TrackKind::Video, 104.0);
        match select_correction(&track, 100.0, &config()) {
            Correction::Stretch { ratio } => assert!((ratio - 100.0 / 104.0).abs() < 1e-12),
            other => panic!("expected stretch, got {:?}", other),
        }
    }

    #[test]
    fn test_video_beyond_bound_crops() {
        let track = Track::new("v2", TrackKind::Video, 130.0);
        assert_eq!(
            select_correction(&track, 100.0, &config()),
            Correction::Crop {
                start_trim: 15.0,
                end_trim: 15.0
            }
        );
    }

    #[test]
    fn test_short_track_pads() {
        let track = Track::new("v2", TrackKind::Video, 50.0);
        assert_eq!(
            select_correction(&track, 100.0, &config()),
            Correction::Pad {
                start_pad: 25.0,
                end_pad: 25.0
            }
        );
    }

    #[test]
    fn test_audio_shift_rate() {
        let track = Track::new("a1", TrackKind::Audio, 125.8);
        match select_correction(&track, 120.0, &config()) {
            Correction::ShiftRate {
                shift,
                rate: Some(rate),
            } => {
                assert_eq!(shift, -0.05);
                assert!((rate - 120.05 / 125.8).abs() < 1e-12);
                assert!((125.8 * rate + shift - 120.0).abs() < 1e-9);
            }
            other => panic!("expected shift/rate, got {:?}", other),
        }
    }

    #[test]
    fn test_audio_pure_shift() {
        let track = Track::new("a1", TrackKind::Audio, 100.03);
        let correction = select_correction(&track, 100.0, &config());
        match correction {
            Correction::ShiftRate { shift, rate: None } => assert!((shift + 0.03).abs() < 1e-9),
            other => panic!("expected pure shift, got {:?}", other),
        }
    }

    #[test]
    fn test_audio_rate_bound_falls_back_to_crop() {
        let track = Track::new("a1", TrackKind::Audio, 110.0);
        assert!(matches!(
            select_correction(&track, 100.0, &config()),
            Correction::Crop { .. }
        ));
    }

    #[test]
    fn test_audio_without_intact_preference_stretches() {
        let track = Track::new("a1", TrackKind::Audio, 104.0);
        let config = AlignmentConfig {
            prefer_audio_intact: false,
            ..config()
        };
        assert!(matches!(
            select_correction(&track, 100.0, &config),
            Correction::Stretch { .. }
        ));
    }

    #[test]
    fn test_biased_crop_avoids_scene_interior() {
        // 10s excess; the even split (5s) would cut into the first scene
        let scenes = vec![
            Scene::new(0.0, 4.0).unwrap(),
            Scene::new(4.0, 60.0).unwrap(),
            Scene::new(60.0, 108.0).unwrap(),
            Scene::new(108.0, 110.0).unwrap(),
        ];
        let start_trim = biased_start_trim(&scenes, 110.0, 10.0);
        assert_eq!(start_trim, 4.0);
    }

    #[test]
    fn test_biased_crop_without_better_candidate_is_even() {
        let scenes = vec![Scene::new(0.0, 110.0).unwrap()];
        assert_eq!(biased_start_trim(&scenes, 110.0, 10.0), 5.0);
    }

    #[test]
    fn test_crop_ignores_scenes_without_sync_points() {
        let track = Track::new("v2", TrackKind::Video, 130.0)
            .with_scenes(vec![Scene::new(0.0, 10.0).unwrap()]);
        let config = AlignmentConfig {
            maintain_sync_points: false,
            ..config()
        };
        assert_eq!(
            crop_or_pad(&track, 100.0, &config),
            Correction::Crop {
                start_trim: 15.0,
                end_trim: 15.0
            }
        );
    }
}
