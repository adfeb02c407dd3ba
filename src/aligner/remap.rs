//! Proportional remapping of a track's timed data through a correction

use crate::domain::model::{Correction, Scene, SubtitleCue, Track};
use crate::domain::rules::EPSILON;
use crate::utils::time::sorted_set;

/// Timed data of one track after remapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemappedData {
    pub scenes: Option<Vec<Scene>>,
    pub subtitles: Option<Vec<SubtitleCue>>,
    pub keyframes: Option<Vec<f64>>,
}

/// Map every scene, cue and keyframe of `track` onto the corrected timeline
///
/// Spans are clamped to `[0, new_duration]` and dropped when nothing of them
/// survives. Keyframes outside the window are dropped. Fields stay `None`
/// when the track had no data of that kind.
pub fn remap_track(track: &Track, correction: &Correction, new_duration: f64) -> RemappedData {
    RemappedData {
        scenes: (!track.scenes.is_empty())
            .then(|| remap_scenes(&track.scenes, correction, new_duration)),
        subtitles: (!track.subtitles.is_empty())
            .then(|| remap_cues(&track.subtitles, correction, new_duration)),
        keyframes: (!track.keyframes.is_empty())
            .then(|| remap_keyframes(&track.keyframes, correction, new_duration)),
    }
}

/// Map a span and clamp it to the window; `None` when it collapses
fn remap_span(start: f64, end: f64, correction: &Correction, new_duration: f64) -> Option<(f64, f64)> {
    let start = correction.map_time(start).clamp(0.0, new_duration);
    let end = correction.map_time(end).clamp(0.0, new_duration);
    (end - start > EPSILON).then_some((start, end))
}

pub fn remap_scenes(scenes: &[Scene], correction: &Correction, new_duration: f64) -> Vec<Scene> {
    scenes
        .iter()
        .filter_map(|scene| {
            remap_span(scene.start_time, scene.end_time, correction, new_duration).map(
                |(start_time, end_time)| Scene {
                    start_time,
                    end_time,
                },
            )
        })
        .collect()
}

pub fn remap_cues(cues: &[SubtitleCue], correction: &Correction, new_duration: f64) -> Vec<SubtitleCue> {
    cues.iter()
        .filter_map(|cue| {
            remap_span(cue.start_time, cue.end_time, correction, new_duration).map(
                |(start_time, end_time)| SubtitleCue {
                    id: cue.id.clone(),
                    start_time,
                    end_time,
                    text: cue.text.clone(),
                },
            )
        })
        .collect()
}

pub fn remap_keyframes(keyframes: &[f64], correction: &Correction, new_duration: f64) -> Vec<f64> {
    let mapped: Vec<f64> = keyframes
        .iter()
        .map(|&kf| correction.map_time(kf))
        .filter(|&t| (-EPSILON..=new_duration + EPSILON).contains(&t))
        .map(|t| t.clamp(0.0, new_duration))
        .collect();
    sorted_set(&mapped).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrackKind;

    fn cue(id: &str, start: f64, end: f64) -> SubtitleCue {
        SubtitleCue::new(id, start, end, "").unwrap()
    }

    #[test]
    fn test_stretch_scales_cues() {
        let cues = vec![cue("1", 10.0, 15.0), cue("2", 20.0, 25.0)];
        let remapped = remap_cues(&cues, &Correction::Stretch { ratio: 0.96 }, 96.0);

        assert!((remapped[0].start_time - 9.6).abs() < 1e-9);
        assert!((remapped[0].end_time - 14.4).abs() < 1e-9);
        assert!(remapped[0].end_time <= remapped[1].start_time);
    }

    #[test]
    fn test_crop_drops_and_clamps() {
        let scenes = vec![
            Scene::new(0.0, 2.0).unwrap(),
            Scene::new(2.0, 8.0).unwrap(),
            Scene::new(8.0, 10.0).unwrap(),
        ];
        let crop = Correction::Crop {
            start_trim: 3.0,
            end_trim: 3.0,
        };
        let remapped = remap_scenes(&scenes, &crop, 4.0);

        assert_eq!(remapped, vec![Scene::new(0.0, 4.0).unwrap()]);
    }

    #[test]
    fn test_pad_offsets_keyframes() {
        let pad = Correction::Pad {
            start_pad: 1.5,
            end_pad: 1.5,
        };
        assert_eq!(remap_keyframes(&[2.0, 0.0, 2.0], &pad, 13.0), vec![1.5, 3.5]);
    }

    #[test]
    fn test_crop_drops_keyframes_outside_window() {
        let crop = Correction::Crop {
            start_trim: 1.0,
            end_trim: 1.0,
        };
        assert_eq!(
            remap_keyframes(&[0.0, 1.0, 5.0, 9.5], &crop, 8.0),
            vec![0.0, 4.0]
        );
    }

    #[test]
    fn test_remap_track_leaves_missing_data_none() {
        let track = Track::new("fx", TrackKind::Effects, 10.0).with_keyframes(vec![5.0]);
        let data = remap_track(&track, &Correction::Stretch { ratio: 0.5 }, 5.0);

        assert!(data.scenes.is_none());
        assert!(data.subtitles.is_none());
        assert_eq!(data.keyframes, Some(vec![2.5]));
    }
}
