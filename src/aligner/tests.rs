// Unit tests for the track aligner

use super::*;
use crate::domain::model::{AlignmentStrategy, Scene, SubtitleCue};

fn batch(tracks: Vec<Track>) -> BTreeMap<TrackId, Track> {
    tracks.into_iter().map(|t| (t.id.clone(), t)).collect()
}

fn cue(id: &str, start: f64, end: f64) -> SubtitleCue {
    SubtitleCue::new(id, start, end, format!("cue {}", id)).unwrap()
}

#[test]
fn test_audio_prefers_shift_rate() {
    let tracks = batch(vec![
        Track::new("video", TrackKind::Video, 120.0).main(),
        Track::new("audio", TrackKind::Audio, 125.8).with_sample_rate(48000),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();
    let result = outcomes["audio"].as_ref().unwrap();

    assert_eq!(result.strategy, AlignmentStrategy::ShiftRate);
    assert!(result.stretch_ratio.is_none());
    assert!(result.time_shift.is_some());
    assert!((result.duration - 120.0).abs() <= 1.0);
}

#[test]
fn test_equal_durations_produce_no_results() {
    let tracks = batch(vec![
        Track::new("video", TrackKind::Video, 100.0).main(),
        Track::new("video2", TrackKind::Video, 100.0),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();
    assert!(outcomes.is_empty());
}

#[test]
fn test_within_threshold_is_already_aligned() {
    let tracks = batch(vec![
        Track::new("video", TrackKind::Video, 100.0).main(),
        Track::new("audio", TrackKind::Audio, 100.9),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();
    assert!(!outcomes.contains_key("audio"));
}

#[test]
fn test_subtitle_follows_stretched_carrier() {
    let cues = vec![cue("1", 10.0, 15.0), cue("2", 20.0, 24.0), cue("3", 50.0, 52.0)];
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 96.0).main(),
        Track::new("cam2", TrackKind::Video, 100.0).with_frame_rate(25.0),
        Track::new("subs", TrackKind::Subtitle, 100.0)
            .with_subtitles(cues)
            .with_carrier("cam2"),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();

    let video = outcomes["cam2"].as_ref().unwrap();
    assert_eq!(video.strategy, AlignmentStrategy::Stretch);
    assert!((video.adjusted_frame_rate.unwrap() - 25.0 / 0.96).abs() < 1e-9);

    let subs = outcomes["subs"].as_ref().unwrap();
    assert_eq!(subs.carrier.as_deref(), Some("cam2"));
    assert_eq!(subs.stretch_ratio, video.stretch_ratio);

    let remapped = subs.remapped_subtitles.as_ref().unwrap();
    assert!((remapped[0].start_time - 9.6).abs() < 1e-9);
    assert!((remapped[0].end_time - 14.4).abs() < 1e-9);
    for pair in remapped.windows(2) {
        assert!(pair[0].end_time <= pair[1].start_time);
    }
}

#[test]
fn test_subtitle_adopts_carrier_even_when_own_duration_matches() {
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 100.0).main(),
        Track::new("dub", TrackKind::Audio, 110.0),
        Track::new("subs", TrackKind::Subtitle, 100.0)
            .with_subtitles(vec![cue("1", 6.0, 8.0)])
            .with_carrier("dub"),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();
    let dub = outcomes["dub"].as_ref().unwrap();
    let subs = outcomes["subs"].as_ref().unwrap();

    assert_eq!(dub.strategy, AlignmentStrategy::Crop);
    assert_eq!(subs.strategy, AlignmentStrategy::Crop);
    assert_eq!(subs.crop_info, dub.crop_info);
    let remapped = subs.remapped_subtitles.as_ref().unwrap();
    assert!((remapped[0].start_time - 1.0).abs() < 1e-9);
}

#[test]
fn test_subtitle_without_carrier_stretches() {
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 100.0).main(),
        Track::new("subs", TrackKind::Subtitle, 104.0).with_subtitles(vec![cue("1", 52.0, 53.0)]),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();
    let subs = outcomes["subs"].as_ref().unwrap();
    assert_eq!(subs.strategy, AlignmentStrategy::Stretch);
    assert!(subs.carrier.is_none());
}

#[test]
fn test_overlapping_cues_fail_only_that_track() {
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 100.0).main(),
        Track::new("cam2", TrackKind::Video, 104.0),
        Track::new("subs", TrackKind::Subtitle, 104.0)
            .with_subtitles(vec![cue("1", 10.0, 20.0), cue("2", 15.0, 25.0)]),
    ]);

    let outcomes = align_tracks(&tracks, &AlignmentConfig::default()).unwrap();
    assert!(outcomes["cam2"].is_ok());
    assert!(matches!(
        outcomes["subs"],
        Err(AlignmentFailure::SubtitleOrder { index: 1, .. })
    ));
}

#[test]
fn test_batch_errors_are_fatal() {
    let no_main = batch(vec![Track::new("v", TrackKind::Video, 10.0)]);
    assert!(matches!(
        align_tracks(&no_main, &AlignmentConfig::default()),
        Err(AlignError::Validation { .. })
    ));

    let bad_config = AlignmentConfig {
        max_stretch_ratio: 0.0,
        ..Default::default()
    };
    let tracks = batch(vec![Track::new("v", TrackKind::Video, 10.0).main()]);
    assert!(matches!(
        align_tracks(&tracks, &bad_config),
        Err(AlignError::Config { .. })
    ));
}

#[test]
fn test_single_track_batch_is_empty() {
    let tracks = batch(vec![Track::new("v", TrackKind::Video, 10.0).main()]);
    assert!(align_tracks(&tracks, &AlignmentConfig::default()).unwrap().is_empty());
}

#[test]
fn test_optimized_scene_cuts() {
    let scenes = vec![
        Scene::new(0.0, 10.3).unwrap(),
        Scene::new(10.3, 20.6).unwrap(),
        Scene::new(20.6, 40.0).unwrap(),
    ];
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 40.0).main(),
        Track::new("cam2", TrackKind::Video, 44.0)
            .with_scenes(scenes)
            .with_keyframes(vec![0.0, 11.0, 22.0, 33.0]),
    ]);
    let config = AlignmentConfig {
        optimize_scene_cuts: true,
        min_segment_duration: 2.0,
        ..Default::default()
    };

    let outcomes = align_tracks(&tracks, &config).unwrap();
    let result = outcomes["cam2"].as_ref().unwrap();
    let keyframes = result.remapped_keyframes.as_ref().unwrap();
    let cuts = result.optimized_cut_points.as_ref().unwrap();

    assert_eq!(cuts.len(), 2);
    for cut in cuts {
        assert!(keyframes.iter().any(|k| (k - cut).abs() < 1e-9));
    }
}

#[test]
fn test_optimized_scene_cuts_with_zero_minimum_do_not_repeat() {
    let scenes = vec![
        Scene::new(0.0, 10.3).unwrap(),
        Scene::new(10.3, 20.6).unwrap(),
        Scene::new(20.6, 40.0).unwrap(),
    ];
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 40.0).main(),
        Track::new("cam2", TrackKind::Video, 44.0)
            .with_scenes(scenes)
            .with_keyframes(vec![0.0, 11.0, 22.0, 33.0]),
    ]);
    let config = AlignmentConfig {
        optimize_scene_cuts: true,
        min_segment_duration: 0.0,
        ..Default::default()
    };

    let outcomes = align_tracks(&tracks, &config).unwrap();
    let cuts = outcomes["cam2"]
        .as_ref()
        .unwrap()
        .optimized_cut_points
        .clone()
        .unwrap();

    assert_eq!(cuts.len(), 2);
    assert!((cuts[0] - 10.0).abs() < 1e-9);
    assert!((cuts[1] - 20.0).abs() < 1e-9);
}

#[test]
fn test_align_audio_video_video_is_reference() {
    let audio = Track::new("audio", TrackKind::Audio, 125.8);
    let video = Track::new("video", TrackKind::Video, 120.0);

    let (aligned_audio, aligned_video) =
        align_audio_video(&audio, &video, &AlignmentConfig::default()).unwrap();

    assert_eq!(aligned_video.duration, 120.0);
    assert!(aligned_video.is_main);
    assert!((aligned_audio.duration - 120.0).abs() <= 1.0);
    assert!(!aligned_audio.is_main);
}

#[test]
fn test_align_audio_video_audio_main() {
    let audio = Track::new("audio", TrackKind::Audio, 100.0).main();
    let video = Track::new("video", TrackKind::Video, 104.0).with_frame_rate(25.0);

    let (aligned_audio, aligned_video) =
        align_audio_video(&audio, &video, &AlignmentConfig::default()).unwrap();

    assert_eq!(aligned_audio.duration, 100.0);
    assert!((aligned_video.duration - 100.0).abs() < 1e-9);
    assert!((aligned_video.frame_rate.unwrap() - 26.0).abs() < 1e-9);
}

#[test]
fn test_align_audio_video_failure_surfaces() {
    let audio = Track::new("audio", TrackKind::Audio, 100.0)
        .main();
    let video = Track::new("video", TrackKind::Subtitle, 104.0)
        .with_subtitles(vec![cue("1", 0.0, 5.0), cue("2", 4.0, 6.0)]);

    let err = align_audio_video(&audio, &video, &AlignmentConfig::default()).unwrap_err();
    assert!(matches!(err, AlignError::TrackFailed { ref track_id, .. } if track_id == "video"));
}

#[test]
fn test_align_audio_video_two_mains() {
    let audio = Track::new("audio", TrackKind::Audio, 100.0).main();
    let video = Track::new("video", TrackKind::Video, 100.0).main();
    assert!(matches!(
        align_audio_video(&audio, &video, &AlignmentConfig::default()),
        Err(AlignError::Validation { .. })
    ));
}

#[test]
fn test_realigning_output_is_idempotent() {
    let tracks = batch(vec![
        Track::new("main", TrackKind::Video, 120.0).main(),
        Track::new("audio", TrackKind::Audio, 125.8),
        Track::new("cam2", TrackKind::Video, 150.0)
            .with_scenes(vec![Scene::new(0.0, 70.0).unwrap(), Scene::new(70.0, 150.0).unwrap()]),
        Track::new("short", TrackKind::Video, 80.0),
    ]);
    let config = AlignmentConfig::default();

    let outcomes = align_tracks(&tracks, &config).unwrap();
    assert_eq!(outcomes.len(), 3);

    let realigned: BTreeMap<TrackId, Track> = tracks
        .iter()
        .map(|(id, track)| {
            let track = match outcomes.get(id) {
                Some(Ok(result)) => result.apply_to(track),
                _ => track.clone(),
            };
            (id.clone(), track)
        })
        .collect();

    assert!(align_tracks(&realigned, &config).unwrap().is_empty());
}
