// Unit tests for domain models

use super::*;

#[test]
fn test_track_kind_parse() {
    assert_eq!("video".parse::<TrackKind>().unwrap(), TrackKind::Video);
    assert_eq!(" Audio ".parse::<TrackKind>().unwrap(), TrackKind::Audio);
    assert_eq!("subtitles".parse::<TrackKind>().unwrap(), TrackKind::Subtitle);
    assert_eq!("effect".parse::<TrackKind>().unwrap(), TrackKind::Effects);
    assert!("midi".parse::<TrackKind>().is_err());
}

#[test]
fn test_track_kind_follows_carrier() {
    assert!(TrackKind::Subtitle.follows_carrier());
    assert!(TrackKind::Effects.follows_carrier());
    assert!(!TrackKind::Video.follows_carrier());
    assert!(!TrackKind::Audio.follows_carrier());
}

#[test]
fn test_track_kind_deserialize_unknown_fails() {
    let json = r#"{"id": "x", "kind": "hologram", "duration": 10.0}"#;
    assert!(serde_json::from_str::<Track>(json).is_err());
}

#[test]
fn test_scene_creation() {
    let scene = Scene::new(1.5, 4.0).unwrap();
    assert_eq!(scene.duration(), 2.5);
    assert!(scene.contains_interior(2.0));
    assert!(!scene.contains_interior(1.5));
    assert!(!scene.contains_interior(4.0));
}

#[test]
fn test_scene_invalid() {
    assert!(Scene::new(4.0, 4.0).is_err());
    assert!(Scene::new(5.0, 4.0).is_err());
    assert!(Scene::new(f64::NAN, 4.0).is_err());
}

#[test]
fn test_subtitle_cue_invalid() {
    assert!(SubtitleCue::new("1", 2.0, 1.0, "hi").is_err());
    assert!(SubtitleCue::new("1", 1.0, 2.0, "hi").is_ok());
}

#[test]
fn test_track_deserialize_defaults() {
    let json = r#"{"id": "a1", "kind": "audio", "duration": 125.8, "sample_rate": 48000}"#;
    let track: Track = serde_json::from_str(json).unwrap();
    assert_eq!(track.kind, TrackKind::Audio);
    assert!(!track.is_main);
    assert_eq!(track.sample_rate, Some(48000));
    assert!(track.scenes.is_empty());
    assert!(!track.has_timed_data());
}

#[test]
fn test_correction_durations() {
    assert!((Correction::Stretch { ratio: 0.5 }.corrected_duration(10.0) - 5.0).abs() < 1e-12);
    assert_eq!(
        Correction::Crop {
            start_trim: 1.0,
            end_trim: 2.0
        }
        .corrected_duration(10.0),
        7.0
    );
    assert_eq!(
        Correction::Pad {
            start_pad: 1.0,
            end_pad: 1.0
        }
        .corrected_duration(10.0),
        12.0
    );
    assert_eq!(
        Correction::ShiftRate {
            shift: 0.5,
            rate: None
        }
        .corrected_duration(10.0),
        10.5
    );
}

#[test]
fn test_result_round_trips_correction() {
    let corrections = [
        Correction::Stretch { ratio: 0.96 },
        Correction::ShiftRate {
            shift: -0.05,
            rate: Some(0.954),
        },
        Correction::Crop {
            start_trim: 2.9,
            end_trim: 2.9,
        },
        Correction::Pad {
            start_pad: 1.5,
            end_pad: 1.5,
        },
    ];

    for correction in corrections {
        let result = AlignmentResult::from_correction(correction, 100.0);
        assert_eq!(result.correction(), correction);
        assert_eq!(result.strategy, correction.strategy());
    }
}

#[test]
fn test_result_populates_one_strategy() {
    let result = AlignmentResult::from_correction(Correction::Stretch { ratio: 0.96 }, 100.0);
    assert!(result.stretch_ratio.is_some());
    assert!(result.time_shift.is_none());
    assert!(result.rate_adjust.is_none());
    assert!(result.crop_info.is_none());
    assert!(result.pad_info.is_none());
}

#[test]
fn test_apply_to_keeps_input_untouched() {
    let track = Track::new("v2", TrackKind::Video, 104.0)
        .with_frame_rate(25.0)
        .with_keyframes(vec![0.0, 52.0]);
    let mut result = AlignmentResult::from_correction(Correction::Stretch { ratio: 0.5 }, 104.0);
    result.remapped_keyframes = Some(vec![0.0, 26.0]);
    result.adjusted_frame_rate = Some(50.0);

    let aligned = result.apply_to(&track);
    assert_eq!(aligned.duration, 52.0);
    assert_eq!(aligned.keyframes, vec![0.0, 26.0]);
    assert_eq!(aligned.frame_rate, Some(50.0));
    assert_eq!(track.duration, 104.0);
    assert_eq!(track.keyframes, vec![0.0, 52.0]);
}

#[test]
fn test_config_defaults() {
    let config = AlignmentConfig::default();
    assert_eq!(config.alignment_threshold, 1.0);
    assert!(config.max_stretch_ratio > 0.0 && config.max_stretch_ratio < 1.0);
    assert!(config.prefer_audio_intact);
}

#[test]
fn test_config_partial_toml() {
    let config: AlignmentConfig = toml::from_str("alignment_threshold = 0.5").unwrap();
    assert_eq!(config.alignment_threshold, 0.5);
    assert_eq!(config.max_stretch_ratio, AlignmentConfig::default().max_stretch_ratio);
}
