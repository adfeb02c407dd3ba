//! Integration tests for keyframe snapping and cut point optimization

use std::collections::BTreeMap;

use proptest::prelude::*;
use trackalign::planner::{CutPointOptimizer, CutSource, KeyframeAnalyzer, Strictness};
use trackalign::*;

const FPS: f64 = 30.0;

fn keyframes_from_frames(frames: &[i64]) -> Vec<f64> {
    frames.iter().map(|&f| frames_to_time(f, FPS)).collect()
}

#[test]
fn test_snap_in_frame_units() {
    let keyframes = keyframes_from_frames(&[100, 150, 300, 450, 600]);

    let snapped = align_to_keyframe(frames_to_time(103, FPS), &keyframes, frames_to_time(5, FPS));
    assert_eq!(time_to_frames(snapped, FPS), 100);

    let untouched = align_to_keyframe(frames_to_time(120, FPS), &keyframes, frames_to_time(5, FPS));
    assert_eq!(time_to_frames(untouched, FPS), 120);
}

#[test]
fn test_optimize_in_frame_units() {
    let keyframes = keyframes_from_frames(&[100, 150, 300, 450, 600]);
    let cuts = keyframes_from_frames(&[103, 200, 296, 388, 478]);

    let optimized: Vec<i64> = optimize_cut_points(&cuts, &keyframes, 30.0 / FPS)
        .into_iter()
        .map(|t| time_to_frames(t, FPS))
        .collect();

    assert_eq!(optimized, vec![100, 150, 300, 450, 600]);
}

#[test]
fn test_preferences_pick_surrounding_keyframes() {
    let keyframes = [0.0, 2.0, 4.0];
    assert_eq!(find_optimal_keyframe(2.9, &keyframes, SnapPreference::Previous), 2.0);
    assert_eq!(find_optimal_keyframe(2.9, &keyframes, SnapPreference::Next), 4.0);
    assert_eq!(find_optimal_keyframe(2.9, &keyframes, SnapPreference::Nearest), 2.0);
    assert_eq!(find_optimal_keyframe(7.0, &[], SnapPreference::Nearest), 7.0);
}

#[test]
fn test_strictness_presets_drive_optimizer() {
    let keyframes = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let cuts = [0.9, 1.6, 2.4, 3.2];

    let low = CutPointOptimizer::from_strictness(&keyframes, Strictness::Low).optimize(&cuts);
    let high = CutPointOptimizer::from_strictness(&keyframes, Strictness::High).optimize(&cuts);

    assert_eq!(low, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(high, vec![2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_off_keyframe_placements_are_flagged() {
    let optimizer = CutPointOptimizer::new(&[0.0, 10.0], 3.0);
    let plan = optimizer.plan(&[4.0, 5.0]);

    assert_eq!(plan[0].adjusted, 10.0);
    assert_eq!(plan[0].source, CutSource::NextKeyframe);
    assert_eq!(plan[1].adjusted, 13.0);
    assert_eq!(plan[1].source, CutSource::MinimumSpacing);
}

#[test]
fn test_synchronize_across_tracks() {
    let mut cuts = BTreeMap::new();
    cuts.insert("a".to_string(), vec![10.0, 20.0]);
    cuts.insert("b".to_string(), vec![10.2, 35.0]);

    let synced = synchronize_cut_points(&cuts, 0.5);
    assert!((synced["a"][0] - 10.1).abs() < 1e-9);
    assert!((synced["b"][0] - 10.1).abs() < 1e-9);
    assert_eq!(synced["a"][1], 20.0);
    assert_eq!(synced["b"][1], 35.0);
}

#[test]
fn test_analyzer_reports_cut_alignment() {
    let analyzer = KeyframeAnalyzer::new();
    let keyframes = [0.0, 2.0, 4.0, 6.0, 8.0];

    let gop = analyzer.analyze_gop(&keyframes, 25.0).unwrap();
    assert_eq!(gop.keyframe_count, 5);
    assert!((gop.avg_gop_duration - 2.0).abs() < 1e-9);

    let report = analyzer.analyze_alignment(&[2.05, 5.0], &keyframes);
    assert_eq!(report.aligned_cuts, 1);
    assert_eq!(report.non_aligned_cuts, 1);
    assert!((report.misaligned_cuts[0].distance - 1.0).abs() < 1e-9);
}

fn sorted_keyframes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..600.0, 1..40).prop_map(|mut kf| {
        kf.sort_by(|a, b| a.partial_cmp(b).unwrap());
        kf.dedup();
        kf
    })
}

proptest! {
    #[test]
    fn prop_snap_never_moves_past_threshold(
        value in 0.0f64..600.0,
        keyframes in sorted_keyframes(),
        threshold in 0.0f64..5.0,
    ) {
        let snapped = align_to_keyframe(value, &keyframes, threshold);
        prop_assert!((snapped - value).abs() <= threshold);
        prop_assert!(snapped == value || keyframes.contains(&snapped));
    }

    #[test]
    fn prop_optimized_cuts_keep_minimum_spacing(
        cuts in prop::collection::vec(0.0f64..600.0, 0..30),
        keyframes in sorted_keyframes(),
        min in 0.1f64..20.0,
    ) {
        let optimized = optimize_cut_points(&cuts, &keyframes, min);
        prop_assert_eq!(optimized.len(), cuts.len());

        let mut previous = 0.0;
        for cut in &optimized {
            prop_assert!(*cut - previous >= min - 1e-9);
            previous = *cut;
        }
    }

    #[test]
    fn prop_optimized_cuts_strictly_increase(
        cuts in prop::collection::vec(0.0f64..600.0, 0..30),
        keyframes in sorted_keyframes(),
        min in prop_oneof![Just(0.0f64), 0.0f64..20.0],
    ) {
        let optimized = optimize_cut_points(&cuts, &keyframes, min);
        prop_assert!(optimized.len() <= cuts.len());
        for pair in optimized.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn prop_frame_conversion_round_trips(frames in 0i64..1_000_000, fps in 1.0f64..240.0) {
        prop_assert_eq!(time_to_frames(frames_to_time(frames, fps), fps), frames);
    }
}
