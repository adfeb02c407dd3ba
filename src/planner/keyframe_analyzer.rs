//! Keyframe index statistics and cut alignment reports

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AlignError, AlignResult};
use crate::utils::time::{self, sorted_set};

/// Default distance (seconds) within which a cut counts as keyframe-aligned
pub const DEFAULT_ALIGNMENT_TOLERANCE: f64 = 0.1;

/// Number of worst misaligned cuts kept in a report
const MAX_REPORTED_MISALIGNMENTS: usize = 10;

/// Keyframe analyzer for GOP structure and cut alignment
#[derive(Debug, Clone)]
pub struct KeyframeAnalyzer {
    /// Maximum number of keyframes to analyze
    max_keyframes: usize,
    /// Tolerance for keyframe alignment (seconds)
    alignment_tolerance: f64,
}

/// GOP analysis results
#[derive(Debug, Clone, Serialize)]
pub struct GopAnalysis {
    /// Total number of keyframes analyzed
    pub keyframe_count: usize,
    /// Average GOP size in frames
    pub avg_gop_size_frames: f64,
    /// Average GOP duration in seconds
    pub avg_gop_duration: f64,
    pub min_gop_duration: f64,
    pub max_gop_duration: f64,
    /// GOP regularity score (0.0 = irregular, 1.0 = perfectly regular)
    pub regularity_score: f64,
    /// Detected GOP pattern (if regular)
    pub gop_pattern: Option<String>,
}

/// A cut that missed every keyframe by more than the tolerance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MisalignedCut {
    pub cut_point: f64,
    pub nearest_keyframe: f64,
    pub distance: f64,
}

/// How well a cut list lines up with a keyframe index
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub total_cut_points: usize,
    pub aligned_cuts: usize,
    pub non_aligned_cuts: usize,
    /// `aligned_cuts / total_cut_points`, 0 for an empty list
    pub alignment_rate: f64,
    /// Mean distance over misaligned cuts
    pub avg_misalignment: f64,
    /// Worst offenders, largest distance first
    pub misaligned_cuts: Vec<MisalignedCut>,
    pub tolerance: f64,
}

impl Default for KeyframeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyframeAnalyzer {
    /// Create a new keyframe analyzer
    pub fn new() -> Self {
        Self {
            max_keyframes: 100_000,
            alignment_tolerance: DEFAULT_ALIGNMENT_TOLERANCE,
        }
    }

    /// Set maximum number of keyframes to analyze
    pub fn with_max_keyframes(mut self, max_keyframes: usize) -> Self {
        self.max_keyframes = max_keyframes.max(2);
        self
    }

    /// Set keyframe alignment tolerance
    pub fn with_alignment_tolerance(mut self, tolerance: f64) -> Self {
        self.alignment_tolerance = tolerance.max(0.0);
        self
    }

    /// Compute GOP statistics for a keyframe index sampled at `frame_rate`
    pub fn analyze_gop(&self, keyframes: &[f64], frame_rate: f64) -> AlignResult<GopAnalysis> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(AlignError::validation(format!(
                "Frame rate must be positive, got {}",
                frame_rate
            )));
        }

        let keyframes = sorted_set(keyframes);
        if keyframes.len() < 2 {
            return Err(AlignError::validation(
                "Need at least 2 keyframes for GOP analysis",
            ));
        }

        let keyframes = if keyframes.len() > self.max_keyframes {
            warn!(
                "Reached maximum keyframe limit ({}), analyzing the first {} only",
                self.max_keyframes, self.max_keyframes
            );
            &keyframes[..self.max_keyframes]
        } else {
            &keyframes[..]
        };

        let gop_durations: Vec<f64> = keyframes.windows(2).map(|w| w[1] - w[0]).collect();
        let gop_sizes_frames: Vec<u32> = gop_durations
            .iter()
            .map(|&d| (d * frame_rate).round() as u32)
            .collect();

        let keyframe_count = keyframes.len();
        let avg_gop_duration = gop_durations.iter().sum::<f64>() / gop_durations.len() as f64;
        let avg_gop_size_frames =
            gop_sizes_frames.iter().map(|&s| s as f64).sum::<f64>() / gop_sizes_frames.len() as f64;
        let min_gop_duration = gop_durations.iter().copied().fold(f64::INFINITY, f64::min);
        let max_gop_duration = gop_durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let regularity_score = self.calculate_regularity_score(&gop_durations, avg_gop_duration);
        let gop_pattern = self.detect_gop_pattern(&gop_sizes_frames, regularity_score);

        info!(
            "GOP analysis complete: {} keyframes, avg_duration={:.3}s, regularity={:.2}",
            keyframe_count, avg_gop_duration, regularity_score
        );

        Ok(GopAnalysis {
            keyframe_count,
            avg_gop_size_frames,
            avg_gop_duration,
            min_gop_duration,
            max_gop_duration,
            regularity_score,
            gop_pattern,
        })
    }

    /// Report how many of `cut_points` fall within tolerance of a keyframe
    ///
    /// Duplicate cuts are counted once. Without keyframes no cut is classified
    /// and both counters stay at zero.
    pub fn analyze_alignment(&self, cut_points: &[f64], keyframes: &[f64]) -> AlignmentReport {
        let cuts = sorted_set(cut_points);
        let keyframes = sorted_set(keyframes);

        let mut aligned_cuts = 0;
        let mut misaligned = Vec::new();

        if !keyframes.is_empty() {
            for &cut in cuts.iter() {
                let nearest_keyframe = time::nearest(cut, &keyframes);
                let distance = (nearest_keyframe - cut).abs();
                if distance <= self.alignment_tolerance {
                    aligned_cuts += 1;
                } else {
                    misaligned.push(MisalignedCut {
                        cut_point: cut,
                        nearest_keyframe,
                        distance,
                    });
                }
            }
        }

        let total_cut_points = cuts.len();
        let non_aligned_cuts = misaligned.len();
        let alignment_rate = if total_cut_points > 0 {
            aligned_cuts as f64 / total_cut_points as f64
        } else {
            0.0
        };
        let avg_misalignment = if misaligned.is_empty() {
            0.0
        } else {
            misaligned.iter().map(|m| m.distance).sum::<f64>() / misaligned.len() as f64
        };

        misaligned.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        misaligned.truncate(MAX_REPORTED_MISALIGNMENTS);

        debug!(
            "Alignment report: {}/{} cuts within {:.3}s of a keyframe",
            aligned_cuts, total_cut_points, self.alignment_tolerance
        );

        AlignmentReport {
            total_cut_points,
            aligned_cuts,
            non_aligned_cuts,
            alignment_rate,
            avg_misalignment,
            misaligned_cuts: misaligned,
            tolerance: self.alignment_tolerance,
        }
    }

    /// Drop keyframes closer than `min_distance` to the previously kept one
    pub fn thin_keyframes(&self, keyframes: &[f64], min_distance: f64) -> Vec<f64> {
        let keyframes = sorted_set(keyframes);
        if min_distance <= 0.0 || min_distance.is_nan() {
            return keyframes.into_owned();
        }

        let mut kept: Vec<f64> = Vec::with_capacity(keyframes.len());
        for &kf in keyframes.iter() {
            match kept.last() {
                Some(&last) if kf - last < min_distance => continue,
                _ => kept.push(kf),
            }
        }
        kept
    }

    /// Whether `time` lies within the alignment tolerance of a keyframe
    pub fn is_keyframe_aligned(&self, keyframes: &[f64], time: f64) -> bool {
        let keyframes = sorted_set(keyframes);
        !keyframes.is_empty()
            && (time::nearest(time, &keyframes) - time).abs() <= self.alignment_tolerance
    }

    /// Calculate GOP regularity score
    fn calculate_regularity_score(&self, gop_durations: &[f64], avg_duration: f64) -> f64 {
        if gop_durations.len() < 2 || avg_duration <= 0.0 {
            return 1.0;
        }

        let variance = gop_durations
            .iter()
            .map(|&duration| (duration - avg_duration).powi(2))
            .sum::<f64>()
            / gop_durations.len() as f64;

        let coefficient_of_variation = variance.sqrt() / avg_duration;

        // CV < 0.1 scores ~0.6-1.0, CV > 0.5 scores ~0
        (-coefficient_of_variation * 5.0).exp().clamp(0.0, 1.0)
    }

    /// Detect GOP pattern if regular
    fn detect_gop_pattern(&self, gop_sizes: &[u32], regularity_score: f64) -> Option<String> {
        if regularity_score < 0.8 {
            return None;
        }

        let mut frequency_map: HashMap<u32, usize> = HashMap::new();
        for &size in gop_sizes {
            *frequency_map.entry(size).or_insert(0) += 1;
        }

        // Ties resolve to the smaller size so the pattern is deterministic
        let (most_common_size, most_common_count) = frequency_map
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))?;

        let pattern_ratio = most_common_count as f64 / gop_sizes.len() as f64;

        if pattern_ratio > 0.8 {
            Some(format!("Regular GOP-{}", most_common_size))
        } else {
            Some("Variable GOP".to_string())
        }
    }

    /// Generate summary report
    pub fn generate_summary(&self, analysis: &GopAnalysis) -> String {
        let mut summary = String::new();

        summary.push_str("GOP Analysis Summary:\n");
        summary.push_str(&format!("  Total Keyframes: {}\n", analysis.keyframe_count));
        summary.push_str(&format!(
            "  Average GOP Duration: {:.3}s\n",
            analysis.avg_gop_duration
        ));
        summary.push_str(&format!(
            "  Average GOP Size: {:.1} frames\n",
            analysis.avg_gop_size_frames
        ));
        summary.push_str(&format!(
            "  GOP Range: {:.3}s - {:.3}s\n",
            analysis.min_gop_duration, analysis.max_gop_duration
        ));
        summary.push_str(&format!(
            "  Regularity Score: {:.2}\n",
            analysis.regularity_score
        ));

        if let Some(ref pattern) = analysis.gop_pattern {
            summary.push_str(&format!("  Detected Pattern: {}\n", pattern));
        }

        let regularity_desc = if analysis.regularity_score > 0.9 {
            "Highly Regular"
        } else if analysis.regularity_score > 0.7 {
            "Moderately Regular"
        } else if analysis.regularity_score > 0.4 {
            "Somewhat Irregular"
        } else {
            "Highly Irregular"
        };

        summary.push_str(&format!("  Structure: {}\n", regularity_desc));

        summary
    }
}
