//! Cut point optimization against a keyframe index
//!
//! Cuts are processed left to right; every decision depends on the
//! previously accepted cut, so a single list is never split across threads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::domain::model::TrackId;
use crate::error::AlignError;
use crate::planner::snapper::find_sorted;
use crate::planner::SnapPreference;
use crate::utils::time::{frames_to_time, sort_times, sorted_set};

/// Align cut points to keyframes while keeping every segment at least
/// `min_segment_duration` long
///
/// The output is strictly increasing with every gap `>= min_segment_duration`.
/// A negative or NaN minimum is treated as zero; with a zero minimum, cuts that
/// cannot advance past the previous one are dropped. Without keyframes the
/// function only enforces spacing.
pub fn optimize_cut_points(
    cut_points: &[f64],
    keyframes: &[f64],
    min_segment_duration: f64,
) -> Vec<f64> {
    CutPointOptimizer::new(keyframes, min_segment_duration).optimize(cut_points)
}

/// Where an optimized cut came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutSource {
    /// Closest keyframe at or before the requested cut
    PreviousKeyframe,
    /// Closest keyframe at or after the requested cut
    NextKeyframe,
    /// No usable keyframe; placed exactly one minimum segment after the previous cut
    MinimumSpacing,
    /// The requested cut was kept (no keyframes, or none past the previous cut)
    Unchanged,
}

impl CutSource {
    /// Whether the cut lands on a keyframe
    pub fn is_keyframe(&self) -> bool {
        matches!(self, CutSource::PreviousKeyframe | CutSource::NextKeyframe)
    }
}

/// One optimized cut and how it was chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutDecision {
    pub original: f64,
    pub adjusted: f64,
    pub source: CutSource,
}

/// Optimization presets trading keyframe precision for segment length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Low,
    #[default]
    Medium,
    High,
}

impl Strictness {
    /// Snap threshold in frames
    pub fn snap_threshold_frames(&self) -> i64 {
        match self {
            Strictness::Low => 5,
            Strictness::Medium => 3,
            Strictness::High => 1,
        }
    }

    /// Snap threshold in seconds at `fps`
    pub fn snap_threshold(&self, fps: f64) -> f64 {
        frames_to_time(self.snap_threshold_frames(), fps)
    }

    /// Minimum segment length in seconds
    pub fn min_segment_duration(&self) -> f64 {
        match self {
            Strictness::Low => 0.5,
            Strictness::Medium => 1.0,
            Strictness::High => 2.0,
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strictness::Low => "low",
            Strictness::Medium => "medium",
            Strictness::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for Strictness {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Strictness::Low),
            "medium" => Ok(Strictness::Medium),
            "high" => Ok(Strictness::High),
            other => Err(AlignError::validation(format!(
                "Unknown strictness '{}'. Use low, medium or high",
                other
            ))),
        }
    }
}

/// Cut point optimizer bound to one keyframe index
#[derive(Debug, Clone)]
pub struct CutPointOptimizer {
    keyframes: Vec<f64>,
    min_segment_duration: f64,
}

impl CutPointOptimizer {
    /// Create an optimizer over `keyframes` (any order, duplicates allowed)
    pub fn new(keyframes: &[f64], min_segment_duration: f64) -> Self {
        Self {
            keyframes: sorted_set(keyframes).into_owned(),
            min_segment_duration: sanitize_min(min_segment_duration),
        }
    }

    /// Create an optimizer using a strictness preset's minimum segment length
    pub fn from_strictness(keyframes: &[f64], strictness: Strictness) -> Self {
        Self::new(keyframes, strictness.min_segment_duration())
    }

    /// Override the minimum segment length
    pub fn with_min_segment_duration(mut self, min_segment_duration: f64) -> Self {
        self.min_segment_duration = sanitize_min(min_segment_duration);
        self
    }

    pub fn keyframes(&self) -> &[f64] {
        &self.keyframes
    }

    pub fn min_segment_duration(&self) -> f64 {
        self.min_segment_duration
    }

    /// Optimize `cut_points` and report how each cut was placed
    pub fn plan(&self, cut_points: &[f64]) -> Vec<CutDecision> {
        let mut cuts: Vec<f64> = cut_points.iter().copied().filter(|c| c.is_finite()).collect();
        if cuts.len() != cut_points.len() {
            warn!(
                "Ignoring {} non-finite cut points",
                cut_points.len() - cuts.len()
            );
        }
        sort_times(&mut cuts);

        let min = self.min_segment_duration;
        let mut previous_cut = 0.0;
        let mut decisions = Vec::with_capacity(cuts.len());

        // a placement must advance past the previous cut by at least `min`
        let fits =
            |time: f64, previous_cut: f64| time > previous_cut && time - previous_cut >= min;

        for cut in cuts {
            let (mut adjusted, mut source) = if self.keyframes.is_empty() {
                (cut, CutSource::Unchanged)
            } else {
                (
                    find_sorted(cut, &self.keyframes, SnapPreference::Previous),
                    CutSource::PreviousKeyframe,
                )
            };

            if !fits(adjusted, previous_cut) {
                let candidate = if self.keyframes.is_empty() {
                    cut
                } else {
                    find_sorted(cut, &self.keyframes, SnapPreference::Next)
                };

                if fits(candidate, previous_cut) {
                    adjusted = candidate;
                    if !self.keyframes.is_empty() {
                        source = CutSource::NextKeyframe;
                    }
                } else if previous_cut + min > previous_cut {
                    adjusted = previous_cut + min;
                    source = CutSource::MinimumSpacing;
                    debug!(
                        "Cut {:.3}s placed off-keyframe at {:.3}s to keep {:.3}s spacing",
                        cut, adjusted, min
                    );
                } else if cut > previous_cut {
                    adjusted = cut;
                    source = CutSource::Unchanged;
                } else {
                    debug!("Dropping cut {:.3}s at or before {:.3}s", cut, previous_cut);
                    continue;
                }
            }

            trace!("Cut {:.3}s -> {:.3}s ({:?})", cut, adjusted, source);
            decisions.push(CutDecision {
                original: cut,
                adjusted,
                source,
            });
            previous_cut = adjusted;
        }

        decisions
    }

    /// Optimize `cut_points`, returning only the adjusted times
    pub fn optimize(&self, cut_points: &[f64]) -> Vec<f64> {
        self.plan(cut_points).into_iter().map(|d| d.adjusted).collect()
    }
}

fn sanitize_min(min_segment_duration: f64) -> f64 {
    if min_segment_duration.is_nan() || min_segment_duration < 0.0 {
        0.0
    } else {
        min_segment_duration
    }
}

/// Collapse near-coincident cut points across tracks onto shared times
///
/// All points are pooled and sorted; runs whose consecutive distance is at
/// most `max_offset` form a cluster, and every cluster with more than one
/// point is replaced by its mean. Each track's output is sorted and deduplicated.
pub fn synchronize_cut_points(
    cuts: &BTreeMap<TrackId, Vec<f64>>,
    max_offset: f64,
) -> BTreeMap<TrackId, Vec<f64>> {
    let mut pooled: Vec<f64> = cuts
        .values()
        .flatten()
        .copied()
        .filter(|c| c.is_finite())
        .collect();
    sort_times(&mut pooled);

    // (first, last, replacement) per multi-point cluster
    let mut clusters: Vec<(f64, f64, f64)> = Vec::new();
    let mut start = 0;
    for i in 1..=pooled.len() {
        let breaks = i == pooled.len() || pooled[i] - pooled[i - 1] > max_offset;
        if breaks {
            let members = &pooled[start..i];
            if members.len() > 1 {
                let mean = members.iter().sum::<f64>() / members.len() as f64;
                clusters.push((members[0], members[members.len() - 1], mean));
            }
            start = i;
        }
    }

    debug!(
        "Synchronizing {} cut points across {} tracks: {} clusters",
        pooled.len(),
        cuts.len(),
        clusters.len()
    );

    cuts.iter()
        .map(|(id, points)| {
            let mut synced: Vec<f64> = points
                .iter()
                .copied()
                .filter(|c| c.is_finite())
                .map(|point| {
                    let idx = clusters.partition_point(|&(_, last, _)| last < point);
                    match clusters.get(idx) {
                        Some(&(first, _, mean)) if first <= point => mean,
                        _ => point,
                    }
                })
                .collect();
            sort_times(&mut synced);
            synced.dedup();
            (id.clone(), synced)
        })
        .collect()
}
