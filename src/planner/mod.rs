//! Cut point planning, keyframe snapping and GOP analysis

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

pub mod keyframe_analyzer;
pub mod optimizer;
pub mod snapper;

pub use keyframe_analyzer::{AlignmentReport, GopAnalysis, KeyframeAnalyzer, MisalignedCut};
pub use optimizer::{
    optimize_cut_points, synchronize_cut_points, CutDecision, CutPointOptimizer, CutSource,
    Strictness,
};
pub use snapper::{align_to_keyframe, find_optimal_keyframe, KeyframeSnapper, SnapStats};

/// Direction used when choosing a keyframe for a target time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapPreference {
    /// Closest keyframe on either side (ties go earlier)
    #[default]
    Nearest,
    /// Closest keyframe at or before the target
    Previous,
    /// Closest keyframe at or after the target
    Next,
}

impl fmt::Display for SnapPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapPreference::Nearest => "nearest",
            SnapPreference::Previous => "previous",
            SnapPreference::Next => "next",
        };
        f.write_str(name)
    }
}

impl FromStr for SnapPreference {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nearest" => Ok(SnapPreference::Nearest),
            "previous" | "prev" | "before" => Ok(SnapPreference::Previous),
            "next" | "after" => Ok(SnapPreference::Next),
            other => Err(AlignError::validation(format!(
                "Unknown snap preference '{}'. Use nearest, previous or next",
                other
            ))),
        }
    }
}
