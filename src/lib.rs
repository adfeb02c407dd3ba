//! TrackAlign Library
//!
//! Duration alignment for independently authored media tracks and
//! keyframe-aware cut point optimization. Works on already-decoded numeric
//! metadata only; no container parsing or re-encoding happens here.
//!
//! ```
//! use trackalign::{align_to_keyframe, optimize_cut_points};
//!
//! let keyframes = [0.0, 2.0, 4.0, 6.0];
//! assert_eq!(align_to_keyframe(2.1, &keyframes, 0.2), 2.0);
//! assert_eq!(optimize_cut_points(&[2.5, 3.0], &keyframes, 1.0), vec![2.0, 4.0]);
//! ```

pub mod adapters;
pub mod aligner;
pub mod cli;
pub mod domain;
pub mod error;
pub mod planner;
pub mod utils;

// Re-export commonly used types
pub use aligner::{align_audio_video, align_tracks, AlignmentOutcomes, TrackAligner, TrackOutcome};
pub use domain::errors::AlignmentFailure;
pub use domain::model::{
    AlignmentConfig, AlignmentResult, AlignmentStrategy, CropInfo, PadInfo, Scene, SubtitleCue,
    Track, TrackId, TrackKind,
};
pub use error::{AlignError, AlignResult};
pub use planner::{
    align_to_keyframe, find_optimal_keyframe, optimize_cut_points, synchronize_cut_points,
    SnapPreference,
};
pub use utils::time::{frames_to_time, time_to_frames};
