// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};

/// Track identifier, unique within a batch
pub type TrackId = String;

/// Kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Effects,
}

impl TrackKind {
    /// Lowercase name used in track files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitle",
            TrackKind::Effects => "effects",
        }
    }

    /// Whether the track is timed data that follows a carrier track
    pub fn follows_carrier(&self) -> bool {
        matches!(self, TrackKind::Subtitle | TrackKind::Effects)
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackKind {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(TrackKind::Video),
            "audio" => Ok(TrackKind::Audio),
            "subtitle" | "subtitles" => Ok(TrackKind::Subtitle),
            "effects" | "effect" => Ok(TrackKind::Effects),
            other => Err(AlignError::validation(format!(
                "Unrecognized track kind '{}'. Supported kinds: video, audio, subtitle, effects",
                other
            ))),
        }
    }
}

/// A scene span on a track's own timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub start_time: f64,
    pub end_time: f64,
}

impl Scene {
    /// Create a new scene with validation
    pub fn new(start_time: f64, end_time: f64) -> AlignResult<Self> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(AlignError::validation("Scene bounds must be finite"));
        }
        if start_time >= end_time {
            return Err(AlignError::validation(format!(
                "Scene start ({:.3}s) must be before its end ({:.3}s)",
                start_time, end_time
            )));
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    /// Scene length in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether `time` falls strictly inside the scene
    pub fn contains_interior(&self, time: f64) -> bool {
        time > self.start_time && time < self.end_time
    }
}

/// A single subtitle cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub text: String,
}

impl SubtitleCue {
    /// Create a new cue with validation
    pub fn new(
        id: impl Into<String>,
        start_time: f64,
        end_time: f64,
        text: impl Into<String>,
    ) -> AlignResult<Self> {
        let id = id.into();
        if !start_time.is_finite() || !end_time.is_finite() || start_time >= end_time {
            return Err(AlignError::validation(format!(
                "Subtitle cue '{}' must have finite bounds with start < end",
                id
            )));
        }
        Ok(Self {
            id,
            start_time,
            end_time,
            text: text.into(),
        })
    }
}

/// Already-decoded metadata for one media track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub kind: TrackKind,
    #[serde(default)]
    pub is_main: bool,
    /// Total duration in seconds
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitles: Vec<SubtitleCue>,
    /// Keyframe timestamps in seconds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<f64>,
    /// Audio/video track a subtitle or effects track is timed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<TrackId>,
}

impl Track {
    /// Create a bare track with no timed data
    pub fn new(id: impl Into<TrackId>, kind: TrackKind, duration: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            is_main: false,
            duration,
            frame_rate: None,
            sample_rate: None,
            scenes: Vec::new(),
            subtitles: Vec::new(),
            keyframes: Vec::new(),
            carrier: None,
        }
    }

    /// Mark this track as the alignment reference
    pub fn main(mut self) -> Self {
        self.is_main = true;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn with_scenes(mut self, scenes: Vec<Scene>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn with_subtitles(mut self, subtitles: Vec<SubtitleCue>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn with_keyframes(mut self, keyframes: Vec<f64>) -> Self {
        self.keyframes = keyframes;
        self
    }

    pub fn with_carrier(mut self, carrier: impl Into<TrackId>) -> Self {
        self.carrier = Some(carrier.into());
        self
    }

    /// Whether the track exposes any timestamps that need remapping
    pub fn has_timed_data(&self) -> bool {
        !self.scenes.is_empty() || !self.subtitles.is_empty() || !self.keyframes.is_empty()
    }
}

/// Trim applied to the edges of a track that is too long
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropInfo {
    pub start_trim: f64,
    pub end_trim: f64,
}

/// Blank content added to the edges of a track that is too short
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadInfo {
    pub start_pad: f64,
    pub end_pad: f64,
}

/// Correction path that produced an [`AlignmentResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStrategy {
    Stretch,
    Crop,
    Pad,
    ShiftRate,
}

impl fmt::Display for AlignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlignmentStrategy::Stretch => "stretch",
            AlignmentStrategy::Crop => "crop",
            AlignmentStrategy::Pad => "pad",
            AlignmentStrategy::ShiftRate => "shift-rate",
        };
        f.write_str(name)
    }
}

/// A single timeline transform, applied to a track and to all of its timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Scale every timestamp by `ratio`
    Stretch { ratio: f64 },
    /// Optional playback-rate change followed by an offset
    ShiftRate { shift: f64, rate: Option<f64> },
    /// Drop `start_trim` from the head and `end_trim` from the tail
    Crop { start_trim: f64, end_trim: f64 },
    /// Insert `start_pad` at the head and `end_pad` at the tail
    Pad { start_pad: f64, end_pad: f64 },
}

impl Correction {
    /// Strategy tag for this correction
    pub fn strategy(&self) -> AlignmentStrategy {
        match self {
            Correction::Stretch { .. } => AlignmentStrategy::Stretch,
            Correction::ShiftRate { .. } => AlignmentStrategy::ShiftRate,
            Correction::Crop { .. } => AlignmentStrategy::Crop,
            Correction::Pad { .. } => AlignmentStrategy::Pad,
        }
    }

    /// Map a timestamp from the source timeline to the corrected one (unclamped)
    pub fn map_time(&self, time: f64) -> f64 {
        match *self {
            Correction::Stretch { ratio } => time * ratio,
            Correction::ShiftRate { shift, rate } => time * rate.unwrap_or(1.0) + shift,
            Correction::Crop { start_trim, .. } => time - start_trim,
            Correction::Pad { start_pad, .. } => time + start_pad,
        }
    }

    /// Duration of a track of `duration` seconds after this correction
    pub fn corrected_duration(&self, duration: f64) -> f64 {
        match *self {
            Correction::Stretch { ratio } => duration * ratio,
            Correction::ShiftRate { shift, rate } => duration * rate.unwrap_or(1.0) + shift,
            Correction::Crop {
                start_trim,
                end_trim,
            } => duration - start_trim - end_trim,
            Correction::Pad { start_pad, end_pad } => duration + start_pad + end_pad,
        }
    }
}

/// Numeric corrections for one non-main track, consumed by the export stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub strategy: AlignmentStrategy,
    pub original_duration: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_shift: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_adjust: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_info: Option<CropInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad_info: Option<PadInfo>,
    /// Video frame rate after a stretch (`fps / ratio`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remapped_scenes: Option<Vec<Scene>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remapped_subtitles: Option<Vec<SubtitleCue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remapped_keyframes: Option<Vec<f64>>,
    /// Scene cut list snapped to the remapped keyframes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_cut_points: Option<Vec<f64>>,
    /// Carrier track whose correction this result adopted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<TrackId>,
}

impl AlignmentResult {
    /// Build the bare result for `correction` applied to a track of `original_duration`
    pub fn from_correction(correction: Correction, original_duration: f64) -> Self {
        let mut result = Self {
            strategy: correction.strategy(),
            original_duration,
            duration: correction.corrected_duration(original_duration),
            stretch_ratio: None,
            time_shift: None,
            rate_adjust: None,
            crop_info: None,
            pad_info: None,
            adjusted_frame_rate: None,
            remapped_scenes: None,
            remapped_subtitles: None,
            remapped_keyframes: None,
            optimized_cut_points: None,
            carrier: None,
        };

        match correction {
            Correction::Stretch { ratio } => result.stretch_ratio = Some(ratio),
            Correction::ShiftRate { shift, rate } => {
                result.time_shift = Some(shift);
                result.rate_adjust = rate;
            }
            Correction::Crop {
                start_trim,
                end_trim,
            } => {
                result.crop_info = Some(CropInfo {
                    start_trim,
                    end_trim,
                })
            }
            Correction::Pad { start_pad, end_pad } => {
                result.pad_info = Some(PadInfo { start_pad, end_pad })
            }
        }

        result
    }

    /// Recover the correction this result describes
    pub fn correction(&self) -> Correction {
        if let Some(ratio) = self.stretch_ratio {
            return Correction::Stretch { ratio };
        }
        if let Some(crop) = self.crop_info {
            return Correction::Crop {
                start_trim: crop.start_trim,
                end_trim: crop.end_trim,
            };
        }
        if let Some(pad) = self.pad_info {
            return Correction::Pad {
                start_pad: pad.start_pad,
                end_pad: pad.end_pad,
            };
        }
        Correction::ShiftRate {
            shift: self.time_shift.unwrap_or(0.0),
            rate: self.rate_adjust,
        }
    }

    /// Produce the aligned track record described by this result
    ///
    /// The input track is left untouched. Timed data that was not remapped
    /// (because the track had none) stays empty.
    pub fn apply_to(&self, track: &Track) -> Track {
        Track {
            id: track.id.clone(),
            kind: track.kind,
            is_main: false,
            duration: self.duration,
            frame_rate: self.adjusted_frame_rate.or(track.frame_rate),
            sample_rate: track.sample_rate,
            scenes: self
                .remapped_scenes
                .clone()
                .unwrap_or_else(|| track.scenes.clone()),
            subtitles: self
                .remapped_subtitles
                .clone()
                .unwrap_or_else(|| track.subtitles.clone()),
            keyframes: self
                .remapped_keyframes
                .clone()
                .unwrap_or_else(|| track.keyframes.clone()),
            carrier: track.carrier.clone(),
        }
    }
}

/// Settings governing one alignment batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Largest duration mismatch (seconds) left uncorrected
    pub alignment_threshold: f64,
    /// Largest tolerated `|stretch_ratio - 1|`
    pub max_stretch_ratio: f64,
    /// Keep audio at its native speed where possible (shift/rate instead of stretch)
    pub prefer_audio_intact: bool,
    /// Bias crops so trim edges avoid splitting scenes
    pub maintain_sync_points: bool,
    /// Largest pure offset (seconds) the shift/rate path applies
    pub max_time_shift: f64,
    /// Largest tolerated `|rate_adjust - 1|`
    pub max_rate_adjust: f64,
    /// Run scene cut lists through the cut point optimizer
    pub optimize_scene_cuts: bool,
    /// Minimum segment length (seconds) for scene cut optimization
    pub min_segment_duration: f64,
    /// Snap tolerance (seconds) used when reporting keyframe alignment
    pub snap_threshold: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            alignment_threshold: 1.0,
            max_stretch_ratio: 0.1,
            prefer_audio_intact: true,
            maintain_sync_points: true,
            max_time_shift: 0.05,
            max_rate_adjust: 0.05,
            optimize_scene_cuts: false,
            min_segment_duration: 1.0,
            snap_threshold: 0.1,
        }
    }
}

#[cfg(test)]
mod tests;
