//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the align command
#[derive(Args, Debug)]
pub struct AlignArgs {
    /// Track list (JSON, or YAML with a .yaml/.yml extension)
    #[arg(short, long)]
    pub tracks: PathBuf,

    /// TOML config file (default: trackalign.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Largest duration mismatch left uncorrected (seconds)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Largest tolerated |stretch ratio - 1|
    #[arg(long)]
    pub max_stretch: Option<f64>,

    /// Keep audio at native speed where possible
    #[arg(long)]
    pub prefer_audio_intact: Option<bool>,

    /// Bias crops away from scene interiors
    #[arg(long)]
    pub maintain_sync_points: Option<bool>,

    /// Snap scene cuts of corrected tracks to their keyframes
    #[arg(long)]
    pub optimize_scene_cuts: Option<bool>,

    /// Minimum segment length for scene cut optimization (seconds)
    #[arg(long)]
    pub min_segment: Option<f64>,

    /// Write the aligned track list here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the optimize command
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Comma-separated cut points (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(long)]
    pub cuts: String,

    /// Comma-separated keyframe times
    #[arg(short, long, default_value = "")]
    pub keyframes: String,

    /// Minimum segment length (seconds, or frames with --frames)
    #[arg(long)]
    pub min_segment: Option<f64>,

    /// Preset used when --min-segment is not given (low, medium, high)
    #[arg(long, default_value = "medium")]
    pub strictness: String,

    /// Frame rate for --frames
    #[arg(long)]
    pub fps: Option<f64>,

    /// Interpret cuts, keyframes and --min-segment as frame numbers
    #[arg(long, requires = "fps")]
    pub frames: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the snap command
#[derive(Args, Debug)]
pub struct SnapArgs {
    /// Time (or comma-separated times) to snap
    #[arg(short, long)]
    pub value: String,

    /// Comma-separated keyframe times
    #[arg(short, long)]
    pub keyframes: String,

    /// Maximum snap distance (default: the strictness preset at --fps)
    #[arg(long)]
    pub threshold: Option<String>,

    /// Keyframe choice: nearest, previous or next
    #[arg(long, default_value = "nearest")]
    pub prefer: String,

    /// Preset used when --threshold is not given (low, medium, high)
    #[arg(long, default_value = "medium")]
    pub strictness: String,

    /// Frame rate for the strictness preset
    #[arg(long, default_value = "30")]
    pub fps: f64,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Comma-separated keyframe times
    #[arg(short, long)]
    pub keyframes: String,

    /// Comma-separated cut points to check against the keyframes
    #[arg(long)]
    pub cuts: Option<String>,

    /// Frame rate of the stream
    #[arg(long, default_value = "30")]
    pub fps: f64,

    /// Distance within which a cut counts as aligned (seconds)
    #[arg(long, default_value = "0.1")]
    pub tolerance: f64,

    /// Drop keyframes closer than this to the previous one before analysis
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
