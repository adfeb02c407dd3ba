//! CLI module for TrackAlign
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{AlignArgs, AnalyzeArgs, OptimizeArgs, SnapArgs};

/// TrackAlign multi-track aligner
///
/// Computes duration corrections for drifted media tracks and keyframe-aligned
/// cut lists from already-extracted track metadata.
#[derive(Parser, Debug)]
#[command(name = "aligner")]
#[command(about = "Align media track durations and snap cut points to keyframes")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, env = "TRACKALIGN_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Worker threads for per-track alignment (default: number of CPUs)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Align every track in a track list to its main track
    Align(AlignArgs),
    /// Move cut points onto keyframes while keeping a minimum segment length
    Optimize(OptimizeArgs),
    /// Snap times to the closest keyframe within a threshold
    Snap(SnapArgs),
    /// Report GOP structure and cut alignment for a keyframe list
    Analyze(AnalyzeArgs),
}
